//! External command execution.

use crate::error::{Result, VtError};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long leftover output is collected once the child is gone.
const KILL_GRACE: Duration = Duration::from_millis(200);

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
            timed_out: false,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
            timed_out: false,
        }
    }

    /// Create a result for a command killed at its deadline.
    pub fn timeout(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: None,
            stdout,
            stderr,
            duration,
            success: false,
            timed_out: true,
        }
    }

    /// Most useful failure text: stderr, else stdout, else the exit code.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => format!("exited with code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Timeout (None = wait forever).
    pub timeout: Option<Duration>,
}

/// Output line from command execution.
#[derive(Debug, Clone)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

/// Execute `program` with `args`, capturing output.
pub fn execute(program: &str, args: &[String], options: &CommandOptions) -> Result<CommandResult> {
    execute_streaming(program, args, options, Box::new(|_| {}))
}

/// Execute `program` with `args`, streaming each output line to `callback`.
///
/// Output is always captured as well. When `options.timeout` elapses the
/// child and everything it spawned are killed and a result with `timed_out`
/// set is returned, even if a descendant still holds the output pipes.
pub fn execute_streaming(
    program: &str,
    args: &[String],
    options: &CommandOptions,
    callback: OutputCallback,
) -> Result<CommandResult> {
    let start = Instant::now();
    let shown = display_command(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    tracing::debug!("executing: {}", shown);
    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("failed to spawn {}: {}", shown, e);
        VtError::Other(anyhow::anyhow!("failed to run '{}': {}", shown, e))
    })?;

    let (tx, rx) = mpsc::channel();
    if let Some(out) = child.stdout.take() {
        spawn_reader(out, tx.clone(), OutputLine::Stdout);
    }
    if let Some(err) = child.stderr.take() {
        spawn_reader(err, tx, OutputLine::Stderr);
    }

    let mut captured = Captured::default();
    let deadline = options.timeout.map(|t| start + t);
    let status = loop {
        for line in rx.try_iter() {
            captured.push(line, &callback);
        }

        if let Some(status) = child.try_wait()? {
            break Some(status);
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            kill(&mut child);
            break None;
        }

        thread::sleep(POLL_INTERVAL);
    };

    // Readers finish when every holder of the pipes is gone. After a kill,
    // or past the deadline, they are left behind instead of joined.
    let drain_until = match status {
        None => Some(Instant::now() + KILL_GRACE),
        Some(_) => deadline.map(|d| d.max(Instant::now() + KILL_GRACE)),
    };
    loop {
        let next = match drain_until {
            Some(until) => {
                let remaining = until.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(line) => Some(line),
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        tracing::debug!("{}: output still open, detaching readers", shown);
                        None
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => None,
                }
            }
            None => rx.recv().ok(),
        };
        match next {
            Some(line) => captured.push(line, &callback),
            None => break,
        }
    }

    let duration = start.elapsed();
    let Captured { stdout, stderr } = captured;

    match status {
        None => {
            tracing::debug!("{} timed out after {:?}", shown, duration);
            Ok(CommandResult::timeout(stdout, stderr, duration))
        }
        Some(status) if status.success() => {
            Ok(CommandResult::success(stdout, stderr, duration))
        }
        Some(status) => Ok(CommandResult::failure(
            status.code(),
            stdout,
            stderr,
            duration,
        )),
    }
}

#[derive(Default)]
struct Captured {
    stdout: String,
    stderr: String,
}

impl Captured {
    fn push(&mut self, line: OutputLine, callback: &OutputCallback) {
        let (buf, text) = match &line {
            OutputLine::Stdout(text) => (&mut self.stdout, text),
            OutputLine::Stderr(text) => (&mut self.stderr, text),
        };
        buf.push_str(text);
        buf.push('\n');
        callback(line);
    }
}

/// Check whether `program` can be spawned and exits zero.
pub fn execute_check(program: &str, args: &[String], cwd: Option<&Path>) -> bool {
    let options = CommandOptions {
        cwd: cwd.map(|p| p.to_path_buf()),
        timeout: Some(Duration::from_secs(30)),
        ..Default::default()
    };

    execute(program, args, &options)
        .map(|r| r.success)
        .unwrap_or(false)
}

fn spawn_reader<R>(source: R, tx: mpsc::Sender<OutputLine>, wrap: fn(String) -> OutputLine)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(source);
        for line in reader.lines().map_while(std::result::Result::ok) {
            if tx.send(wrap(line)).is_err() {
                break;
            }
        }
    });
}

/// Kill the child's whole process group so descendants die with it.
#[cfg(unix)]
fn kill(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: signalling a process group we created has no memory effects.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        tracing::debug!(
            "failed to kill process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
        let _ = child.kill();
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("failed to kill timed out child: {}", e);
    }
    let _ = child.wait();
}

fn display_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn execute_successful_command() {
        let result = execute("sh", &sh("echo hello"), &CommandOptions::default()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("sh", &sh("echo broken >&2; exit 3"), &CommandOptions::default())
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.failure_message(), "broken");
    }

    #[test]
    fn execute_with_env() {
        let mut options = CommandOptions::default();
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let result = execute("sh", &sh("echo $MY_VAR"), &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "x").unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        };

        let result = execute("ls", &[], &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("marker.txt"));
    }

    #[test]
    fn execute_kills_command_at_timeout() {
        let options = CommandOptions {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        };

        let result = execute("sleep", &["5".to_string()], &options).unwrap();

        assert!(result.timed_out);
        assert!(!result.success);
        assert!(result.duration < Duration::from_secs(5));
    }

    #[test]
    fn timeout_kills_grandchildren_holding_output() {
        let options = CommandOptions {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        };

        let result = execute("sh", &sh("sleep 4; true"), &options).unwrap();

        assert!(result.timed_out);
        assert!(result.duration < Duration::from_secs(2));
    }

    #[test]
    fn background_child_does_not_outlive_deadline() {
        let options = CommandOptions {
            timeout: Some(Duration::from_secs(1)),
            ..Default::default()
        };

        let result = execute("sh", &sh("sleep 4 & echo started"), &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("started"));
        assert!(result.duration < Duration::from_secs(3));
    }

    #[test]
    fn missing_program_is_an_error() {
        let result = execute(
            "vt-definitely-not-a-program",
            &[],
            &CommandOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn execute_check_returns_bool() {
        assert!(execute_check("sh", &sh("exit 0"), None));
        assert!(!execute_check("sh", &sh("exit 1"), None));
    }

    #[test]
    fn execute_streaming_captures_both_streams() {
        use std::sync::{Arc, Mutex};

        let lines = Arc::new(Mutex::new(Vec::new()));
        let lines_clone = Arc::clone(&lines);

        let callback: OutputCallback = Box::new(move |line| {
            lines_clone.lock().unwrap().push(line);
        });

        let result = execute_streaming(
            "sh",
            &sh("echo line1; echo line2; echo oops >&2"),
            &CommandOptions::default(),
            callback,
        )
        .unwrap();

        assert!(result.success);
        let captured = lines.lock().unwrap();
        assert_eq!(
            captured
                .iter()
                .filter(|l| matches!(l, OutputLine::Stdout(_)))
                .count(),
            2
        );
        assert!(captured.iter().any(|l| matches!(l, OutputLine::Stderr(_))));
    }

    #[test]
    fn failure_message_falls_back_to_exit_code() {
        let result = CommandResult::failure(Some(2), String::new(), String::new(), Duration::ZERO);
        assert_eq!(result.failure_message(), "exited with code 2");
    }
}
