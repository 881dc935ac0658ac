//! Compose backend driving the `docker compose` CLI.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::shell::{execute_check, execute_streaming, CommandOptions, OutputLine};

use super::backend::{BackendError, ComposeBackend, ContainerSummary, CreateOptions, DownOptions};
use super::project::ComposeProject;

/// Default deadline for a single compose phase.
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs compose primitives through `docker compose`.
///
/// Every invocation passes the project name explicitly so the engine
/// applies its own project and service labels under that name.
#[derive(Debug, Clone)]
pub struct DockerComposeCli {
    program: String,
    timeout: Duration,
}

impl Default for DockerComposeCli {
    fn default() -> Self {
        Self::new(DEFAULT_PHASE_TIMEOUT)
    }
}

impl DockerComposeCli {
    /// Create a CLI backend with a per-phase timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "docker".to_string(),
            timeout,
        }
    }

    /// Use a different executable in place of `docker`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Per-phase timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether `docker compose` is installed and answers.
    pub fn is_available(&self) -> bool {
        execute_check(
            &self.program,
            &["compose".to_string(), "version".to_string()],
            None,
        )
    }

    fn base_args(project: &ComposeProject) -> Vec<String> {
        vec![
            "compose".to_string(),
            "--project-name".to_string(),
            project.name.clone(),
            "--file".to_string(),
            project.config_path.display().to_string(),
            "--project-directory".to_string(),
            project.working_dir.display().to_string(),
        ]
    }

    fn run(&self, project: &ComposeProject, args: &[&str]) -> Result<String, BackendError> {
        let mut full = Self::base_args(project);
        full.extend(args.iter().map(|a| a.to_string()));

        let options = CommandOptions {
            cwd: Some(project.working_dir.clone()),
            env: HashMap::from([("COMPOSE_PROJECT_NAME".to_string(), project.name.clone())]),
            timeout: Some(self.timeout),
        };

        let project_name = project.name.clone();
        let result = execute_streaming(
            &self.program,
            &full,
            &options,
            Box::new(move |line| match line {
                OutputLine::Stdout(l) | OutputLine::Stderr(l) => {
                    debug!(project = %project_name, "{}", l)
                }
            }),
        )
        .map_err(|e| BackendError::Failed(e.to_string()))?;

        if result.timed_out {
            return Err(BackendError::Timeout(self.timeout));
        }
        if !result.success {
            return Err(BackendError::Failed(result.failure_message()));
        }
        Ok(result.stdout)
    }
}

impl ComposeBackend for DockerComposeCli {
    fn build(&self, project: &ComposeProject, services: &[String]) -> Result<(), BackendError> {
        let mut args = vec!["build"];
        args.extend(services.iter().map(String::as_str));
        self.run(project, &args).map(|_| ())
    }

    fn pull(&self, project: &ComposeProject, services: &[String]) -> Result<(), BackendError> {
        let mut args = vec!["pull"];
        args.extend(services.iter().map(String::as_str));
        self.run(project, &args).map(|_| ())
    }

    fn create(
        &self,
        project: &ComposeProject,
        options: CreateOptions,
    ) -> Result<(), BackendError> {
        let mut args = vec!["create"];
        if options.force_recreate {
            args.push("--force-recreate");
        }
        if options.remove_orphans {
            args.push("--remove-orphans");
        }
        self.run(project, &args).map(|_| ())
    }

    fn start(&self, project: &ComposeProject) -> Result<(), BackendError> {
        self.run(project, &["start"]).map(|_| ())
    }

    fn down(&self, project: &ComposeProject, options: DownOptions) -> Result<(), BackendError> {
        let mut args = vec!["down"];
        if options.remove_orphans {
            args.push("--remove-orphans");
        }
        if options.volumes {
            args.push("--volumes");
        }
        self.run(project, &args).map(|_| ())
    }

    fn ps(
        &self,
        project: &ComposeProject,
        all: bool,
    ) -> Result<Vec<ContainerSummary>, BackendError> {
        let mut args = vec!["ps", "--format", "json"];
        if all {
            args.push("--all");
        }
        let stdout = self.run(project, &args)?;
        parse_ps_output(&stdout)
    }
}

/// Parse `ps --format json` output.
///
/// Older compose releases print one JSON array, newer ones one object per line.
pub fn parse_ps_output(stdout: &str) -> Result<Vec<ContainerSummary>, BackendError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| BackendError::Failed(format!("unreadable ps output: {}", e)));
    }

    trimmed
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line)
                .map_err(|e| BackendError::Failed(format!("unreadable ps output: {}", e)))
        })
        .collect()
}
