//! Shared fixtures for command tests.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use tempfile::TempDir;

use crate::app::App;
use crate::error::{Result, VtError};
use crate::provider::{Provider, ProviderRegistry, ProviderStatus};
use crate::template::{Template, TemplateRegistry};

pub const SQLI: &str = r#"
id: sqli-basic
info:
  name: Basic SQL Injection
  author: hhs
  targets: [php, mysql]
  type: web
  tags: [sqli, owasp-top10]
post-install:
  - Browse to http://localhost:8080
  - Log in as admin' --
"#;

pub const WEAK_AUTH: &str = r#"
id: weak-auth
info:
  name: Weak Database Credentials
  author: hhs
  type: db
  tags: [auth]
"#;

/// Corpus with `web/sqli-basic` and `db/weak-auth`.
pub fn corpus() -> TempDir {
    let temp = TempDir::new().unwrap();
    for (category, id, descriptor) in [("web", "sqli-basic", SQLI), ("db", "weak-auth", WEAK_AUTH)]
    {
        let dir = temp.path().join(category).join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.yaml"), descriptor).unwrap();
    }
    temp
}

/// Provider answering from a script and logging calls.
pub struct ScriptedProvider {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub status: ProviderStatus,
    pub fail: bool,
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn start(&self, template: &Template) -> Result<()> {
        self.record("start", template)
    }

    fn stop(&self, template: &Template) -> Result<()> {
        self.record("stop", template)
    }

    fn status(&self, template: &Template) -> Result<ProviderStatus> {
        self.record("status", template)?;
        Ok(self.status)
    }
}

impl ScriptedProvider {
    fn record(&self, op: &str, template: &Template) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("{} {}", op, template.id));
        if self.fail {
            return Err(VtError::StartFailed {
                project: format!("vt-compose-{}", template.id),
                message: "port 8080 already allocated".to_string(),
            });
        }
        Ok(())
    }
}

/// App over `root` with a single scripted provider.
pub fn app(root: &TempDir, status: ProviderStatus, fail: bool) -> (App, Rc<RefCell<Vec<String>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut providers = ProviderRegistry::new();
    providers.register(Box::new(ScriptedProvider {
        calls: Rc::clone(&calls),
        status,
        fail,
    }));
    let templates = TemplateRegistry::discover(root.path()).unwrap();
    (App::new(templates, providers), calls)
}
