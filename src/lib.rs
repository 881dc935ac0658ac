//! vt - Vulnerable target environments on demand.
//!
//! vt discovers templates in a corpus of intentionally vulnerable
//! applications and runs them through pluggable providers. The bundled
//! provider drives `docker compose`.
//!
//! # Modules
//!
//! - [`app`] - Wiring of the template registry and provider registry
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - User configuration loading
//! - [`error`] - Error types and result aliases
//! - [`provider`] - Provider abstraction and the docker-compose backend
//! - [`shell`] - External command execution
//! - [`template`] - Template descriptors, discovery, and corpus sync
//! - [`ui`] - Spinners, tables, and terminal output
//!
//! # Example
//!
//! ```
//! use std::fs;
//! use tempfile::TempDir;
//! use vt::template::TemplateRegistry;
//! use vt::VtError;
//!
//! let corpus = TempDir::new().unwrap();
//! let dir = corpus.path().join("web").join("sqli-basic");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("index.yaml"), "id: sqli-basic\ninfo:\n  tags: [sqli]\n").unwrap();
//!
//! let registry = TemplateRegistry::discover(corpus.path()).unwrap();
//! assert_eq!(registry.filter_by_tag("SQL").len(), 1);
//! assert!(matches!(
//!     registry.get_by_id("missing"),
//!     Err(VtError::TemplateNotFound { .. })
//! ));
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod shell;
pub mod template;
pub mod ui;

pub use error::{Result, VtError};
