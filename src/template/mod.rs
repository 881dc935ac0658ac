//! Template corpus handling.
//!
//! - [`descriptor`] - the `index.yaml` schema and parser
//! - [`registry`] - corpus discovery and the immutable ID index
//! - [`resolve`] - provider configuration lookup
//! - [`sync`] - keeping the local corpus checkout up to date
//!
//! # Example
//!
//! ```
//! use std::fs;
//! use tempfile::TempDir;
//! use vt::template::TemplateRegistry;
//!
//! let corpus = TempDir::new().unwrap();
//! let dir = corpus.path().join("web").join("sqli-basic");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("index.yaml"), "id: sqli-basic\n").unwrap();
//!
//! let registry = TemplateRegistry::discover(corpus.path()).unwrap();
//! assert!(registry.contains("sqli-basic"));
//! ```

pub mod descriptor;
pub mod registry;
pub mod resolve;
pub mod sync;

pub use descriptor::{
    is_template_dir, load_template, parse_template, Cvss, Info, ProviderConfig, Template,
    DESCRIPTOR_FILE,
};
pub use registry::{TemplateRegistry, MAX_SCAN_DEPTH};
pub use resolve::{resolve_config_path, ResolvedConfig};
pub use sync::{CorpusSync, SyncOutcome, TEMPLATE_REMOTE_REPOSITORY};
