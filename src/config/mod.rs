//! Application configuration.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading and environment overrides in [`loader`]
//!
//! # Example
//!
//! ```
//! use vt::config::{parse_config, AppConfig};
//! use std::path::Path;
//!
//! let config = parse_config("phase_timeout_secs: 120\n", Path::new("config.yml")).unwrap();
//! assert_eq!(config.phase_timeout_secs, 120);
//! assert_eq!(config.default_provider, AppConfig::default().default_provider);
//! ```
//!
//! # Configuration Sources
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults
//! 2. User config (`~/.vt/config.yml`)
//! 3. `VT_TEMPLATES_PATH`, `VT_REMOTE_REPOSITORY`, `VT_PHASE_TIMEOUT`
//! 4. Command-line flags

pub mod loader;
pub mod schema;

pub use schema::{AppConfig, OutputMode, DEFAULT_TEMPLATES_DIR};

pub use loader::{
    apply_env_overrides, load_config, load_config_file, parse_config, user_config_path,
    ENV_PHASE_TIMEOUT, ENV_REMOTE_REPOSITORY, ENV_TEMPLATES_PATH,
};
