//! Error types for vt operations.
//!
//! This module defines [`VtError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Registry and resolution errors are fatal for the whole pass: one bad
//!   template aborts discovery instead of being silently dropped
//! - Backend errors name the lifecycle phase that failed; completed phases
//!   are never rolled back
//! - Use `anyhow::Error` (via `VtError::Other`) for unexpected errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for vt operations.
#[derive(Debug, Error)]
pub enum VtError {
    /// A descriptor or topology file is missing, malformed, or mistyped.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Descriptor ID differs from the directory it was loaded from.
    #[error("Template id '{id}' and directory name '{dir}' should match")]
    IdMismatch { id: String, dir: String },

    /// Two template directories declare the same ID.
    #[error(
        "Duplicate template id '{id}' at {path} (already loaded: {existing_name} at {existing_path})"
    )]
    DuplicateId {
        id: String,
        path: PathBuf,
        existing_name: String,
        existing_path: PathBuf,
    },

    /// Corpus nesting exceeded the scan ceiling.
    #[error("Maximum directory depth ({max}) exceeded at {path}")]
    DepthExceeded { max: usize, path: PathBuf },

    /// No template with this ID exists in the corpus.
    #[error("Template '{id}' not found")]
    TemplateNotFound { id: String },

    /// Template has no configuration for the requested provider.
    #[error("Template '{id}' has no '{provider}' provider configuration")]
    ProviderNotConfigured { id: String, provider: String },

    /// Provider configuration path is empty or does not exist.
    #[error("Template '{id}' has invalid provider path '{path}': {reason}")]
    InvalidPath {
        id: String,
        path: PathBuf,
        reason: String,
    },

    /// No provider registered under this name.
    #[error("Provider '{name}' not found")]
    UnknownProvider { name: String },

    /// Building service images failed.
    #[error("Build failed for {project}: {message}")]
    BuildFailed { project: String, message: String },

    /// Pulling service images failed.
    #[error("Pull failed for {project}: {message}")]
    PullFailed { project: String, message: String },

    /// Creating service containers failed.
    #[error("Create failed for {project}: {message}")]
    CreateFailed { project: String, message: String },

    /// Starting service containers failed.
    #[error("Start failed for {project}: {message}")]
    StartFailed { project: String, message: String },

    /// Tearing down the project failed.
    #[error("Teardown failed for {project}: {message}")]
    TeardownFailed { project: String, message: String },

    /// Listing project resources failed.
    #[error("Status query failed for {project}: {message}")]
    StatusFailed { project: String, message: String },

    /// A backend phase did not finish before its deadline.
    #[error("{phase} phase for {project} timed out after {}s", after.as_secs())]
    Timeout {
        phase: String,
        project: String,
        after: Duration,
    },

    /// The local corpus has uncommitted changes and sync was not forced.
    #[error("Detected uncommitted changes in {path} (use --force to overwrite)")]
    DirtyCorpus { path: PathBuf },

    /// Fetching or updating the corpus failed.
    #[error("Template sync failed: {message}")]
    SyncFailed { message: String },

    /// Application config file could not be loaded.
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for vt operations.
pub type Result<T> = std::result::Result<T, VtError>;
