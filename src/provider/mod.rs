//! Provider abstraction.
//!
//! A provider turns a template into running infrastructure. Providers are
//! looked up by name; the only built-in one is the docker compose provider.

pub mod compose;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, VtError};
use crate::template::Template;

pub use compose::{ComposeProvider, ContainerSummary, DockerComposeCli, PROVIDER_NAME};

/// Coarse state of a template's environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    /// Every container is running.
    Up,
    /// Nothing exists, or something is not running.
    Down,
}

impl ProviderStatus {
    /// Up only when the list is non-empty and every container is running.
    pub fn from_containers(containers: &[ContainerSummary]) -> Self {
        if !containers.is_empty() && containers.iter().all(ContainerSummary::is_running) {
            ProviderStatus::Up
        } else {
            ProviderStatus::Down
        }
    }

    pub fn is_up(self) -> bool {
        self == ProviderStatus::Up
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Up => f.write_str("up"),
            ProviderStatus::Down => f.write_str("down"),
        }
    }
}

/// Lifecycle operations a provider offers for a template.
pub trait Provider {
    /// Name the provider is registered under.
    fn name(&self) -> &str;

    /// Bring the template's environment up. Safe to repeat.
    fn start(&self, template: &Template) -> Result<()>;

    /// Tear the template's environment down. Succeeds when nothing is running.
    fn stop(&self, template: &Template) -> Result<()>;

    /// Report whether the template's environment is up.
    fn status(&self, template: &Template) -> Result<ProviderStatus>;
}

/// Providers keyed by name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Box<dyn Provider>>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in providers for a corpus.
    pub fn with_defaults(templates_root: impl Into<PathBuf>, phase_timeout: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ComposeProvider::new(
            templates_root,
            DockerComposeCli::new(phase_timeout),
        )));
        registry
    }

    /// Add a provider, replacing any registered under the same name.
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Result<&dyn Provider> {
        self.providers
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| VtError::UnknownProvider {
                name: name.to_string(),
            })
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
