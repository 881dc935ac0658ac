//! Environment runner.
//!
//! [`App`] owns the discovered template registry and the provider lookup
//! table. Every operation names a template by ID and a provider by name;
//! unknown names fail before anything is touched.

use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::provider::{Provider, ProviderRegistry, ProviderStatus};
use crate::template::{CorpusSync, SyncOutcome, Template, TemplateRegistry};

/// Loaded templates plus the providers that can run them.
#[derive(Debug)]
pub struct App {
    templates: TemplateRegistry,
    providers: ProviderRegistry,
}

impl App {
    /// Assemble an app from already-built parts.
    pub fn new(templates: TemplateRegistry, providers: ProviderRegistry) -> Self {
        Self {
            templates,
            providers,
        }
    }

    /// Fetch the corpus if needed, discover templates, and register the
    /// built-in providers.
    pub fn load(config: &AppConfig) -> Result<Self> {
        ensure_corpus(config)?;

        let templates = TemplateRegistry::discover(&config.templates_path)?;
        info!(
            "loaded {} templates from {}",
            templates.len(),
            config.templates_path.display()
        );

        let providers =
            ProviderRegistry::with_defaults(templates.root(), config.phase_timeout());
        Ok(Self::new(templates, providers))
    }

    /// Discovered templates.
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Registered providers.
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Look up a template by ID.
    pub fn template(&self, id: &str) -> Result<&Template> {
        self.templates.get_by_id(id)
    }

    /// Bring `id` up on `provider`, returning the template that was started.
    pub fn start(&self, id: &str, provider: &str) -> Result<&Template> {
        let (provider, template) = self.target(id, provider)?;
        info!("starting {} on {}", id, provider.name());
        provider.start(template)?;
        Ok(template)
    }

    /// Tear `id` down on `provider`.
    pub fn stop(&self, id: &str, provider: &str) -> Result<()> {
        let (provider, template) = self.target(id, provider)?;
        info!("stopping {} on {}", id, provider.name());
        provider.stop(template)
    }

    /// Report whether `id` is up on `provider`.
    pub fn status(&self, id: &str, provider: &str) -> Result<ProviderStatus> {
        let (provider, template) = self.target(id, provider)?;
        provider.status(template)
    }

    fn target(&self, id: &str, provider: &str) -> Result<(&dyn Provider, &Template)> {
        let provider = self.providers.get(provider)?;
        let template = self.templates.get_by_id(id)?;
        Ok((provider, template))
    }
}

/// Clone the corpus when its directory does not exist yet.
///
/// Returns the sync outcome when a clone happened.
pub fn ensure_corpus(config: &AppConfig) -> Result<Option<SyncOutcome>> {
    if config.templates_path.exists() {
        return Ok(None);
    }

    info!(
        "template corpus missing at {}, cloning {}",
        config.templates_path.display(),
        config.remote_repository
    );
    let outcome =
        CorpusSync::new(config.remote_repository.as_str()).sync(&config.templates_path, false)?;
    Ok(Some(outcome))
}
