//! Docker compose provider.
//!
//! Brings a template's compose project up in fixed phases: build, pull,
//! create, start. Each phase is bounded by the backend's timeout and a
//! failure aborts the remaining phases without rolling back earlier ones.

pub mod backend;
pub mod cli;
pub mod project;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::template::{resolve_config_path, Template};

use super::{Provider, ProviderStatus};

pub use backend::{
    BackendError, ComposeBackend, ContainerSummary, CreateOptions, DownOptions, Phase,
};
pub use cli::{parse_ps_output, DockerComposeCli, DEFAULT_PHASE_TIMEOUT};
pub use project::{project_name, ComposeProject, ServiceSpec, PROJECT_PREFIX};

/// Registry key for this provider.
pub const PROVIDER_NAME: &str = "docker-compose";

/// Provider that runs templates as compose projects.
pub struct ComposeProvider<B: ComposeBackend = DockerComposeCli> {
    templates_root: PathBuf,
    backend: B,
}

impl<B: ComposeBackend> ComposeProvider<B> {
    /// Create a provider resolving templates under `templates_root`.
    pub fn new(templates_root: impl Into<PathBuf>, backend: B) -> Self {
        Self {
            templates_root: templates_root.into(),
            backend,
        }
    }

    /// Corpus root templates are resolved under.
    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    /// Underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve and parse the compose project for `template`.
    pub fn project(&self, template: &Template) -> Result<ComposeProject> {
        let config = resolve_config_path(&self.templates_root, &template.id, PROVIDER_NAME)?;
        debug!(
            "compose file for {}: {}",
            template.id,
            config.config_path.display()
        );
        ComposeProject::load(&template.id, &config)
    }

    fn phase<T>(
        &self,
        phase: Phase,
        project: &ComposeProject,
        run: impl FnOnce() -> std::result::Result<T, BackendError>,
    ) -> Result<T> {
        info!(project = %project.name, "{} phase", phase);
        run().map_err(|e| phase.error(&project.name, e))
    }
}

impl<B: ComposeBackend> Provider for ComposeProvider<B> {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn start(&self, template: &Template) -> Result<()> {
        let project = self.project(template)?;

        let buildable = project.buildable_services();
        if buildable.is_empty() {
            debug!(project = %project.name, "no services to build");
        } else {
            self.phase(Phase::Build, &project, || {
                self.backend.build(&project, &buildable)
            })?;
        }

        let pullable = project.pullable_services();
        if pullable.is_empty() {
            debug!(project = %project.name, "no images to pull");
        } else {
            self.phase(Phase::Pull, &project, || {
                self.backend.pull(&project, &pullable)
            })?;
        }

        let create = CreateOptions {
            force_recreate: true,
            remove_orphans: true,
        };
        self.phase(Phase::Create, &project, || {
            self.backend.create(&project, create)
        })?;
        self.phase(Phase::Start, &project, || self.backend.start(&project))?;

        info!(project = %project.name, "started");
        Ok(())
    }

    fn stop(&self, template: &Template) -> Result<()> {
        let project = self.project(template)?;
        let down = DownOptions {
            remove_orphans: true,
            volumes: true,
        };
        self.phase(Phase::Teardown, &project, || {
            self.backend.down(&project, down)
        })?;

        info!(project = %project.name, "stopped");
        Ok(())
    }

    fn status(&self, template: &Template) -> Result<ProviderStatus> {
        let project = self.project(template)?;
        let containers = self.phase(Phase::Status, &project, || {
            self.backend.ps(&project, true)
        })?;

        for container in &containers {
            debug!(
                project = %project.name,
                "{} ({}): {}",
                container.name,
                container.service,
                container.state
            );
        }
        Ok(ProviderStatus::from_containers(&containers))
    }
}
