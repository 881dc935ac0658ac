//! Contract between the compose provider and a compose engine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::VtError;

use super::project::ComposeProject;

/// Failure reported by a backend primitive.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The primitive did not finish before its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The primitive ran and failed.
    #[error("{0}")]
    Failed(String),
}

/// Lifecycle phase a backend call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Build,
    Pull,
    Create,
    Start,
    Teardown,
    Status,
}

impl Phase {
    /// Convert a backend failure in this phase into the matching error.
    pub fn error(self, project: &str, err: BackendError) -> VtError {
        let project = project.to_string();
        let message = match err {
            BackendError::Timeout(after) => {
                return VtError::Timeout {
                    phase: self.to_string(),
                    project,
                    after,
                }
            }
            BackendError::Failed(message) => message,
        };

        match self {
            Phase::Build => VtError::BuildFailed { project, message },
            Phase::Pull => VtError::PullFailed { project, message },
            Phase::Create => VtError::CreateFailed { project, message },
            Phase::Start => VtError::StartFailed { project, message },
            Phase::Teardown => VtError::TeardownFailed { project, message },
            Phase::Status => VtError::StatusFailed { project, message },
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Build => "build",
            Phase::Pull => "pull",
            Phase::Create => "create",
            Phase::Start => "start",
            Phase::Teardown => "teardown",
            Phase::Status => "status",
        };
        f.write_str(name)
    }
}

/// Options for creating project containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOptions {
    /// Recreate containers even if their configuration is unchanged.
    pub force_recreate: bool,
    /// Remove containers for services no longer in the project.
    pub remove_orphans: bool,
}

/// Options for tearing a project down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownOptions {
    /// Remove containers for services no longer in the project.
    pub remove_orphans: bool,
    /// Remove named and anonymous volumes.
    pub volumes: bool,
}

/// One container belonging to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Service", default)]
    pub service: String,
    #[serde(rename = "State", default)]
    pub state: String,
}

impl ContainerSummary {
    /// Whether the engine reports this container as running.
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// Primitives a compose engine must expose, keyed by the project's name.
///
/// `down` must succeed when nothing exists for the project.
pub trait ComposeBackend {
    /// Build images for `services`.
    fn build(&self, project: &ComposeProject, services: &[String]) -> Result<(), BackendError>;

    /// Pull registry images for `services`.
    fn pull(&self, project: &ComposeProject, services: &[String]) -> Result<(), BackendError>;

    /// Create (or recreate) containers for every service.
    fn create(&self, project: &ComposeProject, options: CreateOptions)
        -> Result<(), BackendError>;

    /// Start every created container.
    fn start(&self, project: &ComposeProject) -> Result<(), BackendError>;

    /// Stop and remove everything belonging to the project.
    fn down(&self, project: &ComposeProject, options: DownOptions) -> Result<(), BackendError>;

    /// List the project's containers, including stopped ones when `all`.
    fn ps(&self, project: &ComposeProject, all: bool)
        -> Result<Vec<ContainerSummary>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_map_to_phase_errors() {
        let err = Phase::Build.error("p", BackendError::Failed("no Dockerfile".into()));
        assert!(matches!(err, VtError::BuildFailed { .. }));

        let err = Phase::Pull.error("p", BackendError::Failed("denied".into()));
        assert!(matches!(err, VtError::PullFailed { .. }));

        let err = Phase::Create.error("p", BackendError::Failed("conflict".into()));
        assert!(matches!(err, VtError::CreateFailed { .. }));

        let err = Phase::Start.error("p", BackendError::Failed("port taken".into()));
        assert!(matches!(err, VtError::StartFailed { .. }));

        let err = Phase::Teardown.error("p", BackendError::Failed("busy".into()));
        assert!(matches!(err, VtError::TeardownFailed { .. }));

        let err = Phase::Status.error("p", BackendError::Failed("daemon down".into()));
        assert!(matches!(err, VtError::StatusFailed { .. }));
    }

    #[test]
    fn timeout_maps_to_timeout_in_any_phase() {
        let err = Phase::Pull.error("vt-compose-x", BackendError::Timeout(Duration::from_secs(5)));
        match err {
            VtError::Timeout {
                phase,
                project,
                after,
            } => {
                assert_eq!(phase, "pull");
                assert_eq!(project, "vt-compose-x");
                assert_eq!(after, Duration::from_secs(5));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[test]
    fn container_summary_deserializes_engine_fields() {
        let json = r#"{"Name":"vt-compose-x-web-1","Service":"web","State":"running","Health":""}"#;
        let summary: ContainerSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.service, "web");
        assert!(summary.is_running());
    }
}
