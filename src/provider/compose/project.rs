//! Compose project model.
//!
//! Only the parts of a compose file the provider reasons about are modelled:
//! service names and whether a service builds or pulls. Resource identity
//! comes from the project name passed to the engine, which stamps its own
//! project and service labels.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VtError};
use crate::template::ResolvedConfig;

/// Prefix for compose project names.
pub const PROJECT_PREFIX: &str = "vt-compose";

/// Stable compose project name for a template.
pub fn project_name(template_id: &str) -> String {
    format!("{}-{}", PROJECT_PREFIX, template_id)
}

/// A parsed compose file bound to a project identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeProject {
    /// Project name every resource is grouped under.
    pub name: String,
    /// Absolute path to the compose file.
    pub config_path: PathBuf,
    /// Directory relative paths in the compose file resolve against.
    pub working_dir: PathBuf,
    /// Services keyed by name.
    pub services: BTreeMap<String, ServiceSpec>,
}

/// What the provider needs to know about one service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSpec {
    /// Registry image reference, if any.
    pub image: Option<String>,
    /// Whether the service declares a build step.
    pub builds: bool,
}

impl ComposeProject {
    /// Load the compose file at `config` for `template_id`.
    pub fn load(template_id: &str, config: &ResolvedConfig) -> Result<Self> {
        let content = fs::read_to_string(&config.config_path).map_err(|e| VtError::Parse {
            path: config.config_path.clone(),
            message: e.to_string(),
        })?;
        Self::parse(
            &project_name(template_id),
            &content,
            &config.config_path,
            &config.working_dir,
        )
    }

    /// Parse compose `content` under the given project identity.
    pub fn parse(
        name: &str,
        content: &str,
        config_path: &Path,
        working_dir: &Path,
    ) -> Result<Self> {
        let parse_error = |message: String| VtError::Parse {
            path: config_path.to_path_buf(),
            message,
        };

        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        let services = match document.get("services") {
            None | Some(serde_yaml::Value::Null) => serde_yaml::Mapping::new(),
            Some(serde_yaml::Value::Mapping(m)) => m.clone(),
            Some(_) => return Err(parse_error("'services' must be a mapping".to_string())),
        };
        if services.is_empty() {
            return Err(parse_error("no services defined".to_string()));
        }

        let mut specs = BTreeMap::new();
        for (key, definition) in &services {
            let service = key
                .as_str()
                .ok_or_else(|| parse_error("service names must be strings".to_string()))?;
            let spec = match definition {
                serde_yaml::Value::Null => serde_yaml::Mapping::new(),
                serde_yaml::Value::Mapping(m) => m.clone(),
                _ => {
                    return Err(parse_error(format!(
                        "service '{}' must be a mapping",
                        service
                    )))
                }
            };

            let image = match spec.get("image") {
                None | Some(serde_yaml::Value::Null) => None,
                Some(serde_yaml::Value::String(s)) => Some(s.clone()),
                Some(_) => {
                    return Err(parse_error(format!(
                        "service '{}' image must be a string",
                        service
                    )))
                }
            };
            let builds = spec
                .get("build")
                .is_some_and(|b| !matches!(b, serde_yaml::Value::Null));

            specs.insert(service.to_string(), ServiceSpec { image, builds });
        }

        Ok(Self {
            name: name.to_string(),
            config_path: config_path.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
            services: specs,
        })
    }

    /// All service names, sorted.
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Services that declare a build step.
    pub fn buildable_services(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|(_, s)| s.builds)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Services that reference a registry image and do not build it locally.
    pub fn pullable_services(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|(_, s)| s.image.is_some() && !s.builds)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COMPOSE: &str = r#"
services:
  web:
    build: ./app
    image: vt/sqli-web:latest
    ports: ["8080:80"]
  db:
    image: mysql:5.7
    environment:
      MYSQL_ROOT_PASSWORD: root
  sidecar:
"#;

    fn parse(content: &str) -> Result<ComposeProject> {
        ComposeProject::parse(
            "vt-compose-sqli",
            content,
            Path::new("/corpus/web/sqli/docker-compose.yml"),
            Path::new("/corpus/web/sqli"),
        )
    }

    #[test]
    fn project_name_is_prefixed_template_id() {
        assert_eq!(project_name("sqli-basic"), "vt-compose-sqli-basic");
    }

    #[test]
    fn classifies_build_and_pull_services() {
        let project = parse(COMPOSE).unwrap();
        assert_eq!(project.service_names(), vec!["db", "sidecar", "web"]);
        assert_eq!(project.buildable_services(), vec!["web"]);
        assert_eq!(project.pullable_services(), vec!["db"]);
    }

    #[test]
    fn service_model_keeps_only_image_and_build() {
        let project = parse(COMPOSE).unwrap();
        assert_eq!(
            project.services["web"],
            ServiceSpec {
                image: Some("vt/sqli-web:latest".to_string()),
                builds: true,
            }
        );
        assert_eq!(
            project.services["sidecar"],
            ServiceSpec {
                image: None,
                builds: false,
            }
        );
        assert_eq!(project.name, "vt-compose-sqli");
    }

    #[test]
    fn missing_services_is_rejected() {
        assert!(matches!(
            parse("version: '3'\n"),
            Err(VtError::Parse { .. })
        ));
    }

    #[test]
    fn non_mapping_service_is_rejected() {
        assert!(parse("services:\n  web: nginx\n").is_err());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(parse("services: [unclosed").is_err());
    }

    #[test]
    fn load_reads_resolved_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docker-compose.yml");
        fs::write(&path, COMPOSE).unwrap();
        let config = ResolvedConfig {
            config_path: path.clone(),
            working_dir: temp.path().to_path_buf(),
        };

        let project = ComposeProject::load("sqli", &config).unwrap();
        assert_eq!(project.name, "vt-compose-sqli");
        assert_eq!(project.config_path, path);
        assert_eq!(project.working_dir, temp.path());
    }
}
