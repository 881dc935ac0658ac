//! Template descriptor schema and parsing.
//!
//! A template directory is marked by an `index.yaml` descriptor that
//! describes one vulnerable environment and the providers able to run it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{Result, VtError};
use crate::ui::Table;

/// File name that marks a directory as a template directory.
pub const DESCRIPTOR_FILE: &str = "index.yaml";

/// A vulnerable target environment description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier (must equal the containing directory name)
    pub id: String,

    /// Descriptive metadata
    #[serde(default)]
    pub info: Info,

    /// Named proof-of-concept steps, each an ordered list of instructions
    #[serde(default, rename = "poc")]
    pub proof_of_concept: BTreeMap<String, Vec<String>>,

    /// Advisory remediation notes
    #[serde(default)]
    pub remediation: Vec<String>,

    /// Provider name to provider-specific configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Instructions shown after a successful start
    #[serde(default, rename = "post-install")]
    pub post_install: Vec<String>,
}

/// Metadata about a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(deserialize_with = "scalar_string")]
    pub author: String,
    pub targets: Vec<String>,
    #[serde(rename = "type", deserialize_with = "scalar_string")]
    pub kind: String,
    pub affected_versions: Vec<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub fixed_version: String,
    #[serde(deserialize_with = "scalar_string")]
    pub cwe: String,
    pub cvss: Cvss,
    pub tags: Vec<String>,
    pub references: Vec<String>,
}

/// Common Vulnerability Scoring System details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cvss {
    #[serde(deserialize_with = "scalar_string")]
    pub score: String,
    #[serde(deserialize_with = "scalar_string")]
    pub metrics: String,
}

/// Configuration for one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Environment file, relative to the template directory or absolute
    #[serde(default)]
    pub path: String,
}

/// Accept any YAML scalar for a string field (`score: 9.8`, `fixed_version: 2`).
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "invalid type: expected a scalar, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
        _ => "a scalar",
    }
}

/// Check whether `dir` directly contains a descriptor file.
pub fn is_template_dir(dir: &Path) -> bool {
    dir.join(DESCRIPTOR_FILE).is_file()
}

/// Parse the descriptor inside `dir`.
///
/// Does not check that the ID matches the directory name; the registry
/// does that since it knows which directory it is loading.
pub fn load_template(dir: &Path) -> Result<Template> {
    let path = dir.join(DESCRIPTOR_FILE);
    let content = fs::read_to_string(&path).map_err(|e| VtError::Parse {
        path: path.clone(),
        message: e.to_string(),
    })?;
    parse_template(&content).map_err(|e| VtError::Parse {
        path,
        message: e.to_string(),
    })
}

/// Parse descriptor content.
pub fn parse_template(content: &str) -> std::result::Result<Template, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

impl Template {
    /// Display name, falling back to the ID when the descriptor has none.
    pub fn display_name(&self) -> &str {
        if self.info.name.is_empty() {
            &self.id
        } else {
            &self.info.name
        }
    }

    /// Check whether any tag matches `filter` (case-insensitive substring).
    pub fn has_tag_matching(&self, filter: &str) -> bool {
        let needle = filter.to_lowercase();
        self.info
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
    }

    /// Provider names this template declares, sorted.
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Render every field as a two-column table.
    pub fn render_details(&self) -> String {
        let poc = self
            .proof_of_concept
            .iter()
            .map(|(step, lines)| format!("{}: {}", step, lines.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");

        let rows = [
            ("ID", self.id.clone()),
            ("Name", self.info.name.clone()),
            ("Description", self.info.description.clone()),
            ("Author", self.info.author.clone()),
            ("Type", self.info.kind.clone()),
            ("Targets", self.info.targets.join(", ")),
            ("Affected Versions", self.info.affected_versions.join(", ")),
            ("Fixed Version", self.info.fixed_version.clone()),
            ("CWE", self.info.cwe.clone()),
            ("CVSS Score", self.info.cvss.score.clone()),
            ("CVSS Metrics", self.info.cvss.metrics.clone()),
            ("Tags", self.info.tags.join(", ")),
            ("References", self.info.references.join(", ")),
            ("Proof of Concept", poc),
            ("Remediation", self.remediation.join("; ")),
            ("Providers", self.provider_names().join(", ")),
            ("Post Install", self.post_install.join("; ")),
        ];

        let mut table = Table::new(vec!["Field", "Value"]);
        for (field, value) in &rows {
            table.add_row(vec![*field, value.as_str()]);
        }
        table.render()
    }
}
