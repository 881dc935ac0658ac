//! Integration tests for the public template registry API.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vt::template::{resolve_config_path, TemplateRegistry};
use vt::VtError;

fn write_template(root: &Path, category: &str, id: &str, descriptor: &str) {
    let dir = root.join(category).join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("index.yaml"), descriptor).unwrap();
}

#[test]
fn discovers_templates_across_categories() {
    let temp = TempDir::new().unwrap();
    write_template(
        temp.path(),
        "web",
        "sqli-basic",
        "id: sqli-basic\ninfo:\n  tags: [sqli]\n",
    );
    write_template(temp.path(), "db", "weak-auth", "id: weak-auth\n");

    let registry = TemplateRegistry::discover(temp.path()).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.ids(), vec!["sqli-basic", "weak-auth"]);
    assert_eq!(registry.get_by_id("sqli-basic").unwrap().info.tags, vec!["sqli"]);
}

#[test]
fn duplicate_ids_across_categories_fail() {
    let temp = TempDir::new().unwrap();
    write_template(temp.path(), "web", "sqli-basic", "id: sqli-basic\n");
    write_template(temp.path(), "api", "sqli-basic", "id: sqli-basic\n");

    let err = TemplateRegistry::discover(temp.path()).unwrap_err();
    assert!(matches!(err, VtError::DuplicateId { ref id, .. } if id == "sqli-basic"));
}

#[test]
fn resolution_returns_absolute_existing_path() {
    let temp = TempDir::new().unwrap();
    write_template(
        temp.path(),
        "web",
        "sqli-basic",
        "id: sqli-basic\nproviders:\n  docker-compose:\n    path: docker-compose.yml\n",
    );
    let template_dir = temp.path().join("web/sqli-basic");
    fs::write(template_dir.join("docker-compose.yml"), "services: {}\n").unwrap();

    let resolved = resolve_config_path(temp.path(), "sqli-basic", "docker-compose").unwrap();

    assert!(resolved.config_path.is_absolute());
    assert!(resolved.config_path.is_file());
    assert!(resolved.working_dir.ends_with("web/sqli-basic"));
}

#[test]
fn resolution_sees_templates_added_after_discovery() {
    let temp = TempDir::new().unwrap();
    write_template(temp.path(), "web", "sqli-basic", "id: sqli-basic\n");
    let registry = TemplateRegistry::discover(temp.path()).unwrap();

    write_template(
        temp.path(),
        "web",
        "xss-stored",
        "id: xss-stored\nproviders:\n  docker-compose:\n    path: compose.yml\n",
    );
    fs::write(temp.path().join("web/xss-stored/compose.yml"), "services: {}\n").unwrap();

    assert!(registry.get_by_id("xss-stored").is_err());
    assert!(registry
        .resolve_config_path("xss-stored", "docker-compose")
        .is_ok());
}

#[test]
fn resolution_errors_are_distinct() {
    let temp = TempDir::new().unwrap();
    write_template(
        temp.path(),
        "web",
        "sqli-basic",
        "id: sqli-basic\nproviders:\n  docker-compose:\n    path: missing.yml\n",
    );

    assert!(matches!(
        resolve_config_path(temp.path(), "nope", "docker-compose"),
        Err(VtError::TemplateNotFound { .. })
    ));
    assert!(matches!(
        resolve_config_path(temp.path(), "sqli-basic", "kubernetes"),
        Err(VtError::ProviderNotConfigured { .. })
    ));
    assert!(matches!(
        resolve_config_path(temp.path(), "sqli-basic", "docker-compose"),
        Err(VtError::InvalidPath { .. })
    ));
}
