//! Template discovery and indexing.
//!
//! The corpus is laid out as `root/<category>/.../<id>/index.yaml`. Discovery
//! walks every category, loads each template directory it meets and builds
//! an immutable [`TemplateRegistry`]. Any bad template aborts the whole pass.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, VtError};

use super::descriptor::{is_template_dir, load_template, Template};
use super::resolve::{resolve_config_path, ResolvedConfig};

/// Deepest directory level scanned below a category root.
pub const MAX_SCAN_DEPTH: usize = 10;

/// What the walker should do after a template directory was visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkControl {
    Continue,
    Stop,
}

/// Classification of one directory entry during a walk.
#[derive(Debug)]
enum Visit {
    Skip,
    Descend(PathBuf),
    Template(PathBuf),
}

/// Immutable index of templates keyed by ID.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    root: PathBuf,
    templates: HashMap<String, Template>,
    locations: HashMap<String, PathBuf>,
}

impl TemplateRegistry {
    /// Scan `root` and index every template below it.
    pub fn discover(root: &Path) -> Result<Self> {
        let mut templates: HashMap<String, Template> = HashMap::new();
        let mut locations: HashMap<String, PathBuf> = HashMap::new();

        for category in categories(root)? {
            debug!("scanning category {}", category.display());

            walk_category(&category, |dir, dir_name| {
                let template = load_template(dir)?;
                if template.id != dir_name {
                    return Err(VtError::IdMismatch {
                        id: template.id,
                        dir: dir_name.to_string(),
                    });
                }
                if let Some(existing) = templates.get(&template.id) {
                    return Err(VtError::DuplicateId {
                        id: template.id.clone(),
                        path: dir.to_path_buf(),
                        existing_name: existing.display_name().to_string(),
                        existing_path: locations[&template.id].clone(),
                    });
                }

                debug!("loaded template {} from {}", template.id, dir.display());
                locations.insert(template.id.clone(), dir.to_path_buf());
                templates.insert(template.id.clone(), template);
                Ok(WalkControl::Continue)
            })?;
        }

        Ok(Self {
            root: root.to_path_buf(),
            templates,
            locations,
        })
    }

    /// Corpus root this registry was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get a template by ID.
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    /// Get a template by ID, failing with `TemplateNotFound`.
    pub fn get_by_id(&self, id: &str) -> Result<&Template> {
        self.get(id)
            .ok_or_else(|| VtError::TemplateNotFound { id: id.to_string() })
    }

    /// Check if a template exists.
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Directory a template was loaded from.
    pub fn location(&self, id: &str) -> Option<&Path> {
        self.locations.get(id).map(|p| p.as_path())
    }

    /// Number of indexed templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check whether the corpus had no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterate over `(id, template)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(id, t)| (id.as_str(), t))
    }

    /// All template IDs, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// All templates, sorted by ID.
    pub fn templates_sorted(&self) -> Vec<&Template> {
        let mut all: Vec<&Template> = self.templates.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Templates with a tag matching `tag`, sorted by ID.
    pub fn filter_by_tag(&self, tag: &str) -> Vec<&Template> {
        self.templates_sorted()
            .into_iter()
            .filter(|t| t.has_tag_matching(tag))
            .collect()
    }

    /// Locate the config file `provider` should use for template `id`.
    ///
    /// Re-reads the corpus on every call.
    pub fn resolve_config_path(&self, id: &str, provider: &str) -> Result<ResolvedConfig> {
        resolve_config_path(&self.root, id, provider)
    }
}

/// Visible category directories directly under `root`, sorted by name.
pub(crate) fn categories(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        if is_hidden(&name.to_string_lossy()) || !entry.file_type()?.is_dir() {
            continue;
        }
        found.push(entry.path());
    }
    found.sort();
    Ok(found)
}

/// Depth-first walk of one category, calling `on_template` for each
/// template directory. Template directories are never descended into.
pub(crate) fn walk_category<F>(category: &Path, mut on_template: F) -> Result<()>
where
    F: FnMut(&Path, &str) -> Result<WalkControl>,
{
    let mut stack: Vec<(PathBuf, usize)> = vec![(category.to_path_buf(), 0)];

    while let Some((dir, depth)) = stack.pop() {
        let mut entries = fs::read_dir(&dir)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());

        let mut children = Vec::new();
        for entry in entries {
            match classify(&entry, depth + 1)? {
                Visit::Skip => {}
                Visit::Descend(path) => children.push((path, depth + 1)),
                Visit::Template(path) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if on_template(&path, &name)? == WalkControl::Stop {
                        return Ok(());
                    }
                }
            }
        }

        // Reverse so the stack pops siblings in name order.
        stack.extend(children.into_iter().rev());
    }

    Ok(())
}

fn classify(entry: &fs::DirEntry, depth: usize) -> Result<Visit> {
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if is_hidden(&name) {
        return Ok(Visit::Skip);
    }

    let file_type = entry.file_type()?;
    if file_type.is_symlink() {
        debug!("skipping symlink: {}", entry.path().display());
        return Ok(Visit::Skip);
    }
    if !file_type.is_dir() {
        return Ok(Visit::Skip);
    }

    let path = entry.path();
    if depth > MAX_SCAN_DEPTH {
        return Err(VtError::DepthExceeded {
            max: MAX_SCAN_DEPTH,
            path,
        });
    }

    if is_template_dir(&path) {
        Ok(Visit::Template(path))
    } else {
        Ok(Visit::Descend(path))
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::descriptor::DESCRIPTOR_FILE;
    use tempfile::TempDir;

    fn write_template(dir: &Path, id: &str, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(DESCRIPTOR_FILE),
            format!(
                "id: {id}\ninfo:\n  name: {name}\n  tags: [demo]\nproviders:\n  docker-compose:\n    path: docker-compose.yml\n"
            ),
        )
        .unwrap();
    }

    #[test]
    fn discovers_templates_across_categories() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join("web/sqli-basic"), "sqli-basic", "SQLi");
        write_template(&temp.path().join("db/weak-auth"), "weak-auth", "Weak Auth");

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert_eq!(registry.ids(), vec!["sqli-basic", "weak-auth"]);
        for (id, template) in registry.iter() {
            assert_eq!(id, template.id);
        }
        assert_eq!(
            registry.location("weak-auth").unwrap(),
            temp.path().join("db/weak-auth")
        );
    }

    #[test]
    fn finds_nested_templates() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join("web/php/legacy/rce"), "rce", "RCE");

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert!(registry.contains("rce"));
    }

    #[test]
    fn does_not_descend_into_template_directories() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("web/outer");
        write_template(&outer, "outer", "Outer");
        write_template(&outer.join("inner"), "inner", "Inner");

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert!(registry.contains("outer"));
        assert!(!registry.contains("inner"));
    }

    #[test]
    fn skips_hidden_entries_and_root_files() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join(".git/objects"), "objects", "Objects");
        write_template(&temp.path().join("web/.draft"), ".draft", "Draft");
        fs::write(temp.path().join("README.md"), "# corpus").unwrap();

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn id_mismatch_fails_discovery() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join("web/sqli"), "xss", "Wrong");

        let err = TemplateRegistry::discover(temp.path()).unwrap_err();
        match err {
            VtError::IdMismatch { id, dir } => {
                assert_eq!(id, "xss");
                assert_eq!(dir, "sqli");
            }
            other => panic!("expected IdMismatch, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_id_within_category_fails() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join("web/a/dup"), "dup", "First");
        write_template(&temp.path().join("web/b/dup"), "dup", "Second");

        let err = TemplateRegistry::discover(temp.path()).unwrap_err();
        match err {
            VtError::DuplicateId {
                id,
                path,
                existing_name,
                existing_path,
            } => {
                assert_eq!(id, "dup");
                assert_eq!(path, temp.path().join("web/b/dup"));
                assert_eq!(existing_name, "First");
                assert_eq!(existing_path, temp.path().join("web/a/dup"));
            }
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_id_across_categories_fails() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join("api/sqli-basic"), "sqli-basic", "API");
        write_template(&temp.path().join("web/sqli-basic"), "sqli-basic", "Web");

        let err = TemplateRegistry::discover(temp.path()).unwrap_err();
        assert!(matches!(err, VtError::DuplicateId { .. }));
    }

    #[test]
    fn malformed_descriptor_fails_discovery() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join("web/good"), "good", "Good");
        let bad = temp.path().join("web/bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join(DESCRIPTOR_FILE), "id: bad\nremediation: nope\n").unwrap();

        let err = TemplateRegistry::discover(temp.path()).unwrap_err();
        assert!(matches!(err, VtError::Parse { .. }));
    }

    fn nested_path(base: &Path, levels: usize) -> PathBuf {
        let mut path = base.to_path_buf();
        for i in 0..levels {
            path = path.join(format!("d{i}"));
        }
        path
    }

    #[test]
    fn template_at_depth_ceiling_is_found() {
        let temp = TempDir::new().unwrap();
        let dir = nested_path(&temp.path().join("web"), MAX_SCAN_DEPTH - 1).join("deep");
        write_template(&dir, "deep", "Deep");

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert!(registry.contains("deep"));
    }

    #[test]
    fn directory_past_depth_ceiling_fails() {
        let temp = TempDir::new().unwrap();
        let dir = nested_path(&temp.path().join("web"), MAX_SCAN_DEPTH).join("deeper");
        write_template(&dir, "deeper", "Deeper");

        let err = TemplateRegistry::discover(temp.path()).unwrap_err();
        match err {
            VtError::DepthExceeded { max, .. } => assert_eq!(max, MAX_SCAN_DEPTH),
            other => panic!("expected DepthExceeded, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_entered() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        write_template(&outside.path().join("linked"), "linked", "Linked");
        fs::create_dir_all(temp.path().join("web")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("linked"),
            temp.path().join("web/linked"),
        )
        .unwrap();

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert!(!registry.contains("linked"));
    }

    #[cfg(unix)]
    #[test]
    fn circular_symlink_does_not_loop() {
        let temp = TempDir::new().unwrap();
        let web = temp.path().join("web");
        write_template(&web.join("real"), "real", "Real");
        std::os::unix::fs::symlink(&web, web.join("loop")).unwrap();

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert_eq!(registry.ids(), vec!["real"]);
    }

    #[test]
    fn lookup_and_filtering() {
        let temp = TempDir::new().unwrap();
        write_template(&temp.path().join("web/b-tmpl"), "b-tmpl", "B");
        write_template(&temp.path().join("web/a-tmpl"), "a-tmpl", "A");

        let registry = TemplateRegistry::discover(temp.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_by_id("a-tmpl").unwrap().info.name, "A");
        assert!(matches!(
            registry.get_by_id("missing"),
            Err(VtError::TemplateNotFound { .. })
        ));

        let sorted: Vec<&str> = registry
            .templates_sorted()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(sorted, vec!["a-tmpl", "b-tmpl"]);
        assert_eq!(registry.filter_by_tag("DEMO").len(), 2);
        assert!(registry.filter_by_tag("xss").is_empty());
    }

    #[test]
    fn missing_root_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = TemplateRegistry::discover(&temp.path().join("absent")).unwrap_err();
        assert!(matches!(err, VtError::Io(_)));
    }
}
