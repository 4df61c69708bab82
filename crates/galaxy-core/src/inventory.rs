//! Inventory of release and secret files per namespace
//!
//! An inventory is built by scanning namespace directories. Every file found is parsed
//! either as a release component or as a secret manifest; a file that is neither stops
//! the scan. Namespaces and release names can then be rewritten, which is how a plan
//! derives the inventory of an environment.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::Span;

use crate::error::{CoreError, Result};
use crate::manifest::{Component, Manifest, Release, SecretManifest};

/// Renames a release, given its namespace and current name
pub trait ReleaseRenamer {
    fn rename(&self, namespace: &str, name: &str) -> Result<String>;
}

impl<F> ReleaseRenamer for F
where
    F: Fn(&str, &str) -> Result<String>,
{
    fn rename(&self, namespace: &str, name: &str) -> Result<String> {
        self(namespace, name)
    }
}

/// Renames a namespace
pub trait NamespaceRenamer {
    fn rename(&self, namespace: &str) -> String;
}

impl<F> NamespaceRenamer for F
where
    F: Fn(&str) -> String,
{
    fn rename(&self, namespace: &str) -> String {
        self(namespace)
    }
}

/// Releases and secret manifests keyed by namespace, in insertion order
#[derive(Debug, Clone)]
pub struct Inventory {
    span: Span,
    releases: IndexMap<String, Vec<Release>>,
    secrets: IndexMap<String, Vec<SecretManifest>>,
    /// Renamed namespace to the namespace it was scanned under
    origins: IndexMap<String, String>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(Span::none())
    }
}

impl PartialEq for Inventory {
    fn eq(&self, other: &Self) -> bool {
        self.releases == other.releases
            && self.secrets == other.secrets
            && self.origins == other.origins
    }
}

impl Inventory {
    /// Create an empty inventory, logging under `span`
    pub fn new(span: Span) -> Self {
        Self {
            span,
            releases: IndexMap::new(),
            secrets: IndexMap::new(),
            origins: IndexMap::new(),
        }
    }

    /// Empty inventory sharing this one's logging span
    pub(crate) fn empty_like(&self) -> Self {
        Self::new(self.span.clone())
    }

    /// Scan a namespace directory for files with the given extensions
    ///
    /// Extensions are handled in order, files of one extension sorted by name. A file
    /// matched by more than one extension is added once.
    pub fn inspect_dir(&mut self, namespace: &str, dir: &Path, extensions: &[String]) -> Result<()> {
        tracing::info!(parent: &self.span, namespace, dir = %dir.display(), "inspecting namespace");

        if !dir.is_dir() {
            return Err(CoreError::DirectoryNotFound {
                namespace: namespace.to_string(),
                path: dir.display().to_string(),
            });
        }

        let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
        let mut seen = HashSet::new();

        for ext in extensions {
            let pattern = format!("{}/*.{}", escaped_dir, glob::Pattern::escape(ext));
            let entries = glob::glob(&pattern).map_err(|e| CoreError::Glob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

            let mut files = entries
                .map(|entry| {
                    entry.map_err(|e| {
                        let path = e.path().to_path_buf();
                        CoreError::io(path, e.into())
                    })
                })
                .collect::<Result<Vec<PathBuf>>>()?;
            files.retain(|f| f.is_file());
            files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

            for file in files {
                if seen.insert(file.clone()) {
                    self.add_file(namespace, &file)?;
                }
            }
        }

        tracing::debug!(
            parent: &self.span,
            namespace,
            releases = self.releases.get(namespace).map_or(0, Vec::len),
            secrets = self.secrets.get(namespace).map_or(0, Vec::len),
            "namespace inspected"
        );
        Ok(())
    }

    /// Parse a file and add it to the namespace as release or secret manifest
    pub fn add_file(&mut self, namespace: &str, file: &Path) -> Result<()> {
        let bytes = std::fs::read(file).map_err(|e| CoreError::io(file, e))?;

        let release_error = match serde_yaml::from_slice::<Component>(&bytes) {
            Ok(component) => {
                tracing::debug!(
                    parent: &self.span,
                    namespace,
                    file = %file.display(),
                    release = %component.name,
                    "release file"
                );
                self.push_release(Release {
                    namespace: namespace.to_string(),
                    file: file.to_path_buf(),
                    component,
                });
                return Ok(());
            }
            Err(e) => e,
        };

        match serde_yaml::from_slice::<Manifest>(&bytes) {
            Ok(manifest) => {
                tracing::debug!(
                    parent: &self.span,
                    namespace,
                    file = %file.display(),
                    "secret manifest file"
                );
                self.push_secret(SecretManifest {
                    namespace: namespace.to_string(),
                    file: file.to_path_buf(),
                    manifest,
                });
                Ok(())
            }
            Err(secret_error) => Err(CoreError::UnrecognizedFileFormat {
                namespace: namespace.to_string(),
                path: file.display().to_string(),
                release_error: release_error.to_string(),
                secret_error: secret_error.to_string(),
            }),
        }
    }

    pub(crate) fn push_release(&mut self, release: Release) {
        self.push_release_to(&release.namespace.clone(), release);
    }

    pub(crate) fn push_release_to(&mut self, namespace: &str, release: Release) {
        self.releases
            .entry(namespace.to_string())
            .or_default()
            .push(release);
    }

    pub(crate) fn push_secret(&mut self, secret: SecretManifest) {
        self.push_secret_to(&secret.namespace.clone(), secret);
    }

    pub(crate) fn push_secret_to(&mut self, namespace: &str, secret: SecretManifest) {
        self.secrets
            .entry(namespace.to_string())
            .or_default()
            .push(secret);
    }

    pub(crate) fn set_origin(&mut self, namespace: &str, original: &str) {
        if namespace != original {
            self.origins
                .entry(namespace.to_string())
                .or_insert_with(|| original.to_string());
        }
    }

    pub fn releases(&self) -> &IndexMap<String, Vec<Release>> {
        &self.releases
    }

    pub fn secrets(&self) -> &IndexMap<String, Vec<SecretManifest>> {
        &self.secrets
    }

    pub fn namespace_releases(&self, namespace: &str) -> &[Release] {
        self.releases.get(namespace).map_or(&[], Vec::as_slice)
    }

    pub fn namespace_secrets(&self, namespace: &str) -> &[SecretManifest] {
        self.secrets.get(namespace).map_or(&[], Vec::as_slice)
    }

    /// Namespaces holding releases or secrets, releases' namespaces first
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self.releases.keys().map(String::as_str).collect();
        for ns in self.secrets.keys() {
            if !self.releases.contains_key(ns) {
                namespaces.push(ns);
            }
        }
        namespaces
    }

    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.releases.contains_key(namespace) || self.secrets.contains_key(namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty() && self.secrets.is_empty()
    }

    /// Files per namespace, release files first, then secret manifests
    pub fn namespace_files_map(&self) -> IndexMap<String, Vec<PathBuf>> {
        self.namespaces()
            .into_iter()
            .map(|ns| {
                let files = self
                    .namespace_releases(ns)
                    .iter()
                    .map(|r| r.file.clone())
                    .chain(self.namespace_secrets(ns).iter().map(|s| s.file.clone()))
                    .collect();
                (ns.to_string(), files)
            })
            .collect()
    }

    /// Namespace the given one was scanned under, before any rename
    pub fn original_namespace(&self, namespace: &str) -> Option<&str> {
        if let Some(original) = self.origins.get(namespace) {
            return Some(original);
        }
        self.releases
            .get_key_value(namespace)
            .map(|(k, _)| k.as_str())
            .or_else(|| self.secrets.get_key_value(namespace).map(|(k, _)| k.as_str()))
    }

    /// Renamed namespaces and their original names
    pub fn namespace_map(&self) -> &IndexMap<String, String> {
        &self.origins
    }

    /// Rename every release in place, in namespace then insertion order
    ///
    /// Stops at the first error; releases renamed before it keep their new name.
    pub fn rename_releases<R: ReleaseRenamer + ?Sized>(&mut self, renamer: &R) -> Result<()> {
        let span = self.span.clone();
        for (namespace, releases) in self.releases.iter_mut() {
            for release in releases.iter_mut() {
                let name = renamer.rename(namespace, &release.component.name)?;
                tracing::debug!(
                    parent: &span,
                    namespace = %namespace,
                    from = %release.component.name,
                    to = %name,
                    "release renamed"
                );
                release.component.name = name;
            }
        }
        Ok(())
    }

    /// New inventory with every namespace key renamed
    ///
    /// Namespaces renamed to the same key have their lists concatenated. The original
    /// names are kept, see [`Inventory::original_namespace`].
    pub fn rename_namespaces<R: NamespaceRenamer + ?Sized>(&self, renamer: &R) -> Inventory {
        let mut renamed = self.empty_like();

        for (namespace, releases) in &self.releases {
            let target = renamer.rename(namespace);
            renamed.record_rename(self, namespace, &target);
            renamed
                .releases
                .entry(target)
                .or_default()
                .extend(releases.iter().cloned());
        }
        for (namespace, secrets) in &self.secrets {
            let target = renamer.rename(namespace);
            renamed.record_rename(self, namespace, &target);
            renamed
                .secrets
                .entry(target)
                .or_default()
                .extend(secrets.iter().cloned());
        }

        renamed
    }

    fn record_rename(&mut self, source: &Inventory, namespace: &str, target: &str) {
        let original = source.original_namespace(namespace).unwrap_or(namespace);
        if target != namespace || source.origins.contains_key(namespace) {
            tracing::debug!(parent: &self.span, from = namespace, to = target, "namespace renamed");
        }
        self.set_origin(target, original);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const RELEASE: &str = "name: {name}\nrelease:\n  chart: stable/{name}:0.1.0\n  version: \"0.1.0\"\n";
    const SECRET: &str =
        "secrets:\n  ingress:\n    path: secret/data/ingress\n    data:\n      - name: tls.crt\n";

    fn release(name: &str) -> String {
        RELEASE.replace("{name}", name)
    }

    fn write(dir: &Path, file: &str, content: &str) {
        fs::write(dir.join(file), content).unwrap();
    }

    /// ns1: two releases and a secret, ns2: one release
    fn populated() -> (TempDir, Inventory) {
        let dir = TempDir::new().unwrap();
        let ns1 = dir.path().join("ns1");
        let ns2 = dir.path().join("ns2");
        fs::create_dir_all(&ns1).unwrap();
        fs::create_dir_all(&ns2).unwrap();

        write(&ns1, "app2.yaml", &release("app2"));
        write(&ns1, "app1.yaml", &release("app1"));
        write(&ns1, "ingress-secret.yaml", SECRET);
        write(&ns1, "notes.txt", "ignored");
        write(&ns2, "app3.yaml", &release("app3"));

        let extensions = vec!["yaml".to_string()];
        let mut inventory = Inventory::default();
        inventory.inspect_dir("ns1", &ns1, &extensions).unwrap();
        inventory.inspect_dir("ns2", &ns2, &extensions).unwrap();
        (dir, inventory)
    }

    fn file_names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_inspect_dir() {
        let (_dir, inventory) = populated();

        assert_eq!(inventory.namespace_releases("ns1").len(), 2);
        assert_eq!(inventory.namespace_secrets("ns1").len(), 1);
        assert_eq!(inventory.namespace_releases("ns2").len(), 1);
        assert!(inventory.namespace_secrets("ns2").is_empty());
        assert_eq!(inventory.namespaces(), vec!["ns1", "ns2"]);
    }

    #[test]
    fn test_namespace_files_map_order() {
        let (_dir, inventory) = populated();
        let files = inventory.namespace_files_map();

        assert_eq!(
            file_names(&files["ns1"]),
            vec!["app1.yaml", "app2.yaml", "ingress-secret.yaml"]
        );
        assert_eq!(file_names(&files["ns2"]), vec!["app3.yaml"]);
    }

    #[test]
    fn test_inspect_missing_dir() {
        let mut inventory = Inventory::default();
        let err = inventory
            .inspect_dir("ns9", Path::new("/nonexistent/ns9"), &["yaml".to_string()])
            .unwrap_err();
        assert!(matches!(err, CoreError::DirectoryNotFound { namespace, .. } if namespace == "ns9"));
    }

    #[test]
    fn test_file_matched_by_two_extensions_added_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.secret.yaml", SECRET);

        let mut inventory = Inventory::default();
        inventory
            .inspect_dir("ns", dir.path(), &["yaml".to_string(), "secret.yaml".to_string()])
            .unwrap();
        assert_eq!(inventory.namespace_secrets("ns").len(), 1);
    }

    #[test]
    fn test_unrecognized_file_format() {
        let dir = TempDir::new().unwrap();
        let cases = [
            ("extra-release-field.yaml", "name: a\nrelease: {chart: c, version: v}\nextra: 1\n"),
            ("extra-secret-field.yaml", "secrets: {}\nextra: 1\n"),
            ("both-shapes.yaml", "name: a\nrelease: {chart: c, version: v}\nsecrets: {}\n"),
            ("empty.yaml", ""),
            ("plain.yaml", "just a string"),
        ];

        for (file, content) in cases {
            write(dir.path(), file, content);
            let mut inventory = Inventory::default();
            let err = inventory.add_file("ns", &dir.path().join(file)).unwrap_err();
            assert!(
                matches!(err, CoreError::UnrecognizedFileFormat { .. }),
                "expected unrecognized format for {file}, got {err}"
            );
            assert!(inventory.is_empty());
        }
    }

    #[test]
    fn test_unrecognized_file_stops_scan() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yaml", &release("a"));
        write(dir.path(), "b.yaml", "kind: Deployment\n");

        let mut inventory = Inventory::default();
        let err = inventory
            .inspect_dir("ns", dir.path(), &["yaml".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("b.yaml"));
    }

    #[test]
    fn test_rename_releases() {
        let (_dir, mut inventory) = populated();

        inventory
            .rename_releases(&|ns: &str, name: &str| Ok(format!("{}-{}", ns, name)))
            .unwrap();

        for (ns, releases) in inventory.releases() {
            for release in releases {
                assert!(release.name().starts_with(&format!("{}-", ns)));
            }
        }
    }

    #[test]
    fn test_rename_releases_stops_at_first_error() {
        let (_dir, mut inventory) = populated();

        let err = inventory
            .rename_releases(&|_: &str, name: &str| {
                if name == "app2" {
                    Err(CoreError::Interpolation {
                        template: name.to_string(),
                        message: "boom".to_string(),
                    })
                } else {
                    Ok(format!("x-{}", name))
                }
            })
            .unwrap_err();

        assert!(matches!(err, CoreError::Interpolation { .. }));
        let names: Vec<&str> = inventory.namespace_releases("ns1").iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["x-app1", "app2"]);
        assert_eq!(inventory.namespace_releases("ns2")[0].name(), "app3");
    }

    #[test]
    fn test_rename_namespaces() {
        let (_dir, inventory) = populated();

        let renamed = inventory.rename_namespaces(&|ns: &str| format!("test-{}", ns));

        assert!(renamed.releases().keys().all(|ns| ns.starts_with("test-")));
        assert!(renamed.secrets().keys().all(|ns| ns.starts_with("test-")));
        assert_eq!(renamed.namespace_releases("test-ns1").len(), 2);

        // the source inventory is untouched
        assert!(inventory.contains_namespace("ns1"));
        assert!(!inventory.contains_namespace("test-ns1"));
    }

    #[test]
    fn test_rename_namespaces_round_trip() {
        let (_dir, inventory) = populated();

        let renamed = inventory.rename_namespaces(&|ns: &str| format!("{}-d", ns));
        for ns in renamed.namespaces() {
            let original = renamed.original_namespace(ns).unwrap();
            assert_eq!(format!("{}-d", original), ns);
        }

        let twice = renamed.rename_namespaces(&|ns: &str| format!("p-{}", ns));
        assert_eq!(twice.original_namespace("p-ns1-d"), Some("ns1"));
        assert_eq!(inventory.original_namespace("ns1"), Some("ns1"));
        assert_eq!(inventory.original_namespace("ns9"), None);
    }

    #[test]
    fn test_rename_namespaces_collision_concatenates() {
        let (_dir, inventory) = populated();

        let merged = inventory.rename_namespaces(&|_: &str| "all".to_string());

        let names: Vec<&str> = merged.namespace_releases("all").iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["app1", "app2", "app3"]);
        assert_eq!(merged.namespace_secrets("all").len(), 1);
        assert_eq!(merged.original_namespace("all"), Some("ns1"));
    }
}
