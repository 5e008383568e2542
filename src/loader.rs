//! Loader: path resolution, manifest evaluation and the evaluation cache.
//!
//! Evaluating a file means reading it, parsing the manifest and running the
//! named factory. Successful evaluations are cached by canonical path, so a
//! repeated load of an unchanged path reuses the same capabilities. The cache
//! is only ever invalidated explicitly through [`Loader::evict`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::LoadError;
use crate::factory::FactoryTable;
use crate::module::{extract_identifier, ManifestFormat, ModuleDefinition, ModuleEntry, ModuleParts};

/// Canonical path → evaluated module.
pub struct ModuleCache<C> {
    entries: HashMap<PathBuf, Arc<ModuleDefinition<C>>>,
}

impl<C> ModuleCache<C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, resolved: &Path) -> Option<Arc<ModuleDefinition<C>>> {
        self.entries.get(resolved).cloned()
    }

    pub fn insert(&mut self, resolved: PathBuf, definition: Arc<ModuleDefinition<C>>) {
        self.entries.insert(resolved, definition);
    }

    /// Returns `true` if an entry was dropped.
    pub fn evict(&mut self, resolved: &Path) -> bool {
        self.entries.remove(resolved).is_some()
    }

    pub fn contains(&self, resolved: &Path) -> bool {
        self.entries.contains_key(resolved)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C> Default for ModuleCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Loader<C> {
    root: Option<PathBuf>,
    cache: ModuleCache<C>,
    factories: FactoryTable<C>,
}

impl<C: 'static> Loader<C> {
    pub fn new(factories: FactoryTable<C>) -> Self {
        Self {
            root: None,
            cache: ModuleCache::new(),
            factories,
        }
    }

    pub fn set_root(&mut self, root: &Path) {
        self.root = Some(root.to_path_buf());
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn factories(&self) -> &FactoryTable<C> {
        &self.factories
    }

    pub fn factories_mut(&mut self) -> &mut FactoryTable<C> {
        &mut self.factories
    }

    pub fn cache(&self) -> &ModuleCache<C> {
        &self.cache
    }

    /// Join `relative` onto the root and canonicalize. Fails if the root is
    /// unset or the target does not exist.
    pub fn resolve(&self, relative: &Path) -> Result<PathBuf, LoadError> {
        let root = self.root.as_deref().ok_or(LoadError::RootUnset)?;
        let joined = root.join(relative);
        fs::canonicalize(&joined).map_err(|source| LoadError::Io {
            path: joined,
            source,
        })
    }

    /// Evaluate `relative` and build a catalog entry keyed by
    /// `properties[id_keyword]`.
    ///
    /// A failed load never leaves its evaluation in the cache.
    pub fn load_entry(&mut self, relative: &Path, id_keyword: &str) -> Result<ModuleEntry<C>, LoadError> {
        let resolved = self.resolve(relative)?;
        let (definition, fresh) = self.evaluate_tracked(&resolved)?;

        let identifier = match extract_identifier(&definition.properties, id_keyword, &resolved) {
            Ok(id) => id,
            Err(e) => {
                // Only drop what this call inserted; a cache hit may still
                // back a catalog entry loaded under another keyword.
                if fresh {
                    self.evict(&resolved);
                }
                return Err(e);
            }
        };

        Ok(ModuleEntry::new(
            identifier,
            relative.to_path_buf(),
            resolved,
            definition,
        ))
    }

    /// Cached evaluation of a canonical path.
    pub fn evaluate(&mut self, resolved: &Path) -> Result<Arc<ModuleDefinition<C>>, LoadError> {
        self.evaluate_tracked(resolved).map(|(definition, _)| definition)
    }

    /// Like [`evaluate`](Self::evaluate), also reporting whether this call
    /// read the file and inserted it into the cache.
    fn evaluate_tracked(&mut self, resolved: &Path) -> Result<(Arc<ModuleDefinition<C>>, bool), LoadError> {
        if let Some(cached) = self.cache.get(resolved) {
            debug!(path = %resolved.display(), "module cache hit");
            return Ok((cached, false));
        }

        let definition = Arc::new(self.evaluate_fresh(resolved)?);
        self.cache.insert(resolved.to_path_buf(), Arc::clone(&definition));
        Ok((definition, true))
    }

    fn evaluate_fresh(&self, resolved: &Path) -> Result<ModuleDefinition<C>, LoadError> {
        let content = fs::read_to_string(resolved).map_err(|source| LoadError::Io {
            path: resolved.to_path_buf(),
            source,
        })?;
        let manifest = ManifestFormat::for_path(resolved).parse(&content, resolved)?;

        let properties = manifest.properties.ok_or_else(|| LoadError::MissingProperties {
            path: resolved.to_path_buf(),
        })?;

        let parts = match manifest.kind.as_deref() {
            None => ModuleParts::new(),
            Some(kind) => {
                let factory = self.factories.get(kind).ok_or_else(|| LoadError::UnknownKind {
                    path: resolved.to_path_buf(),
                    kind: kind.to_string(),
                })?;
                factory
                    .build(&manifest.settings)
                    .map_err(|source| LoadError::Factory {
                        path: resolved.to_path_buf(),
                        kind: kind.to_string(),
                        source,
                    })?
            }
        };

        Ok(ModuleDefinition {
            properties,
            kind: manifest.kind,
            parts,
        })
    }

    /// Drop the cached evaluation for `resolved` so the next load re-reads it.
    pub fn evict(&mut self, resolved: &Path) -> bool {
        let evicted = self.cache.evict(resolved);
        if evicted {
            debug!(path = %resolved.display(), "module cache entry evicted");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn loader_in(dir: &Path) -> Loader<()> {
        let mut factories = FactoryTable::new();
        factories.register_fn("echo", |_: &Value| {
            Ok(ModuleParts::new().with_executable(|v: Value| Ok(v)))
        });
        factories.register_fn("broken", |_: &Value| Err("bad settings".into()));
        let mut loader = Loader::new(factories);
        loader.set_root(dir);
        loader
    }

    #[test]
    fn test_resolve_without_root_fails() {
        let loader: Loader<()> = Loader::new(FactoryTable::new());
        assert!(matches!(loader.resolve(Path::new("a.json")), Err(LoadError::RootUnset)));
    }

    #[test]
    fn test_resolve_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_in(dir.path());
        assert!(matches!(loader.resolve(Path::new("gone.json")), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_load_entry_populates_paths_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"properties":{"id":"alpha"},"kind":"echo"}"#)
            .unwrap();
        let mut loader = loader_in(dir.path());
        let entry = loader.load_entry(Path::new("a.json"), "id").unwrap();
        assert_eq!(entry.identifier, "alpha");
        assert_eq!(entry.source_path, PathBuf::from("a.json"));
        assert!(entry.resolved_path.is_absolute());
        assert!(loader.cache().contains(&entry.resolved_path));
        assert_eq!(entry.executable().unwrap().execute(json!(1)).unwrap(), json!(1));
    }

    #[test]
    fn test_second_load_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, r#"{"properties":{"id":"old"}}"#).unwrap();
        let mut loader = loader_in(dir.path());
        loader.load_entry(Path::new("a.json"), "id").unwrap();

        fs::write(&path, r#"{"properties":{"id":"new"}}"#).unwrap();
        let again = loader.load_entry(Path::new("a.json"), "id").unwrap();
        assert_eq!(again.identifier, "old");

        assert!(loader.evict(&again.resolved_path));
        let fresh = loader.load_entry(Path::new("a.json"), "id").unwrap();
        assert_eq!(fresh.identifier, "new");
    }

    #[test]
    fn test_missing_identifier_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"properties":{"name":"x"}}"#).unwrap();
        let mut loader = loader_in(dir.path());
        let err = loader.load_entry(Path::new("a.json"), "id").unwrap_err();
        assert!(matches!(err, LoadError::MissingIdentifier { .. }));
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn test_identifier_failure_on_cache_hit_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, r#"{"properties":{"id":"alpha"}}"#).unwrap();
        let mut loader = loader_in(dir.path());
        let entry = loader.load_entry(Path::new("a.json"), "id").unwrap();

        let err = loader.load_entry(Path::new("a.json"), "name").unwrap_err();
        assert!(matches!(err, LoadError::MissingIdentifier { .. }));
        assert!(loader.cache().contains(&entry.resolved_path));

        fs::write(&path, r#"{"properties":{"id":"changed"}}"#).unwrap();
        let again = loader.load_entry(Path::new("a.json"), "id").unwrap();
        assert_eq!(again.identifier, "alpha");
    }

    #[test]
    fn test_missing_properties() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"kind":"echo"}"#).unwrap();
        let mut loader = loader_in(dir.path());
        let err = loader.load_entry(Path::new("a.json"), "id").unwrap_err();
        assert!(matches!(err, LoadError::MissingProperties { .. }));
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn test_unknown_kind() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"properties":{"id":"a"},"kind":"mystery"}"#)
            .unwrap();
        let mut loader = loader_in(dir.path());
        let err = loader.load_entry(Path::new("a.json"), "id").unwrap_err();
        assert!(matches!(err, LoadError::UnknownKind { ref kind, .. } if kind == "mystery"));
    }

    #[test]
    fn test_factory_error_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"properties":{"id":"a"},"kind":"broken"}"#)
            .unwrap();
        let mut loader = loader_in(dir.path());
        let err = loader.load_entry(Path::new("a.json"), "id").unwrap_err();
        assert!(matches!(err, LoadError::Factory { .. }));
        assert!(err.to_string().contains("bad settings"));
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn test_toml_module_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("t.toml"), "[properties]\nid = \"tom\"\n").unwrap();
        let mut loader = loader_in(dir.path());
        let entry = loader.load_entry(Path::new("t.toml"), "id").unwrap();
        assert_eq!(entry.identifier, "tom");
        assert!(entry.kind().is_none());
    }

    #[test]
    fn test_evict_unknown_path_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = loader_in(dir.path());
        assert!(!loader.evict(Path::new("/nowhere/x.json")));
    }
}
