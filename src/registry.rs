//! The registry object owned by the driver.
//!
//! [`ModuleRegistry`] composes discovery, the loader (with its evaluation
//! cache), the catalog and the initializer behind one `&mut self` API. Every
//! operation reports progress through the configured [`LogSink`].
//!
//! ## Failure policy
//! - load failures are logged and isolated per file
//! - lookups of unknown identifiers return `None`
//! - only init-hook failures (and unreadable directories) escalate

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::{CollisionPolicy, RegistryConfig};
use crate::discovery;
use crate::error::{BoxError, LoadError, Result};
use crate::factory::{FactoryTable, ModuleFactory};
use crate::initializer::Initializer;
use crate::loader::Loader;
use crate::logging::{tracing_sink, LogSink};
use crate::module::{Executable, ModuleEntry, ModuleParts};

/// Result of loading one discovered file during [`ModuleRegistry::load`].
#[derive(Debug)]
pub struct LoadOutcome {
    pub file_name: String,
    /// Registered identifier, or why the file was skipped.
    pub result: std::result::Result<String, LoadError>,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct ModuleRegistry<C = ()> {
    config: RegistryConfig,
    loader: Loader<C>,
    catalog: Catalog<C>,
    initializer: Initializer,
    log: LogSink,
}

impl<C: 'static> ModuleRegistry<C> {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            loader: Loader::new(FactoryTable::new()),
            catalog: Catalog::new(),
            initializer: Initializer::new(),
            log: tracing_sink(),
        }
    }

    /// Replace the log sink.
    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log = sink;
        self
    }

    /// Replace the whole factory table.
    pub fn with_factories(mut self, factories: FactoryTable<C>) -> Self {
        *self.loader.factories_mut() = factories;
        self
    }

    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: ModuleFactory<C> + 'static,
    {
        self.loader.factories_mut().register(name, factory);
    }

    pub fn register_factory_fn<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value) -> std::result::Result<ModuleParts<C>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.loader.factories_mut().register_fn(name, factory);
    }

    fn log(&self, line: &str) {
        (self.log)(line);
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Change the property read as identifier for subsequent loads. Entries
    /// already in the catalog keep their keys.
    pub fn set_id_keyword(&mut self, keyword: impl Into<String>) {
        self.config.id_keyword = keyword.into();
    }

    pub fn set_extension(&mut self, extension: impl Into<String>) {
        self.config.extension = extension.into();
    }

    pub fn set_collision_policy(&mut self, policy: CollisionPolicy) {
        self.config.on_collision = policy;
    }

    /// Directory relative module paths resolve against; set by [`load`](Self::load).
    pub fn root_path(&self) -> Option<&Path> {
        self.loader.root()
    }

    // -----------------------------------------------------------------------
    // Discovery and loading
    // -----------------------------------------------------------------------

    /// Filenames in `dir` that follow the `<name>.<ext>` convention.
    pub fn identify_modules<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<String>> {
        discovery::identify_modules(dir.as_ref(), &self.config.extension, &|l: &str| self.log(l))
    }

    /// Load one module file relative to the root path.
    ///
    /// Returns `false` (after logging) on any failure; the catalog is left
    /// untouched in that case.
    pub fn load_single<P: AsRef<Path>>(&mut self, relative: P) -> bool {
        let relative = relative.as_ref();
        match self.try_load_single(relative) {
            Ok(_) => true,
            Err(e) => {
                self.log(&format!("Failed to load module {}: {}", relative.display(), e));
                false
            }
        }
    }

    /// Like [`load_single`](Self::load_single) but returns the identifier or
    /// the typed failure, and does not log the failure.
    pub fn try_load_single<P: AsRef<Path>>(&mut self, relative: P) -> std::result::Result<String, LoadError> {
        let relative = relative.as_ref();
        let entry = self.loader.load_entry(relative, &self.config.id_keyword)?;
        let identifier = entry.identifier.clone();

        if let Some(existing) = self.catalog.get(&identifier) {
            if existing.resolved_path != entry.resolved_path {
                match self.config.on_collision {
                    CollisionPolicy::Reject => {
                        let existing = existing.source_path.clone();
                        self.evict_unreferenced(&entry.resolved_path, None);
                        return Err(LoadError::Duplicate {
                            identifier,
                            existing,
                        });
                    }
                    CollisionPolicy::Overwrite => {
                        let replaced = existing.resolved_path.clone();
                        self.log(&format!(
                            "[WARNING]: Module '{}' from {} is replaced by {}",
                            identifier,
                            existing.source_path.display(),
                            relative.display()
                        ));
                        self.evict_unreferenced(&replaced, Some(identifier.as_str()));
                    }
                }
            }
        }

        self.log(&format!("Loading {} as '{}'...", relative.display(), identifier));
        self.catalog.insert(entry);
        Ok(identifier)
    }

    /// Evict `resolved` from the loader cache unless a catalog entry other
    /// than `leaving` still points at it.
    fn evict_unreferenced(&mut self, resolved: &Path, leaving: Option<&str>) {
        let referenced = self
            .catalog
            .iter()
            .any(|e| Some(e.identifier.as_str()) != leaving && e.resolved_path == resolved);
        if !referenced {
            self.loader.evict(resolved);
        }
    }

    /// Set the root path to `dir` and load every discovered module file,
    /// continuing past individual failures.
    pub fn load<P: AsRef<Path>>(&mut self, dir: P) -> Result<Vec<LoadOutcome>> {
        let dir = dir.as_ref();
        self.loader.set_root(dir);
        self.log(&format!("Loading from directory: {}", dir.display()));

        let files = discovery::scan_directory(dir, &self.config.extension, &|l: &str| self.log(l))?;

        let mut outcomes = Vec::with_capacity(files.len());
        for file_name in files {
            let result = self.try_load_single(&file_name);
            if let Err(e) = &result {
                self.log(&format!("Failed to load module {}: {}", file_name, e));
            }
            outcomes.push(LoadOutcome { file_name, result });
        }
        Ok(outcomes)
    }

    // -----------------------------------------------------------------------
    // Catalog access
    // -----------------------------------------------------------------------

    /// `true` iff `identifier` is registered; logs when it is not.
    pub fn check_exists(&self, identifier: &str) -> bool {
        if self.catalog.contains(identifier) {
            true
        } else {
            self.log(&format!("Failed to retrieve component: {}", identifier));
            false
        }
    }

    pub fn retrieve(&self, identifier: &str) -> Option<&ModuleEntry<C>> {
        self.catalog.get(identifier)
    }

    pub fn retrieve_executable(&self, identifier: &str) -> Option<Arc<dyn Executable>> {
        if !self.check_exists(identifier) {
            return None;
        }
        self.catalog.get(identifier).and_then(|e| e.executable())
    }

    /// Registered identifiers in catalog order.
    pub fn modules_list(&self) -> Vec<String> {
        self.catalog.identifiers()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Remove `identifier` and evict its file from the evaluation cache, so
    /// the next load of that path reads the file again.
    ///
    /// Returns the removed entry, or `None` (no change) if it was unknown.
    pub fn unload(&mut self, identifier: &str) -> Option<ModuleEntry<C>> {
        let resolved: PathBuf = self.catalog.get(identifier)?.resolved_path.clone();
        self.loader.evict(&resolved);
        let removed = self.catalog.remove(identifier);
        self.log(&format!("Unloaded '{}' ({})", identifier, resolved.display()));
        removed
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Run every pending init hook once, in catalog order. Returns the number
    /// of hooks invoked. A failing hook aborts the rest of the batch.
    pub fn init_modules(&mut self, ctx: &C) -> Result<usize> {
        let log = &self.log;
        self.initializer.run(
            &self.catalog,
            ctx,
            self.config.hookless_counts_as_initialized,
            &|l: &str| log(l),
        )
    }

    pub fn is_initialized(&self, identifier: &str) -> bool {
        self.initializer.is_initialized(identifier)
    }
}

impl<C: 'static> Default for ModuleRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
