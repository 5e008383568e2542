//! Module model: the manifest read from disk, the capabilities a factory
//! attaches to it, and the catalog entry that ties both to a path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BoxError, LoadError};

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Opaque capability a module exposes to callers through
/// [`retrieve_executable`](crate::ModuleRegistry::retrieve_executable).
pub trait Executable: Send + Sync {
    fn execute(&self, args: Value) -> Result<Value, BoxError>;
}

impl<F> Executable for F
where
    F: Fn(Value) -> Result<Value, BoxError> + Send + Sync,
{
    fn execute(&self, args: Value) -> Result<Value, BoxError> {
        self(args)
    }
}

/// One-shot initialization hook. The registry calls it at most once per
/// identifier, passing the driver-supplied context.
pub trait InitHook<C>: Send + Sync {
    fn init(&self, ctx: &C) -> Result<(), BoxError>;
}

impl<C, F> InitHook<C> for F
where
    F: Fn(&C) -> Result<(), BoxError> + Send + Sync,
{
    fn init(&self, ctx: &C) -> Result<(), BoxError> {
        self(ctx)
    }
}

/// What a factory contributes to a module besides its properties.
pub struct ModuleParts<C> {
    pub init_hook: Option<Box<dyn InitHook<C>>>,
    pub executable: Option<Arc<dyn Executable>>,
}

impl<C: 'static> ModuleParts<C> {
    pub fn new() -> Self {
        Self {
            init_hook: None,
            executable: None,
        }
    }

    pub fn with_init<F>(self, hook: F) -> Self
    where
        F: Fn(&C) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.with_init_hook(Box::new(hook))
    }

    pub fn with_init_hook(mut self, hook: Box<dyn InitHook<C>>) -> Self {
        self.init_hook = Some(hook);
        self
    }

    pub fn with_executable<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.with_executable_object(Arc::new(f))
    }

    pub fn with_executable_object(mut self, executable: Arc<dyn Executable>) -> Self {
        self.executable = Some(executable);
        self
    }
}

impl<C: 'static> Default for ModuleParts<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// On-disk content of a module file.
///
/// ```json
/// { "properties": { "id": "beta", "version": "1.0" },
///   "kind": "announce",
///   "settings": { "message": "hello" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleManifest {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    /// Factory that supplies the init hook and executable.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    /// `.toml` files are TOML; anything else is JSON.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }

    pub fn parse(self, content: &str, path: &Path) -> Result<ModuleManifest, LoadError> {
        match self {
            ManifestFormat::Json => serde_json::from_str(content).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            }),
            ManifestFormat::Toml => toml::from_str(content).map_err(|source| LoadError::Toml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Definition / entry
// ---------------------------------------------------------------------------

/// An evaluated module file. Shared between the loader cache and the catalog.
pub struct ModuleDefinition<C> {
    pub properties: Map<String, Value>,
    pub kind: Option<String>,
    pub parts: ModuleParts<C>,
}

/// Read `properties[keyword]` as a catalog key.
///
/// Strings are taken verbatim, numbers and booleans by their text form.
pub fn extract_identifier(
    properties: &Map<String, Value>,
    keyword: &str,
    path: &Path,
) -> Result<String, LoadError> {
    match properties.get(keyword) {
        None | Some(Value::Null) => Err(LoadError::MissingIdentifier {
            path: path.to_path_buf(),
            keyword: keyword.to_string(),
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(LoadError::InvalidIdentifier {
            path: path.to_path_buf(),
            keyword: keyword.to_string(),
        }),
    }
}

/// A module registered in the catalog.
pub struct ModuleEntry<C> {
    pub identifier: String,
    /// Path as given to the loader, relative to the root.
    pub source_path: PathBuf,
    /// Canonical path; the loader cache key.
    pub resolved_path: PathBuf,
    definition: Arc<ModuleDefinition<C>>,
}

impl<C> ModuleEntry<C> {
    pub fn new(
        identifier: String,
        source_path: PathBuf,
        resolved_path: PathBuf,
        definition: Arc<ModuleDefinition<C>>,
    ) -> Self {
        Self {
            identifier,
            source_path,
            resolved_path,
            definition,
        }
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.definition.properties
    }

    pub fn kind(&self) -> Option<&str> {
        self.definition.kind.as_deref()
    }

    pub fn executable(&self) -> Option<Arc<dyn Executable>> {
        self.definition.parts.executable.clone()
    }

    pub fn init_hook(&self) -> Option<&dyn InitHook<C>> {
        self.definition.parts.init_hook.as_deref()
    }

    pub fn has_init_hook(&self) -> bool {
        self.definition.parts.init_hook.is_some()
    }
}

impl<C> std::fmt::Debug for ModuleEntry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("identifier", &self.identifier)
            .field("source_path", &self.source_path)
            .field("resolved_path", &self.resolved_path)
            .field("kind", &self.definition.kind)
            .field("has_init_hook", &self.has_init_hook())
            .field("has_executable", &self.definition.parts.executable.is_some())
            .finish()
    }
}
