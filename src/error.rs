//! Error types for the module registry.
//!
//! Load-time failures ([`LoadError`]) are isolated per file and never escape a
//! bulk load. Only directory read failures, configuration problems and
//! init-hook failures surface as [`RegistryError`].

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by module-provided code (factories, hooks, executables).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Why a single module file could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no root path set; call load(<dir>) first")]
    RootUnset,

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON manifest in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML manifest in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("module {} declares no properties", path.display())]
    MissingProperties { path: PathBuf },

    #[error("module {} has no '{keyword}' property", path.display())]
    MissingIdentifier { path: PathBuf, keyword: String },

    #[error("module {} has a non-scalar '{keyword}' property", path.display())]
    InvalidIdentifier { path: PathBuf, keyword: String },

    #[error("module {} names unknown kind '{kind}'", path.display())]
    UnknownKind { path: PathBuf, kind: String },

    #[error("factory '{kind}' rejected {}: {source}", path.display())]
    Factory {
        path: PathBuf,
        kind: String,
        #[source]
        source: BoxError,
    },

    #[error("identifier '{identifier}' is already registered by {}", existing.display())]
    Duplicate { identifier: String, existing: PathBuf },
}

/// Errors that escalate to the caller of a registry operation.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("cannot list module directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("init hook of module '{identifier}' failed: {source}")]
    InitHook {
        identifier: String,
        #[source]
        source: BoxError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}
