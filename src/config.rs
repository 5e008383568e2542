//! Registry configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) yields the
//! stock behavior:
//!
//! ```toml
//! id_keyword = "id"
//! extension = "json"
//! on_collision = "overwrite"
//! hookless_counts_as_initialized = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// What to do when a load yields an identifier that is already registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the earlier entry with the new one.
    #[default]
    Overwrite,
    /// Fail the new load and keep the earlier entry.
    Reject,
}

impl std::fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Property read as the catalog key.
    pub id_keyword: String,
    /// Module-file extension, without the dot.
    pub extension: String,
    pub on_collision: CollisionPolicy,
    /// Mark modules without an init hook as initialized on the first
    /// `init_modules` pass instead of skipping them every time.
    pub hookless_counts_as_initialized: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            id_keyword: "id".to_string(),
            extension: "json".to_string(),
            on_collision: CollisionPolicy::Overwrite,
            hookless_counts_as_initialized: false,
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RegistryConfig =
            toml::from_str(content).map_err(|e| RegistryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Reject values that can never match anything.
    pub fn validate(&self) -> Result<()> {
        if self.id_keyword.is_empty() {
            return Err(RegistryError::Config("id_keyword must not be empty".to_string()));
        }
        if self.extension.is_empty() || self.extension.contains('.') {
            return Err(RegistryError::Config(format!(
                "extension '{}' must be a non-empty token without dots",
                self.extension
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = RegistryConfig::default();
        assert_eq!(c.id_keyword, "id");
        assert_eq!(c.extension, "json");
        assert_eq!(c.on_collision, CollisionPolicy::Overwrite);
        assert!(!c.hookless_counts_as_initialized);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let c = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(c, RegistryConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        let c = RegistryConfig::from_toml_str("extension = \"toml\"\non_collision = \"reject\"\n")
            .unwrap();
        assert_eq!(c.extension, "toml");
        assert_eq!(c.on_collision, CollisionPolicy::Reject);
        assert_eq!(c.id_keyword, "id");
    }

    #[test]
    fn test_unknown_policy_is_config_error() {
        let err = RegistryConfig::from_toml_str("on_collision = \"merge\"").unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn test_dotted_extension_rejected() {
        let err = RegistryConfig::from_toml_str("extension = \"tar.gz\"").unwrap_err();
        assert!(err.to_string().contains("tar.gz"));
    }

    #[test]
    fn test_empty_keyword_rejected() {
        assert!(RegistryConfig::from_toml_str("id_keyword = \"\"").is_err());
    }

    #[test]
    fn test_from_missing_file_is_config_error() {
        let err = RegistryConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn test_collision_policy_display() {
        assert_eq!(CollisionPolicy::Overwrite.to_string(), "overwrite");
        assert_eq!(CollisionPolicy::Reject.to_string(), "reject");
    }
}
