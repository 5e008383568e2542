use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{CollisionPolicy, RegistryConfig};
use crate::error::{RegistryError, Result};

#[derive(Parser, Debug)]
#[command(name = "modreg")]
#[command(version)]
#[command(about = "Discover, load and initialize modules from a directory")]
pub struct Args {
    /// TOML file with registry settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Module-file extension (overrides the config file)
    #[arg(long, global = true)]
    pub ext: Option<String>,

    /// Property used as the module identifier (overrides the config file)
    #[arg(long, global = true)]
    pub id_keyword: Option<String>,

    /// What to do when two modules declare the same identifier
    #[arg(long, value_enum, global = true)]
    pub on_collision: Option<CollisionPolicy>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List module files in a directory without loading them
    Scan { dir: PathBuf },

    /// Load every module in a directory and list the catalog
    Load {
        dir: PathBuf,

        /// Run init hooks after loading
        #[arg(long)]
        init: bool,

        /// JSON value handed to every init hook
        #[arg(long, default_value = "null")]
        context: String,
    },

    /// Load and initialize a directory, then run one module's executable
    Exec {
        dir: PathBuf,

        /// Identifier of the module to run
        id: String,

        /// JSON arguments passed to the executable
        #[arg(long, default_value = "null")]
        args: String,

        /// JSON value handed to every init hook
        #[arg(long, default_value = "null")]
        context: String,
    },
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<RegistryConfig> {
        let mut config = match &self.config {
            Some(path) => RegistryConfig::from_toml_file(path)?,
            None => RegistryConfig::default(),
        };
        if let Some(ext) = &self.ext {
            config.extension = ext.clone();
        }
        if let Some(keyword) = &self.id_keyword {
            config.id_keyword = keyword.clone();
        }
        if let Some(policy) = self.on_collision {
            config.on_collision = policy;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parse a JSON command-line argument.
pub fn parse_json_arg(name: &str, raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw)
        .map_err(|e| RegistryError::Config(format!("--{} is not valid JSON: {}", name, e)))
}
