//! CLI configuration
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! [index]
//! max_nodes = 10000
//! untimed_siblings = "last"
//!
//! [log]
//! filter = "info"
//! json = false
//! ```
//!
//! Every key is optional.

use anyhow::Context;
use resolver_tree::IndexConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Tree indexing options
    pub index: IndexConfig,
    /// Log output options
    pub log: LogConfig,
}

/// Log output options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl CliConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Fails on malformed TOML or unknown enum values.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parsing configuration")
    }

    /// Load configuration from a file
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load from `path` when given, defaults otherwise
    ///
    /// # Errors
    /// See [`CliConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
