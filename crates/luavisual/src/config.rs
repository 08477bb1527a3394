//! Configuration for luavisual.
//!
//! Loaded from `.luavisual/config.toml` in the project directory, or from an
//! explicit path. Every key is optional.
//!
//! Example config.toml:
//! ```toml
//! [layout]
//! vertical_spacing = 80.0
//!
//! [generator]
//! indent = "  "
//! default_header = "local QBCore = exports['qb-core']:GetCoreObject()"
//!
//! [parser]
//! recover = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Converter cursor model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub start_x: f64,
    pub start_y: f64,
    /// Vertical distance between consecutive nodes.
    pub vertical_spacing: f64,
    /// Horizontal offset per block nesting level.
    pub indent_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            start_y: 100.0,
            vertical_spacing: 120.0,
            indent_offset: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Indentation unit per block level.
    pub indent: String,
    /// Block nesting beyond this is replaced by a comment.
    pub max_depth: usize,
    /// Append `end` for openers left unclosed (raw code blocks).
    pub balance_closers: bool,
    /// Header written when the caller passes an empty one.
    pub default_header: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent: luavisual_syntax::DEFAULT_INDENT.to_string(),
            max_depth: 256,
            balance_closers: true,
            default_header: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Drop malformed statements instead of failing the whole conversion.
    pub recover: bool,
    pub max_recovery_steps: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            recover: false,
            max_recovery_steps: 1000,
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub generator: GeneratorConfig,
    pub parser: ParserConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    /// Project config location relative to a directory.
    pub fn project_path(dir: &Path) -> PathBuf {
        dir.join(".luavisual").join("config.toml")
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `.luavisual/config.toml` under `dir`, or the defaults when there
    /// is none. A file that exists but does not parse is an error.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::project_path(dir);
        if path.is_file() {
            tracing::debug!("loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
