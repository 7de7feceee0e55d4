//! Service configuration, persisted as TOML.
//!
//! The config names the catalog file path and the listing defaults. Both
//! binaries load it from an explicit `--config` path when given and fall
//! back to built-in defaults otherwise; the CLI's `--catalog` flag
//! overrides the configured path either way.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Catalog service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Path to the catalog file.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Page size used when a listing request does not supply one.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("books.csv")
}
fn default_page_size() -> usize {
    20
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            default_page_size: default_page_size(),
        }
    }
}

impl ServiceConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from the given path, or defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Write as TOML.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
