//! Engine configuration
//!
//! Tuning knobs for [`FilterEngine`](crate::FilterEngine) instances. Every
//! field has a default, so `EngineConfig::default()` is a working
//! configuration. Callers that want user-tunable behavior can persist a TOML
//! file in the user's config directory; a missing file loads as defaults
//! without being created.

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const fn default_debounce_ms() -> u64 {
    300
}

fn default_expr_prefix() -> String {
    "/f".to_string()
}

const fn default_min_expr_len() -> usize {
    3
}

const fn default_cache_capacity() -> u64 {
    64
}

const fn default_parallel_min() -> usize {
    4096
}

/// Engine configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Milliseconds of input silence before a query is committed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Prefix selecting the filter-expression strategy
    #[serde(default = "default_expr_prefix")]
    pub expr_prefix: String,

    /// Minimum expression length (after prefix stripping and trimming)
    /// before a dispatch happens; shorter expressions show everything
    #[serde(default = "default_min_expr_len")]
    pub min_expr_len: usize,

    /// Capacity of the committed-result cache; 0 disables caching
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Record count at which filtering moves onto the rayon pool
    #[serde(default = "default_parallel_min")]
    pub parallel_min: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            expr_prefix: default_expr_prefix(),
            min_expr_len: default_min_expr_len(),
            cache_capacity: default_cache_capacity(),
            parallel_min: default_parallel_min(),
        }
    }
}

impl EngineConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be
    /// determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("siftr").join("config.toml"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file yields the defaults; nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an existing config file cannot be read or
    /// parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed. Fields
    /// absent from the file take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the
    /// configuration cannot be serialized to TOML, or the file cannot be
    /// written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` under the same conditions as [`Self::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Debounce window as a `Duration`
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
