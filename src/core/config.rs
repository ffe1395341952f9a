//! TOML configuration: model artifact location, activity log, and optional
//! replacement reference tables.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{CypError, Result};
use crate::reference::{ReferenceData, ReferenceTables};

/// Env var naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "CYP_CONFIG";
/// Env var overriding `model.path`.
pub const MODEL_PATH_ENV: &str = "CYP_MODEL_PATH";
/// Artifact looked up in the working directory by default.
pub const DEFAULT_MODEL_FILE: &str = "crop_yield_model.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub logging: LoggingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceTables>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Location of the serialized regression tree.
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_FILE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSONL activity log. Logging is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonl_path: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from an explicit path, then `CYP_CONFIG`, then
    /// built-in defaults, and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_env(explicit, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let from_env = env(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Some(model_path) = env(MODEL_PATH_ENV).filter(|v| !v.is_empty()) {
            config.model.path = PathBuf::from(model_path);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file. A missing file is an error, not a default.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CypError::MissingConfig {
                    path: path.to_path_buf(),
                }
            } else {
                CypError::io(path, source)
            }
        })?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.path.as_os_str().is_empty() {
            return Err(CypError::InvalidConfig {
                details: "model.path must not be empty".to_string(),
            });
        }
        if let Some(tables) = &self.reference {
            ReferenceData::from_tables(tables.clone())?;
        }
        Ok(())
    }

    /// Reference data from the `[reference]` section, or the sample tables.
    pub fn reference_data(&self) -> Result<ReferenceData> {
        self.reference
            .clone()
            .map_or_else(|| Ok(ReferenceData::default()), ReferenceData::from_tables)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CypError::Serialization {
            context: "toml",
            details: e.to_string(),
        })
    }
}
