//! CYP-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, CypError>;

/// Top-level error type for the crop yield predictor.
#[derive(Debug, Error)]
pub enum CypError {
    #[error("[CYP-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[CYP-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[CYP-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[CYP-2001] unknown state: {state}")]
    UnknownState { state: String },

    #[error("[CYP-2002] district {district} does not belong to state {state}")]
    UnknownDistrict { state: String, district: String },

    #[error("[CYP-2003] unknown crop: {crop}")]
    UnknownCrop { crop: String },

    #[error("[CYP-2004] unknown season: {season}")]
    UnknownSeason { season: String },

    #[error("[CYP-2005] {field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("[CYP-3001] model artifact {path} could not be loaded: {details}")]
    ModelLoad { path: PathBuf, details: String },

    #[error("[CYP-3002] model rejected the input row: {details}")]
    PredictionInvocation { details: String },

    #[error("[CYP-3101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[CYP-3102] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CypError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "CYP-1001",
            Self::MissingConfig { .. } => "CYP-1002",
            Self::ConfigParse { .. } => "CYP-1003",
            Self::UnknownState { .. } => "CYP-2001",
            Self::UnknownDistrict { .. } => "CYP-2002",
            Self::UnknownCrop { .. } => "CYP-2003",
            Self::UnknownSeason { .. } => "CYP-2004",
            Self::OutOfRange { .. } => "CYP-2005",
            Self::ModelLoad { .. } => "CYP-3001",
            Self::PredictionInvocation { .. } => "CYP-3002",
            Self::Serialization { .. } => "CYP-3101",
            Self::Io { .. } => "CYP-3102",
        }
    }

    /// Whether the error rejects an input record before any prediction ran.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownState { .. }
                | Self::UnknownDistrict { .. }
                | Self::UnknownCrop { .. }
                | Self::UnknownSeason { .. }
                | Self::OutOfRange { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a model that rejected its input row.
    #[must_use]
    pub fn invocation(details: impl Into<String>) -> Self {
        Self::PredictionInvocation {
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for CypError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for CypError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
