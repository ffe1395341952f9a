//! One-shot resolution of the process-wide predictor.
//!
//! The artifact is read at most once per loader. A missing artifact selects
//! the demo formula; an unreadable or malformed one also selects it but
//! records why, so callers can tell the two situations apart.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::{DemoPredictor, PredictorVariant, TreeModel, YieldPredictor};
use crate::core::errors::CypError;

/// Non-fatal startup state surfaced alongside every prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadNotice {
    /// A trained model is active.
    ModelLoaded,
    /// No artifact exists; the demo formula is active.
    DemoMode,
    /// An artifact exists but could not be used; the demo formula is active.
    ModelLoadFailed { details: String },
}

impl LoadNotice {
    /// Whether the notice deserves a warning banner.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        !matches!(self, Self::ModelLoaded)
    }
}

impl From<CypError> for LoadNotice {
    fn from(err: CypError) -> Self {
        match err {
            CypError::ModelLoad { details, .. } => Self::ModelLoadFailed { details },
            other => Self::ModelLoadFailed {
                details: other.to_string(),
            },
        }
    }
}

/// The capability selected at startup plus how it was chosen.
pub struct ResolvedPredictor {
    capability: Box<dyn YieldPredictor>,
    notice: LoadNotice,
    artifact_path: PathBuf,
    fingerprint: Option<String>,
}

impl ResolvedPredictor {
    #[must_use]
    pub fn capability(&self) -> &dyn YieldPredictor {
        self.capability.as_ref()
    }

    #[must_use]
    pub fn variant(&self) -> PredictorVariant {
        self.capability.variant()
    }

    #[must_use]
    pub fn notice(&self) -> &LoadNotice {
        &self.notice
    }

    #[must_use]
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// SHA-256 of the artifact bytes, when a model was loaded.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

impl std::fmt::Debug for ResolvedPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedPredictor")
            .field("variant", &self.variant())
            .field("notice", &self.notice)
            .field("artifact_path", &self.artifact_path)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Memoizing loader for the model artifact at a fixed path.
#[derive(Debug)]
pub struct PredictorLoader {
    path: PathBuf,
    resolved: OnceLock<ResolvedPredictor>,
    storage_reads: AtomicUsize,
}

impl PredictorLoader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            resolved: OnceLock::new(),
            storage_reads: AtomicUsize::new(0),
        }
    }

    /// Resolve the predictor on first call; later calls return the same value.
    pub fn load(&self) -> &ResolvedPredictor {
        self.resolved.get_or_init(|| self.resolve())
    }

    /// How many times the artifact location has been touched.
    #[must_use]
    pub fn storage_reads(&self) -> usize {
        self.storage_reads.load(Ordering::Relaxed)
    }

    fn resolve(&self) -> ResolvedPredictor {
        self.storage_reads.fetch_add(1, Ordering::Relaxed);

        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            // A file standing in for a parent directory also means no artifact.
            Err(source)
                if matches!(
                    source.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                return self.demo(LoadNotice::DemoMode);
            }
            Err(source) => return self.failed(source.to_string()),
        };

        match TreeModel::from_slice(&bytes) {
            Ok(model) => ResolvedPredictor {
                capability: Box::new(model),
                notice: LoadNotice::ModelLoaded,
                artifact_path: self.path.clone(),
                fingerprint: Some(format!("{:x}", Sha256::digest(&bytes))),
            },
            Err(err) => self.failed(err.to_string()),
        }
    }

    fn failed(&self, details: String) -> ResolvedPredictor {
        self.demo(LoadNotice::from(CypError::ModelLoad {
            path: self.path.clone(),
            details,
        }))
    }

    fn demo(&self, notice: LoadNotice) -> ResolvedPredictor {
        ResolvedPredictor {
            capability: Box::new(DemoPredictor),
            notice,
            artifact_path: self.path.clone(),
            fingerprint: None,
        }
    }
}
