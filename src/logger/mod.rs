//! Append-only JSONL activity log with graceful degradation.
//!
//! Each line is one event object with an RFC 3339 `ts` and an `event` tag.
//! If the log file cannot be opened or written, logging switches off for the
//! rest of the process after a single warning on stderr; predictions are
//! never blocked by logging.
//!
//! Entries describe requests and outcomes. Predicted values are not written.

#![allow(missing_docs)]

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::core::config::LoggingConfig;
use crate::core::errors::CypError;
use crate::prediction::InputRecord;
use crate::predictor::{LoadNotice, PredictorVariant};

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityEvent<'a> {
    PredictorResolved {
        variant: PredictorVariant,
        notice: &'a LoadNotice,
        artifact_path: &'a Path,
    },
    PredictionServed {
        variant: PredictorVariant,
        state: &'a str,
        district: &'a str,
        crop: &'a str,
        season: &'a str,
        crop_year: i32,
    },
    PredictionRejected {
        code: &'static str,
        error: String,
    },
    PredictionFailed {
        code: &'static str,
        error: String,
    },
}

impl<'a> ActivityEvent<'a> {
    #[must_use]
    pub fn served(variant: PredictorVariant, record: &'a InputRecord) -> Self {
        Self::PredictionServed {
            variant,
            state: record.state(),
            district: record.district(),
            crop: record.crop(),
            season: record.season(),
            crop_year: record.crop_year(),
        }
    }

    /// Rejected for input errors, failed for everything else.
    #[must_use]
    pub fn from_error(err: &CypError) -> Self {
        if err.is_input_error() {
            Self::PredictionRejected {
                code: err.code(),
                error: err.to_string(),
            }
        } else {
            Self::PredictionFailed {
                code: err.code(),
                error: err.to_string(),
            }
        }
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a ActivityEvent<'a>,
}

enum Sink {
    Disabled,
    Open(File),
    Degraded,
}

pub struct ActivityLog {
    path: Option<PathBuf>,
    sink: Mutex<Sink>,
}

impl ActivityLog {
    /// A log that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            path: None,
            sink: Mutex::new(Sink::Disabled),
        }
    }

    /// Open (creating if needed) an append-only log at `path`.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let sink = match open_append(path) {
            Ok(file) => Sink::Open(file),
            Err(err) => {
                warn_degraded(&err);
                Sink::Degraded
            }
        };
        Self {
            path: Some(path.to_path_buf()),
            sink: Mutex::new(sink),
        }
    }

    #[must_use]
    pub fn from_config(config: &LoggingConfig) -> Self {
        config
            .jsonl_path
            .as_deref()
            .map_or_else(Self::disabled, Self::open)
    }

    pub fn record(&self, event: &ActivityEvent<'_>) {
        let mut sink = self.sink.lock();
        let Sink::Open(file) = &mut *sink else {
            return;
        };
        let entry = Entry {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };
        let written = serde_json::to_string(&entry)
            .map_err(CypError::from)
            .and_then(|line| {
                writeln!(file, "{line}")
                    .and_then(|()| file.flush())
                    .map_err(|source| CypError::io(self.path.as_deref().unwrap_or(Path::new("")), source))
            });
        if let Err(err) = written {
            warn_degraded(&err);
            *sink = Sink::Degraded;
        }
    }

    /// Whether a configured log had to be switched off.
    #[cfg(test)]
    fn is_degraded(&self) -> bool {
        matches!(*self.sink.lock(), Sink::Degraded)
    }

    #[cfg(test)]
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn open_append(path: &Path) -> Result<File, CypError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CypError::io(parent, source))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| CypError::io(path, source))
}

fn warn_degraded(err: &CypError) {
    eprintln!("cyp: activity log disabled: {err}");
}
