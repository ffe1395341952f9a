//! Human and JSON renderings of predictions, startup notices, and reference
//! tables.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use super::engine::PredictionResult;
use super::input::InputRecord;
use crate::core::errors::Result;
use crate::predictor::{LoadNotice, PredictorVariant, ResolvedPredictor};
use crate::reference::ReferenceData;

/// Sparkline glyph ramp for the trend line.
pub const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render a sparkline scaled between the series minimum and maximum.
///
/// A flat series renders at mid height.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|value| {
            let normalized = if span > 0.0 { (value - min) / span } else { 0.5 };
            let idx = (normalized.clamp(0.0, 1.0) * 7.0).round() as usize;
            SPARK_CHARS[idx.min(7)]
        })
        .collect()
}

/// Up to two decimals, trailing zeros dropped.
fn compact(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Startup banner for degraded modes; `None` when a model is active.
#[must_use]
pub fn format_notice(notice: &LoadNotice, artifact_path: &Path) -> Option<String> {
    if !notice.is_degraded() {
        return None;
    }
    let path = artifact_path.display();
    Some(match notice {
        LoadNotice::ModelLoadFailed { details } => format!(
            "Model found at {path} but could not be loaded - running in DEMO MODE. ({details})"
        ),
        _ => format!("No model found at {path} - running in DEMO MODE."),
    })
}

/// Result card, metric cards, and trend for terminal output.
#[must_use]
pub fn format_prediction(record: &InputRecord, result: &PredictionResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "cyp prediction ({}):\n", result.variant.label());
    let _ = writeln!(
        out,
        "  Location:    {} / {}",
        record.state(),
        record.district()
    );
    let _ = writeln!(
        out,
        "  Crop:        {} ({}, {})",
        record.crop(),
        record.season(),
        record.crop_year()
    );
    let _ = writeln!(
        out,
        "  Conditions:  {} °C, {}% humidity, {}% soil moisture, {} units\n",
        compact(record.temperature()),
        compact(record.humidity()),
        compact(record.soil_moisture()),
        compact(record.area())
    );

    let _ = writeln!(
        out,
        "  Predicted Yield:   {:.3} per unit",
        result.yield_per_unit
    );
    let _ = writeln!(
        out,
        "  Total Production:  {:.2} units\n",
        result.total_production
    );

    let _ = writeln!(
        out,
        "  Temp Score:        {}%",
        compact(result.temperature_score)
    );
    let _ = writeln!(
        out,
        "  Moisture Index:    {}",
        compact(result.moisture_index)
    );
    let _ = writeln!(
        out,
        "  Humidity Factor:   {}\n",
        compact(result.humidity_factor)
    );

    let productions: Vec<f64> = result.trend_series.iter().map(|p| p.production).collect();
    let _ = writeln!(
        out,
        "  Estimated Production Trend  {}",
        sparkline(&productions)
    );
    for point in &result.trend_series {
        let _ = writeln!(out, "    {}  {:>12.2}", point.year, point.production);
    }

    out
}

/// Active predictor, how it was chosen, and where the artifact lives.
#[must_use]
pub fn format_status(resolved: &ResolvedPredictor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "cyp predictor status:\n");
    let _ = writeln!(out, "  Predictor:  {}", resolved.variant().label());
    let _ = writeln!(
        out,
        "  Artifact:   {}",
        resolved.artifact_path().display()
    );
    if let Some(fingerprint) = resolved.fingerprint() {
        let _ = writeln!(out, "  SHA-256:    {fingerprint}");
    }
    let state = match resolved.notice() {
        LoadNotice::ModelLoaded => "model loaded",
        LoadNotice::DemoMode => "demo mode (no artifact)",
        LoadNotice::ModelLoadFailed { .. } => "demo mode (model load failed)",
    };
    let _ = writeln!(out, "  State:      {state}");
    if let LoadNotice::ModelLoadFailed { details } = resolved.notice() {
        let _ = writeln!(out, "  Error:      {details}");
    }
    out
}

/// States (or one state's districts), seasons, and crops.
pub fn format_reference(reference: &ReferenceData, state: Option<&str>) -> Result<String> {
    let mut out = String::new();
    match state {
        Some(state) => {
            let _ = writeln!(out, "Districts of {state}:");
            for district in reference.districts_of(state)? {
                let _ = writeln!(out, "  {district}");
            }
        }
        None => {
            let _ = writeln!(out, "States:");
            for state in reference.states() {
                let count = reference.districts_of(state).map_or(0, <[String]>::len);
                let _ = writeln!(out, "  {state} ({count} districts)");
            }
        }
    }
    let _ = writeln!(out, "Seasons: {}", reference.valid_seasons().join(", "));
    let _ = writeln!(out, "Crops:   {}", reference.valid_crops().join(", "));
    Ok(out)
}

/// `--json` payload for `cyp predict`.
#[derive(Debug, Serialize)]
pub struct PredictionPayload<'a> {
    /// Always `"predict"`.
    pub command: &'static str,
    /// How the active predictor was chosen.
    pub notice: &'a LoadNotice,
    /// The validated request.
    pub input: &'a InputRecord,
    /// Yield, production, metrics, and trend.
    pub result: &'a PredictionResult,
}

/// `--json` payload for `cyp status`.
#[derive(Debug, Serialize)]
pub struct StatusPayload<'a> {
    /// Always `"status"`.
    pub command: &'static str,
    /// Active predictor.
    pub predictor: PredictorVariant,
    /// How it was chosen.
    pub notice: &'a LoadNotice,
    /// Where the model artifact was looked up.
    pub artifact_path: &'a Path,
    /// SHA-256 of the loaded artifact; absent in demo mode.
    pub fingerprint: Option<&'a str>,
}

impl<'a> StatusPayload<'a> {
    /// Snapshot of a resolved predictor.
    #[must_use]
    pub fn new(resolved: &'a ResolvedPredictor) -> Self {
        Self {
            command: "status",
            predictor: resolved.variant(),
            notice: resolved.notice(),
            artifact_path: resolved.artifact_path(),
            fingerprint: resolved.fingerprint(),
        }
    }
}

/// `--json` payload for `cyp reference`.
#[derive(Debug, Serialize)]
pub struct ReferencePayload<'a> {
    /// Always `"reference"`.
    pub command: &'static str,
    /// State asked about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'a str>,
    /// Districts of `state`, in display order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub districts: Option<&'a [String]>,
    /// All state names.
    pub states: Vec<&'a str>,
    /// Selectable seasons.
    pub seasons: &'a [String],
    /// Selectable crops.
    pub crops: &'a [String],
}

impl<'a> ReferencePayload<'a> {
    /// Fails with `UnknownState` when `state` is not in the tables.
    pub fn new(reference: &'a ReferenceData, state: Option<&'a str>) -> Result<Self> {
        let districts = state.map(|s| reference.districts_of(s)).transpose()?;
        Ok(Self {
            command: "reference",
            state,
            districts,
            states: reference.states().collect(),
            seasons: reference.valid_seasons(),
            crops: reference.valid_crops(),
        })
    }
}

/// `--json` payload for a failed command.
#[derive(Debug, Serialize)]
pub struct ErrorPayload<'a> {
    /// Subcommand that failed.
    pub command: &'a str,
    /// Stable `CYP-xxxx` code.
    pub code: &'static str,
    /// Full error message.
    pub error: String,
}
