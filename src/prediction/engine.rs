//! Record → yield → production, scores, and trend.

#![allow(missing_docs)]

use serde::Serialize;

use super::input::InputRecord;
use crate::core::errors::{CypError, Result};
use crate::predictor::{PredictorVariant, YieldPredictor};

/// Production multipliers for years `y-2, y-1, y, y+1`.
pub const TREND_MULTIPLIERS: [f64; 4] = [0.7, 0.85, 1.0, 1.1];
/// Year offsets matching [`TREND_MULTIPLIERS`].
pub const TREND_YEAR_OFFSETS: [i32; 4] = [-2, -1, 0, 1];

pub const TEMPERATURE_SCORE_FACTOR: f64 = 2.0;
pub const MOISTURE_INDEX_FACTOR: f64 = 1.5;
pub const HUMIDITY_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub production: f64,
}

/// Everything shown for one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub variant: PredictorVariant,
    pub yield_per_unit: f64,
    pub total_production: f64,
    pub temperature_score: f64,
    pub moisture_index: f64,
    pub humidity_factor: f64,
    pub trend_series: [TrendPoint; 4],
}

/// Run one prediction.
///
/// A capability failure is returned as-is; there is no fallback to the demo
/// formula here. A non-finite yield, or a yield large enough that production
/// overflows, is treated as a capability failure.
pub fn predict(record: &InputRecord, capability: &dyn YieldPredictor) -> Result<PredictionResult> {
    let row = record.to_feature_row();
    let yield_per_unit = capability.predict(&row)?;
    if !yield_per_unit.is_finite() {
        return Err(CypError::invocation(format!(
            "model returned non-finite yield {yield_per_unit}"
        )));
    }

    let total_production = yield_per_unit * record.area();
    let trend_series: [TrendPoint; 4] = std::array::from_fn(|i| TrendPoint {
        year: record.crop_year() + TREND_YEAR_OFFSETS[i],
        production: total_production * TREND_MULTIPLIERS[i],
    });
    if !trend_series.iter().all(|point| point.production.is_finite()) {
        return Err(CypError::invocation(format!(
            "yield {yield_per_unit} over {} units overflows total production",
            record.area()
        )));
    }

    Ok(PredictionResult {
        variant: capability.variant(),
        yield_per_unit,
        total_production,
        temperature_score: record.temperature() * TEMPERATURE_SCORE_FACTOR,
        moisture_index: record.soil_moisture() * MOISTURE_INDEX_FACTOR,
        humidity_factor: record.humidity() * HUMIDITY_FACTOR,
        trend_series,
    })
}
