//! Yield predictor capability: the input row contract, the demo formula, and
//! the loaded regression tree.

#![allow(missing_docs)]

pub mod loader;
pub mod tree;

use std::fmt;

use serde::Serialize;

use crate::core::errors::{CypError, Result};

pub use loader::{LoadNotice, PredictorLoader, ResolvedPredictor};
pub use tree::TreeModel;

/// Column names of the model's input table, in training order.
pub mod columns {
    pub const STATE: &str = "State_Name";
    pub const DISTRICT: &str = "District_Name";
    pub const CROP_YEAR: &str = "Crop_Year";
    pub const SEASON: &str = "Season";
    pub const CROP: &str = "Crop";
    pub const TEMPERATURE: &str = "Temperature";
    pub const HUMIDITY: &str = "Humidity";
    pub const SOIL_MOISTURE: &str = "Soil_Moisture";
    pub const AREA: &str = "Area";

    pub const ALL: [&str; 9] = [
        STATE,
        DISTRICT,
        CROP_YEAR,
        SEASON,
        CROP,
        TEMPERATURE,
        HUMIDITY,
        SOIL_MOISTURE,
        AREA,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// A single-row input table: ordered `(column, value)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    cells: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    #[must_use]
    pub fn new(cells: Vec<(&'static str, FeatureValue)>) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.cells
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    #[cfg(test)]
    pub(crate) fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(name, _)| *name)
    }

    /// Numeric cell, or a `PredictionInvocation` error describing the mismatch.
    pub fn number(&self, column: &str) -> Result<f64> {
        match self.get(column) {
            Some(FeatureValue::Number(value)) => Ok(*value),
            Some(other) => Err(CypError::invocation(format!(
                "column {column} holds {other}, expected a number"
            ))),
            None => Err(missing(column)),
        }
    }

    /// Text cell, or a `PredictionInvocation` error describing the mismatch.
    pub fn text(&self, column: &str) -> Result<&str> {
        match self.get(column) {
            Some(FeatureValue::Text(value)) => Ok(value),
            Some(other) => Err(CypError::invocation(format!(
                "column {column} holds {other}, expected text"
            ))),
            None => Err(missing(column)),
        }
    }
}

fn missing(column: &str) -> CypError {
    CypError::invocation(format!("input row has no column {column}"))
}

/// Which kind of predictor produced a yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorVariant {
    Demo,
    Model,
}

impl PredictorVariant {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Model => "model",
        }
    }
}

/// Anything that turns an input row into a yield per unit of area.
pub trait YieldPredictor: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> Result<f64>;

    fn variant(&self) -> PredictorVariant;
}

/// Fixed linear fallback used when no trained model is available.
///
/// Only temperature and soil moisture contribute; every other column is
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoPredictor;

impl DemoPredictor {
    pub const TEMPERATURE_WEIGHT: f64 = 0.02;
    pub const SOIL_MOISTURE_WEIGHT: f64 = 0.01;
}

impl YieldPredictor for DemoPredictor {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        let temperature = row.number(columns::TEMPERATURE)?;
        let soil_moisture = row.number(columns::SOIL_MOISTURE)?;
        Ok(temperature * Self::TEMPERATURE_WEIGHT + soil_moisture * Self::SOIL_MOISTURE_WEIGHT)
    }

    fn variant(&self) -> PredictorVariant {
        PredictorVariant::Demo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(temperature: f64, soil_moisture: f64) -> FeatureRow {
        FeatureRow::new(vec![
            (columns::CROP_YEAR, FeatureValue::Text("2025".to_string())),
            (columns::TEMPERATURE, FeatureValue::Number(temperature)),
            (columns::SOIL_MOISTURE, FeatureValue::Number(soil_moisture)),
        ])
    }

    #[test]
    fn demo_formula_matches_weights() {
        let value = DemoPredictor.predict(&row(30.0, 45.0)).unwrap();
        assert!((value - 1.05).abs() < 1e-12);
        assert_eq!(DemoPredictor.variant(), PredictorVariant::Demo);
    }

    #[test]
    fn typed_accessors_report_mismatches() {
        let row = row(30.0, 45.0);
        assert_eq!(row.text(columns::CROP_YEAR).unwrap(), "2025");
        assert_eq!(row.number(columns::CROP_YEAR).unwrap_err().code(), "CYP-3002");
        assert_eq!(row.text(columns::TEMPERATURE).unwrap_err().code(), "CYP-3002");
        assert!(row.number(columns::AREA).is_err());
    }

    #[test]
    fn feature_row_serializes_as_pairs() {
        let json = serde_json::to_string(&row(30.0, 45.0)).unwrap();
        assert!(json.contains("[\"Crop_Year\",\"2025\"]"));
        assert!(json.contains("[\"Temperature\",30.0]"));
    }
}
