//! Form input: unvalidated drafts and range-checked records.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::core::errors::{CypError, Result};
use crate::predictor::{FeatureRow, FeatureValue, columns};
use crate::reference::ReferenceData;

/// Inclusive bounds for a numeric form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    const fn new(field: &'static str, min: f64, max: f64) -> Self {
        Self { field, min, max }
    }

    /// NaN and infinities never satisfy a range.
    pub fn check(&self, value: f64) -> Result<f64> {
        if value.is_finite() && (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(CypError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const CROP_YEAR_RANGE: FieldRange = FieldRange::new("crop_year", 1990.0, 2050.0);
pub const TEMPERATURE_RANGE: FieldRange = FieldRange::new("temperature", 10.0, 50.0);
pub const HUMIDITY_RANGE: FieldRange = FieldRange::new("humidity", 10.0, 100.0);
pub const SOIL_MOISTURE_RANGE: FieldRange = FieldRange::new("soil_moisture", 0.0, 100.0);
pub const AREA_RANGE: FieldRange = FieldRange::new("area", 0.1, 100_000.0);

/// Raw form values. Unset selections fall back to the first reference entry;
/// numeric fields default to the form's initial widget values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDraft {
    pub state: Option<String>,
    pub district: Option<String>,
    pub crop: Option<String>,
    pub season: Option<String>,
    pub crop_year: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub area: f64,
}

impl Default for InputDraft {
    fn default() -> Self {
        Self {
            state: None,
            district: None,
            crop: None,
            season: None,
            crop_year: 2025,
            temperature: 30.0,
            humidity: 50.0,
            soil_moisture: 45.0,
            area: 100.0,
        }
    }
}

impl InputDraft {
    /// Check every field against `reference` and the declared ranges.
    ///
    /// Selections are checked before numeric ranges, so an unknown state is
    /// reported even when a slider value is also off.
    pub fn validate(&self, reference: &ReferenceData) -> Result<InputRecord> {
        let state = match &self.state {
            Some(state) => {
                reference.districts_of(state)?;
                state.clone()
            }
            None => first(reference.states().map(str::to_string), "state")?,
        };
        let district = match &self.district {
            Some(district) => {
                reference.check_district(&state, district)?;
                district.clone()
            }
            None => first(reference.districts_of(&state)?.iter().cloned(), "district")?,
        };
        let crop = pick(
            self.crop.as_deref(),
            reference.valid_crops(),
            |crop| CypError::UnknownCrop { crop },
            "crop",
        )?;
        let season = pick(
            self.season.as_deref(),
            reference.valid_seasons(),
            |season| CypError::UnknownSeason { season },
            "season",
        )?;

        CROP_YEAR_RANGE.check(f64::from(self.crop_year))?;
        Ok(InputRecord {
            state,
            district,
            crop,
            season,
            crop_year: self.crop_year,
            temperature: TEMPERATURE_RANGE.check(self.temperature)?,
            humidity: HUMIDITY_RANGE.check(self.humidity)?,
            soil_moisture: SOIL_MOISTURE_RANGE.check(self.soil_moisture)?,
            area: AREA_RANGE.check(self.area)?,
        })
    }
}

fn first(mut items: impl Iterator<Item = String>, what: &str) -> Result<String> {
    items.next().ok_or_else(|| CypError::InvalidConfig {
        details: format!("reference data has no {what} to default to"),
    })
}

fn pick(
    requested: Option<&str>,
    allowed: &[String],
    unknown: impl FnOnce(String) -> CypError,
    what: &str,
) -> Result<String> {
    match requested {
        Some(value) if allowed.iter().any(|a| a == value) => Ok(value.to_string()),
        Some(value) => Err(unknown(value.to_string())),
        None => first(allowed.iter().cloned(), what),
    }
}

/// A validated prediction request. Only obtainable via [`InputDraft::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRecord {
    state: String,
    district: String,
    crop: String,
    season: String,
    crop_year: i32,
    temperature: f64,
    humidity: f64,
    soil_moisture: f64,
    area: f64,
}

impl InputRecord {
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn district(&self) -> &str {
        &self.district
    }

    pub fn crop(&self) -> &str {
        &self.crop
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn crop_year(&self) -> i32 {
        self.crop_year
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn soil_moisture(&self) -> f64 {
        self.soil_moisture
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Shape the record into the model's single-row input table. The year is
    /// passed as text, matching how the regression tree was trained.
    #[must_use]
    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::new(vec![
            (columns::STATE, FeatureValue::Text(self.state.clone())),
            (columns::DISTRICT, FeatureValue::Text(self.district.clone())),
            (columns::CROP_YEAR, FeatureValue::Text(self.crop_year.to_string())),
            (columns::SEASON, FeatureValue::Text(self.season.clone())),
            (columns::CROP, FeatureValue::Text(self.crop.clone())),
            (columns::TEMPERATURE, FeatureValue::Number(self.temperature)),
            (columns::HUMIDITY, FeatureValue::Number(self.humidity)),
            (columns::SOIL_MOISTURE, FeatureValue::Number(self.soil_moisture)),
            (columns::AREA, FeatureValue::Number(self.area)),
        ])
    }
}
