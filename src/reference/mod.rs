//! Reference tables bounding the selectable inputs: states and their districts,
//! seasons, and crops.
//!
//! The built-in tables are sample data covering a handful of states. They are
//! not the full administrative set, and a `[reference]` config section swaps
//! them out wholesale.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::errors::{CypError, Result};

/// One state and the districts selectable under it, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDistricts {
    /// State name as shown in the form.
    pub name: String,
    /// Districts of the state; the first one is the form default.
    pub districts: Vec<String>,
}

/// Serializable form of the reference tables, as written in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTables {
    /// Selectable growing seasons.
    pub seasons: Vec<String>,
    /// Selectable crops.
    pub crops: Vec<String>,
    /// States in display order. Kept last so TOML writes it as `[[states]]`
    /// after the plain arrays.
    pub states: Vec<StateDistricts>,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self {
            states: vec![
                state(
                    "Andaman and Nicobar Islands",
                    &["NICOBARS", "NORTH AND MIDDLE ANDAMAN", "SOUTH ANDAMANS"],
                ),
                state(
                    "Andhra Pradesh",
                    &[
                        "ANANTAPUR",
                        "CHITTOOR",
                        "EAST GODAVARI",
                        "GUNTUR",
                        "KADAPA",
                        "KRISHNA",
                        "KURNOOL",
                        "PRAKASAM",
                        "SPSR NELLORE",
                        "SRIKAKULAM",
                        "VISAKHAPATANAM",
                        "VIZIANAGARAM",
                        "WEST GODAVARI",
                    ],
                ),
                state(
                    "Assam",
                    &[
                        "BAKSA",
                        "BARPETA",
                        "BONGAIGAON",
                        "CACHAR",
                        "CHIRANG",
                        "DARRANG",
                    ],
                ),
                state(
                    "Bihar",
                    &["ARARIA", "ARWAL", "AURANGABAD", "BANKA", "BEGUSARAI"],
                ),
            ],
            seasons: strings(&["Kharif", "Rabi", "Whole Year", "Autumn", "Summer", "Winter"]),
            crops: strings(&[
                "Rice",
                "Wheat",
                "Banana",
                "Coconut",
                "Maize",
                "Sugarcane",
                "Potato",
                "Turmeric",
                "Groundnut",
                "Blackgram",
                "Peas",
                "Onion",
                "Tomato",
                "Paddy",
            ]),
        }
    }
}

fn state(name: &str, districts: &[&str]) -> StateDistricts {
    StateDistricts {
        name: name.to_string(),
        districts: strings(districts),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Read-only lookups over validated reference tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    tables: ReferenceTables,
}

impl ReferenceData {
    /// Validate and wrap a set of tables.
    ///
    /// Every list must be non-empty, state names and per-list entries must be
    /// unique, and each state needs at least one district.
    pub fn from_tables(tables: ReferenceTables) -> Result<Self> {
        if tables.states.is_empty() {
            return Err(invalid("reference.states must not be empty"));
        }
        ensure_unique("reference.seasons", &tables.seasons)?;
        ensure_unique("reference.crops", &tables.crops)?;

        let mut seen = HashSet::new();
        for entry in &tables.states {
            if !seen.insert(entry.name.as_str()) {
                return Err(invalid(format!("duplicate state {:?}", entry.name)));
            }
            ensure_unique(&format!("districts of {:?}", entry.name), &entry.districts)?;
        }
        Ok(Self { tables })
    }

    /// States in display order.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.tables.states.iter().map(|s| s.name.as_str())
    }

    /// Districts registered under `state`, in display order.
    pub fn districts_of(&self, state: &str) -> Result<&[String]> {
        self.tables
            .states
            .iter()
            .find(|entry| entry.name == state)
            .map(|entry| entry.districts.as_slice())
            .ok_or_else(|| CypError::UnknownState {
                state: state.to_string(),
            })
    }

    /// Seasons accepted by the form.
    #[must_use]
    pub fn valid_seasons(&self) -> &[String] {
        &self.tables.seasons
    }

    /// Crops accepted by the form.
    #[must_use]
    pub fn valid_crops(&self) -> &[String] {
        &self.tables.crops
    }

    /// Fails with `UnknownState` or `UnknownDistrict`.
    pub fn check_district(&self, state: &str, district: &str) -> Result<()> {
        if self.districts_of(state)?.iter().any(|d| d == district) {
            Ok(())
        } else {
            Err(CypError::UnknownDistrict {
                state: state.to_string(),
                district: district.to_string(),
            })
        }
    }
}

fn ensure_unique(label: &str, items: &[String]) -> Result<()> {
    if items.is_empty() {
        return Err(invalid(format!("{label} must not be empty")));
    }
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.as_str()) {
            return Err(invalid(format!("{label} lists {item:?} twice")));
        }
    }
    Ok(())
}

fn invalid(details: impl Into<String>) -> CypError {
    CypError::InvalidConfig {
        details: details.into(),
    }
}
