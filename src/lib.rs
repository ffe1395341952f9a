//! Crop yield and production prediction.
//!
//! Validates field inputs against reference tables, runs them through a
//! trained regression tree (or a fixed demo formula when no model is
//! available), and derives production, index metrics, and a short trend.

pub mod core;
pub mod logger;
pub mod prediction;
pub mod predictor;
pub mod reference;

#[cfg(feature = "cli")]
pub mod cli_app;
