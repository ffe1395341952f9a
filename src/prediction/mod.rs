//! Prediction pipeline: validated input, the engine, and result rendering.

pub mod engine;
pub mod input;
pub mod report;

pub use engine::{PredictionResult, TrendPoint, predict};
pub use input::{InputDraft, InputRecord};
