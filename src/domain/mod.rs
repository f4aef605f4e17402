//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed model configuration (`ModelConfig`, `Seasonality`)
//! - the normalized input series (`TimeSeries`, `SeriesPoint`)
//! - the emitted documents (`ForecastOutcome`, `ForecastPoint`, `ModelInfo`)

pub mod types;

pub use types::*;
