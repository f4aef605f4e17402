//! Reporting utilities: accuracy metrics and result shaping.

pub mod metrics;

pub use metrics::*;

use crate::domain::{ForecastPoint, ModelConfig, ModelInfo};
use crate::fit::Prediction;
use crate::math::round2;

/// Reported in `model_info.method`.
pub const METHOD: &str = "Additive Decomposition";

/// Clip to zero, round, and attach the fixed confidence score.
pub fn shape_forecast(predictions: &[Prediction], config: &ModelConfig) -> Vec<ForecastPoint> {
    predictions
        .iter()
        .map(|p| ForecastPoint {
            date: p.date,
            predicted_demand: round2(p.yhat.max(0.0)),
            lower_bound: round2(p.yhat_lower.max(0.0)),
            upper_bound: round2(p.yhat_upper.max(0.0)),
            confidence_score: config.interval_width,
        })
        .collect()
}

pub fn model_info(
    config: &ModelConfig,
    data_points: usize,
    forecast_days: usize,
    metrics: &AccuracyMetrics,
) -> ModelInfo {
    ModelInfo {
        method: METHOD.to_string(),
        data_points,
        forecast_days,
        mae: round2(metrics.mae),
        mape: metrics.mape.map(round2),
        seasonality_mode: config.seasonality_mode,
        growth: config.growth,
    }
}
