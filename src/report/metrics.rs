//! In-sample accuracy: MAE and MAPE over dates present in both the history
//! and the prediction set.
//!
//! Fitted values are compared before clipping. Actual values of zero have no
//! defined percentage error and are left out of MAPE; when every actual is
//! zero MAPE is `None`.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::TimeSeries;
use crate::error::AppError;
use crate::fit::Prediction;
use crate::math::mean;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyMetrics {
    pub mae: f64,
    /// Percent.
    pub mape: Option<f64>,
}

pub fn compute_metrics(history: &TimeSeries, predictions: &[Prediction]) -> Result<AccuracyMetrics, AppError> {
    let fitted: HashMap<NaiveDate, f64> = predictions.iter().map(|p| (p.date, p.yhat)).collect();

    let mut abs_errors = Vec::with_capacity(history.len());
    let mut pct_errors = Vec::with_capacity(history.len());
    for point in history.points() {
        let Some(&yhat) = fitted.get(&point.date) else {
            continue;
        };
        let err = (yhat - point.value).abs();
        abs_errors.push(err);
        if point.value != 0.0 {
            pct_errors.push(err / point.value.abs());
        }
    }

    let mae = mean(&abs_errors).ok_or_else(|| AppError::model("No fitted values overlap the sales history."))?;
    let mape = mean(&pct_errors).map(|m| m * 100.0);

    Ok(AccuracyMetrics { mae, mape })
}
