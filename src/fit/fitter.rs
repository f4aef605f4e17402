//! Fit the additive decomposition to a normalized series.
//!
//! Given a strictly ascending daily series we:
//! - rescale time to `[0, 1]` over the history span and values by `max |y|`
//! - place trend changepoints over the first part of the history
//! - build the design matrix (trend, slope changes, Fourier seasonality)
//! - solve the MAP problem as ridge regression, re-estimating the noise scale
//!   between passes
//!
//! The result is a `FittedModel` that predicts any date, with intervals.

use chrono::{Datelike, Days, NaiveDate};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{ModelConfig, TimeSeries};
use crate::error::AppError;
use crate::fit::changepoints::place_changepoints;
use crate::fit::uncertainty::simulate_intervals;
use crate::math::solve_ridge;
use crate::models::{DesignLayout, fill_design_row, predict};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Starting noise scale (in scaled units) for the first penalized solve.
const SIGMA_INIT: f64 = 0.5;

/// Lower bound on the noise scale so penalties never vanish.
const SIGMA_FLOOR: f64 = 1e-4;

/// Solve / re-estimate passes.
const FIT_PASSES: usize = 5;

/// Fitted decomposition, ready to predict.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub config: ModelConfig,
    pub layout: DesignLayout,
    /// Coefficients in scaled units, ordered as `layout` describes.
    pub params: Vec<f64>,
    /// First history date (`t = 0`).
    pub start: NaiveDate,
    /// Last history date (`t = 1`).
    pub end: NaiveDate,
    pub y_scale: f64,
    /// Residual noise scale in scaled units.
    pub sigma_obs: f64,
}

/// One predicted row in original units (unclipped).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Days since 1970-01-01.
pub fn epoch_days(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

/// Fit the model once to `series`.
pub fn fit_model(series: &TimeSeries, config: &ModelConfig) -> Result<FittedModel, AppError> {
    let (Some(start), Some(end)) = (series.first_date(), series.last_date()) else {
        return Err(AppError::validation("Need at least 2 data points for forecasting"));
    };
    if series.len() < 2 || end <= start {
        return Err(AppError::validation("Need at least 2 data points for forecasting"));
    }

    let y: Vec<f64> = series.values().collect();
    if y.iter().any(|v| !v.is_finite()) {
        return Err(AppError::model("Series contains non-finite values."));
    }

    let y_scale = match y.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())) {
        s if s > 0.0 => s,
        _ => 1.0,
    };

    let span = (end - start).num_days() as f64;
    let t: Vec<f64> = series
        .dates()
        .map(|d| (d - start).num_days() as f64 / span)
        .collect();
    let days: Vec<f64> = series.dates().map(epoch_days).collect();
    let ys = DVector::from_iterator(y.len(), y.iter().map(|v| v / y_scale));

    let changepoints = place_changepoints(&t, config.n_changepoints, config.changepoint_range);
    let layout = DesignLayout::new(changepoints, config.seasonalities());
    let n = t.len();
    let p = layout.column_count();

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for i in 0..n {
        fill_design_row(&layout, t[i], days[i], &mut row);
        for (j, v) in row.iter().enumerate() {
            x[(i, j)] = *v;
        }
    }

    let scales = prior_scales(&layout, config);
    debug!(
        n,
        columns = p,
        changepoints = layout.changepoints.len(),
        y_scale,
        "fitting additive decomposition"
    );
    for s in &layout.seasonalities {
        debug!(
            name = s.name,
            period = s.period,
            fourier_order = s.fourier_order,
            "seasonal component"
        );
    }

    let mut sigma = SIGMA_INIT;
    let mut params = Vec::new();
    for pass in 0..FIT_PASSES {
        let penalties: Vec<f64> = scales.iter().map(|s| (sigma / s).powi(2)).collect();
        let beta = solve_ridge(&x, &ys, &penalties)
            .ok_or_else(|| AppError::model("Failed to solve the model's least-squares system."))?;

        let residuals = &ys - &x * &beta;
        let rms = (residuals.norm_squared() / n as f64).sqrt();
        if !rms.is_finite() {
            return Err(AppError::model("Non-finite residuals while fitting."));
        }
        sigma = rms.max(SIGMA_FLOOR);
        params = beta.iter().copied().collect();
        debug!(pass, sigma, "penalized solve");
    }

    Ok(FittedModel {
        config: config.clone(),
        layout,
        params,
        start,
        end,
        y_scale,
        sigma_obs: sigma,
    })
}

/// Gaussian prior standard deviation for each design column.
fn prior_scales(layout: &DesignLayout, config: &ModelConfig) -> Vec<f64> {
    let mut scales = vec![config.trend_prior_scale; DesignLayout::TREND_BASE];
    scales.extend(layout.changepoints.iter().map(|_| config.changepoint_prior_scale));
    scales.resize(layout.column_count(), config.seasonality_prior_scale);
    scales
}

impl FittedModel {
    /// Position of `date` on the scaled time axis (history spans `[0, 1]`).
    pub fn scaled_time(&self, date: NaiveDate) -> f64 {
        let span = (self.end - self.start).num_days() as f64;
        (date - self.start).num_days() as f64 / span
    }

    /// Point estimate in original units.
    pub fn predict_point(&self, date: NaiveDate) -> f64 {
        predict(&self.layout, &self.params, self.scaled_time(date), epoch_days(date)) * self.y_scale
    }

    /// The `periods` calendar days following the last history date.
    pub fn future_dates(&self, periods: usize) -> Result<Vec<NaiveDate>, AppError> {
        (1..=periods as u64)
            .map(|i| {
                self.end
                    .checked_add_days(Days::new(i))
                    .ok_or_else(|| AppError::model("Forecast horizon runs past the supported date range."))
            })
            .collect()
    }

    /// Predict `dates` with point estimates and simulated intervals.
    pub fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<Prediction>, AppError> {
        let t: Vec<f64> = dates.iter().map(|&d| self.scaled_time(d)).collect();
        let days: Vec<f64> = dates.iter().map(|&d| epoch_days(d)).collect();
        let intervals = simulate_intervals(self, &t, &days)?;

        let mut out = Vec::with_capacity(dates.len());
        for (i, &date) in dates.iter().enumerate() {
            let yhat = predict(&self.layout, &self.params, t[i], days[i]) * self.y_scale;
            let (yhat_lower, yhat_upper) = intervals[i];
            if !(yhat.is_finite() && yhat_lower.is_finite() && yhat_upper.is_finite()) {
                return Err(AppError::model("Non-finite model prediction."));
            }
            out.push(Prediction {
                date,
                yhat,
                yhat_lower,
                yhat_upper,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesPoint;

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                date: start + chrono::Duration::days(i as i64),
                value,
            })
            .collect();
        TimeSeries::from_sorted(points).unwrap()
    }

    #[test]
    fn epoch_days_of_known_dates() {
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0.0);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 19_723.0);
    }

    #[test]
    fn fit_recovers_a_linear_trend() {
        let values: Vec<f64> = (0..120).map(|i| 50.0 + 0.5 * i as f64).collect();
        let model = fit_model(&series(&values), &ModelConfig::default()).unwrap();

        for (i, v) in values.iter().enumerate().step_by(10) {
            let date = model.start + chrono::Duration::days(i as i64);
            let fitted = model.predict_point(date);
            assert!((fitted - v).abs() < 1.0, "day {i}: fitted {fitted}, actual {v}");
        }
    }

    #[test]
    fn fit_picks_up_weekly_pattern() {
        let pattern = [10.0, 12.0, 14.0, 13.0, 11.0, 25.0, 30.0];
        let values: Vec<f64> = (0..140).map(|i| pattern[i % 7]).collect();
        let model = fit_model(&series(&values), &ModelConfig::default()).unwrap();

        let next = model.future_dates(7).unwrap();
        let preds: Vec<f64> = next.iter().map(|&d| model.predict_point(d)).collect();
        let expected: Vec<f64> = (140..147).map(|i| pattern[i % 7]).collect();
        for (p, e) in preds.iter().zip(expected.iter()) {
            assert!((p - e).abs() < 3.0, "predicted {p}, expected {e}");
        }
    }

    #[test]
    fn fit_rejects_single_point() {
        let err = fit_model(&series(&[5.0]), &ModelConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn fit_handles_all_zero_series() {
        let model = fit_model(&series(&[0.0, 0.0, 0.0, 0.0]), &ModelConfig::default()).unwrap();
        assert_eq!(model.y_scale, 1.0);
        assert!(model.predict_point(model.end).abs() < 1e-6);
    }

    #[test]
    fn future_dates_follow_last_history_day() {
        let model = fit_model(&series(&[10.0, 12.0, 9.0]), &ModelConfig::default()).unwrap();
        let dates = model.future_dates(2).unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            ]
        );
        assert!(model.future_dates(0).unwrap().is_empty());
    }

    #[test]
    fn predict_returns_ordered_intervals() {
        let values: Vec<f64> = (0..60).map(|i| 20.0 + (i % 7) as f64).collect();
        let model = fit_model(&series(&values), &ModelConfig::default()).unwrap();
        let dates = model.future_dates(14).unwrap();
        let preds = model.predict(&dates).unwrap();
        assert_eq!(preds.len(), 14);
        for p in preds {
            assert!(p.yhat_lower <= p.yhat_upper);
        }
    }
}
