//! The forecast pipeline: normalize -> fit -> predict -> summarize.
//!
//! `generate` never returns an error. Anything that goes wrong while
//! preparing data or fitting is folded into a `success: false` outcome that
//! tells the caller to fall back to a simpler estimate.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{ForecastOutcome, ForecastPoint, ModelConfig, ModelInfo};
use crate::error::AppError;
use crate::fit::fit_model;
use crate::io::normalize_sales;
use crate::report::{compute_metrics, model_info, shape_forecast};

/// Minimum number of distinct dates the model can be fitted on.
pub const MIN_POINTS: usize = 2;

/// Run the whole pipeline for one request.
pub fn generate(records: &[Value], forecast_days: usize, include_history: bool) -> ForecastOutcome {
    let config = ModelConfig::default();
    match run_forecast(records, forecast_days, include_history, &config) {
        Ok((forecast, info)) => {
            info!(
                rows = forecast.len(),
                data_points = info.data_points,
                mae = info.mae,
                "forecast generated"
            );
            ForecastOutcome::success(forecast, info)
        }
        Err(err) => {
            warn!(error = %err, "forecast failed, caller should fall back");
            ForecastOutcome::failure(err.to_string())
        }
    }
}

fn run_forecast(
    records: &[Value],
    forecast_days: usize,
    include_history: bool,
    config: &ModelConfig,
) -> Result<(Vec<ForecastPoint>, ModelInfo), AppError> {
    let series = normalize_sales(records)?;
    if series.len() < MIN_POINTS {
        return Err(AppError::validation("Need at least 2 data points for forecasting"));
    }
    info!(
        records = records.len(),
        data_points = series.len(),
        forecast_days,
        include_history,
        growth = config.growth.as_str(),
        seasonality_mode = config.seasonality_mode.as_str(),
        "fitting model"
    );

    let model = fit_model(&series, config)?;

    let mut dates: Vec<NaiveDate> = series.dates().collect();
    dates.extend(model.future_dates(forecast_days)?);
    let predictions = model.predict(&dates)?;

    let metrics = compute_metrics(&series, &predictions)?;

    let shown = if include_history {
        &predictions[..]
    } else {
        &predictions[series.len()..]
    };
    let forecast = shape_forecast(shown, config);
    let info = model_info(config, series.len(), forecast_days, &metrics);

    Ok((forecast, info))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    fn records(values: &[f64]) -> Vec<Value> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = start + Duration::days(i as i64);
                json!({"date": date.format("%Y-%m-%d").to_string(), "units_sold": v})
            })
            .collect()
    }

    fn unwrap_success(outcome: ForecastOutcome) -> (Vec<ForecastPoint>, ModelInfo) {
        match outcome {
            ForecastOutcome::Success(report) => {
                assert!(report.success);
                (report.forecast, report.model_info)
            }
            ForecastOutcome::Failure(f) => panic!("expected success, got {}", f.error),
        }
    }

    #[test]
    fn three_points_two_days() {
        let (forecast, info) = unwrap_success(generate(&records(&[10.0, 12.0, 9.0]), 2, false));
        let dates: Vec<String> = forecast.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-04", "2024-01-05"]);
        assert_eq!(info.data_points, 3);
        assert_eq!(info.forecast_days, 2);
        for p in &forecast {
            assert!(p.predicted_demand >= 0.0 && p.lower_bound >= 0.0 && p.upper_bound >= 0.0);
            assert_eq!(p.confidence_score, 0.8);
        }
    }

    #[test]
    fn include_history_prepends_fitted_rows() {
        let values: Vec<f64> = (0..20).map(|i| 5.0 + (i % 4) as f64).collect();
        let (forecast, _) = unwrap_success(generate(&records(&values), 5, true));
        assert_eq!(forecast.len(), 25);
        assert_eq!(forecast[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(forecast.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn future_rows_are_contiguous() {
        let values: Vec<f64> = (0..45).map(|i| 30.0 + (i % 7) as f64 * 2.0).collect();
        let (forecast, _) = unwrap_success(generate(&records(&values), 30, false));
        assert_eq!(forecast.len(), 30);
        assert_eq!(forecast[0].date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert!(forecast.windows(2).all(|w| w[1].date - w[0].date == Duration::days(1)));
    }

    #[test]
    fn declining_series_never_reports_negative_demand() {
        let values: Vec<f64> = (0..30).map(|i| (30 - i) as f64).collect();
        let (forecast, _) = unwrap_success(generate(&records(&values), 60, false));
        for p in forecast {
            assert!(p.predicted_demand >= 0.0);
            assert!(p.lower_bound >= 0.0);
            assert!(p.upper_bound >= 0.0);
        }
    }

    #[test]
    fn zero_horizon_yields_empty_forecast() {
        let (forecast, info) = unwrap_success(generate(&records(&[1.0, 2.0, 3.0]), 0, false));
        assert!(forecast.is_empty());
        assert_eq!(info.forecast_days, 0);
    }

    #[test]
    fn single_point_requests_fallback() {
        let outcome = generate(&[json!({"date": "2024-01-01", "units_sold": 5})], 30, false);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["fallback_needed"], true);
        assert_eq!(json["error"], "Need at least 2 data points for forecasting");
    }

    #[test]
    fn duplicates_of_one_date_are_a_single_point() {
        let outcome = generate(
            &[
                json!({"date": "2024-01-01", "units_sold": 5}),
                json!({"date": "2024-01-01", "units_sold": 6}),
            ],
            3,
            false,
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn missing_fields_fail_cleanly() {
        let outcome = generate(&[json!({"date": "2024-01-01"}), json!({"date": "2024-01-02"})], 3, false);
        let ForecastOutcome::Failure(f) = outcome else {
            panic!("expected failure");
        };
        assert!(f.fallback_needed);
        assert!(f.error.contains("'date' and 'units_sold'"));
    }
}
