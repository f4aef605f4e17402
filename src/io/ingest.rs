//! Sales-record ingest and normalization.
//!
//! This module turns the caller's `sales_data` array into a clean daily
//! series that is safe to fit.
//!
//! Rules:
//! - every record needs both `date` and `units_sold`
//! - `units_sold` may be a JSON number or a numeric string
//! - records are stably sorted by date; on duplicate dates the last record in
//!   input order wins
//! - no fitting logic here

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

use crate::domain::{SeriesPoint, TimeSeries};
use crate::error::AppError;

const MISSING_FIELDS: &str = "Sales data must contain 'date' and 'units_sold' columns";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize raw records into a sorted, deduplicated series.
pub fn normalize_sales(records: &[Value]) -> Result<TimeSeries, AppError> {
    let mut points = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let (Some(date), Some(units)) = (record.get("date"), record.get("units_sold")) else {
            return Err(AppError::validation(MISSING_FIELDS));
        };

        let date = parse_date(date)
            .map_err(|e| AppError::validation(format!("Error preparing sales data: record {idx}: {e}")))?;
        let value = parse_units(units)
            .map_err(|e| AppError::validation(format!("Error preparing sales data: record {idx}: {e}")))?;

        if value < 0.0 {
            warn!(record = idx, %date, value, "negative units_sold");
        }
        points.push(SeriesPoint { date, value });
    }

    // `sort_by_key` is stable, so equal dates keep input order and the last
    // one survives the dedup below.
    points.sort_by_key(|p| p.date);
    let mut deduped: Vec<SeriesPoint> = Vec::with_capacity(points.len());
    for p in points {
        match deduped.last_mut() {
            Some(last) if last.date == p.date => *last = p,
            _ => deduped.push(p),
        }
    }

    TimeSeries::from_sorted(deduped)
        .ok_or_else(|| AppError::validation("Error preparing sales data: dates are not strictly increasing"))
}

fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    let Some(raw) = value.as_str() else {
        return Err(format!("date must be a string, got {value}"));
    };
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!("unrecognized date '{raw}'"))
}

fn parse_units(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(format!("units_sold must be numeric, got {value}")),
    }
}
