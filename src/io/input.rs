//! Request acquisition.
//!
//! The request is a single JSON object, taken from the positional argument if
//! one was given, otherwise read from stdin until EOF. Malformed JSON in the
//! argument is a parse error; on stdin it is a usage error.

use std::io::Read;

use serde_json::Value;
use tracing::debug;

use crate::domain::ForecastRequest;
use crate::error::{AppError, USAGE};

pub const DEFAULT_FORECAST_DAYS: usize = 30;

/// Read the raw request text and parse it as JSON.
pub fn read_input<R: Read>(arg: Option<String>, mut stdin: R) -> Result<Value, AppError> {
    let from_stdin = arg.is_none();
    let text = match arg {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .map_err(|e| AppError::Usage(format!("{USAGE} ({e})")))?;
            buf
        }
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Usage(format!("No input provided. {USAGE}")));
    }
    debug!(bytes = text.len(), "read request");

    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(err) if from_stdin => {
            debug!(error = %err, "stdin is not valid JSON");
            Err(AppError::Usage(USAGE.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Extract and validate request parameters.
pub fn parse_request(value: Value) -> Result<ForecastRequest, AppError> {
    let Value::Object(mut obj) = value else {
        return Err(AppError::Parse("expected a JSON object".to_string()));
    };

    let sales_data = match obj.remove("sales_data") {
        None | Some(Value::Null) => return Err(AppError::NoSalesData),
        Some(Value::Array(records)) if records.is_empty() => return Err(AppError::NoSalesData),
        Some(Value::Array(records)) => records,
        Some(other) => {
            return Err(AppError::validation(format!(
                "sales_data must be an array of records, got {other}"
            )));
        }
    };

    let forecast_days = match obj.get("forecast_days") {
        None | Some(Value::Null) => DEFAULT_FORECAST_DAYS,
        Some(v) => v
            .as_u64()
            .and_then(|d| usize::try_from(d).ok())
            .ok_or_else(|| AppError::validation(format!("forecast_days must be a non-negative integer, got {v}")))?,
    };

    let include_history = match obj.get("include_history") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(v) => return Err(AppError::validation(format!("include_history must be a boolean, got {v}"))),
    };

    Ok(ForecastRequest {
        sales_data,
        forecast_days,
        include_history,
    })
}
