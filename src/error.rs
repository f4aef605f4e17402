//! Error taxonomy for a forecast run.
//!
//! Every failure ends up as a JSON document on stdout. The variant decides the
//! process exit code and whether the caller is told to fall back to a
//! simpler estimate.

use serde::Serialize;
use thiserror::Error;

/// Usage line shown when no input could be obtained.
pub const USAGE: &str = "Usage: forecast '<json_data>'";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// No input could be obtained (missing argument and empty stdin).
    #[error("{0}")]
    Usage(String),

    /// Input was obtained but is not a JSON object.
    #[error("Invalid JSON input: {0}")]
    Parse(String),

    /// `sales_data` is absent or empty.
    #[error("No sales data provided")]
    NoSalesData,

    /// Records or request parameters failed validation.
    #[error("{0}")]
    Validation(String),

    /// The model could not be fitted or evaluated.
    #[error("{0}")]
    Model(String),

    /// Anything else (stdout failures, caught panics).
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Whether the caller should switch to its non-statistical estimate.
    ///
    /// `None` means the flag is left out of the error document entirely.
    pub fn fallback_needed(&self) -> Option<bool> {
        match self {
            AppError::Usage(_) | AppError::Parse(_) | AppError::NoSalesData => None,
            AppError::Validation(_) | AppError::Model(_) | AppError::Unexpected(_) => Some(true),
        }
    }

    pub fn to_document(&self) -> ErrorDocument {
        ErrorDocument {
            success: false,
            error: self.to_string(),
            fallback_needed: self.fallback_needed(),
        }
    }
}

/// The `success: false` document printed for every failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDocument {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_needed: Option<bool>,
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_document_omits_fallback_flag() {
        let doc = AppError::Usage(format!("No input provided. {USAGE}")).to_document();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("fallback_needed").is_none());
        assert!(json["error"].as_str().unwrap().starts_with("No input provided"));
    }

    #[test]
    fn validation_document_requests_fallback() {
        let doc = AppError::validation("Need at least 2 data points for forecasting").to_document();
        assert_eq!(doc.fallback_needed, Some(true));
        assert_eq!(doc.error, "Need at least 2 data points for forecasting");
    }

    #[test]
    fn parse_errors_are_prefixed() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err().into();
        assert!(err.to_string().starts_with("Invalid JSON input: "));
        assert_eq!(err.exit_code(), 1);
    }
}
