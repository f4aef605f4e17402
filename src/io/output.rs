//! JSON document emission.
//!
//! Pipeline results are printed indented for readability; error documents
//! are printed on one line. Both go to the writer handed in (stdout in the
//! binary), nothing else is ever written there.

use std::io::Write;

use serde::Serialize;

use crate::domain::ForecastOutcome;
use crate::error::{AppError, ErrorDocument};

/// Write a pipeline result, indented by two spaces.
pub fn write_outcome<W: Write>(mut out: W, outcome: &ForecastOutcome) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut out, outcome)
        .map_err(|e| AppError::Unexpected(format!("Failed to write forecast JSON: {e}")))?;
    finish(out)
}

/// Write a failure document on a single line.
pub fn write_error<W: Write>(mut out: W, doc: &ErrorDocument) -> Result<(), AppError> {
    write_compact(&mut out, doc)?;
    finish(out)
}

fn write_compact<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer(out, value)
        .map_err(|e| AppError::Unexpected(format!("Failed to write error JSON: {e}")))
}

fn finish<W: Write>(mut out: W) -> Result<(), AppError> {
    writeln!(out)
        .and_then(|()| out.flush())
        .map_err(|e| AppError::Unexpected(format!("Failed to write output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_is_indented_with_two_spaces() {
        let mut buf = Vec::new();
        write_outcome(&mut buf, &ForecastOutcome::failure("bad input")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("{\n  \"success\": false,"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn error_document_is_single_line() {
        let mut buf = Vec::new();
        write_error(&mut buf, &AppError::NoSalesData.to_document()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "{\"success\":false,\"error\":\"No sales data provided\"}\n");
    }
}
