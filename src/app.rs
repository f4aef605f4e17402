//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module is the
//! "real main" that:
//! - parses CLI arguments
//! - obtains the request from argv or stdin
//! - runs the forecast pipeline
//! - prints the resulting document

use std::io::{Read, Write};

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::domain::ForecastOutcome;
use crate::error::{AppError, USAGE};
use crate::io::{parse_request, read_input, write_error, write_outcome};

pub mod pipeline;

/// Entry point for the `forecast` binary.
///
/// Writes exactly one JSON document to `stdout` (or clap's help/version text)
/// and returns the exit code. Panics inside the pipeline are caught and
/// reported like any other failure.
pub fn run<I, R, W>(args: I, stdin: R, mut stdout: W) -> u8
where
    I: IntoIterator<Item = String>,
    R: Read,
    W: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return match write!(stdout, "{err}").and_then(|()| stdout.flush()) {
                Ok(()) => 0,
                Err(write_err) => report_error(&mut stdout, &AppError::Unexpected(write_err.to_string())),
            };
        }
        Err(err) => {
            let rendered = err.to_string();
            let detail = rendered.lines().next().unwrap_or_default().trim();
            let usage = AppError::Usage(format!("{USAGE} ({detail})"));
            return report_error(&mut stdout, &usage);
        }
    };
    crate::logging::init(cli.verbose);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        handle_request(cli.json, stdin, &mut stdout)
    }));

    match result {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => report_error(&mut stdout, &err),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "internal panic".to_string());
            report_error(&mut stdout, &AppError::Unexpected(message))
        }
    }
}

fn handle_request<R: Read, W: Write>(json: Option<String>, stdin: R, stdout: &mut W) -> Result<(), AppError> {
    let raw = read_input(json, stdin)?;
    // Bad parameters are reported like any other forecast failure: the
    // document carries `fallback_needed` and the process exits 0.
    let request = match parse_request(raw) {
        Ok(request) => request,
        Err(AppError::Validation(message)) => {
            warn!(%message, "request parameters rejected");
            return write_outcome(stdout, &ForecastOutcome::failure(message));
        }
        Err(err) => return Err(err),
    };
    debug!(
        records = request.sales_data.len(),
        forecast_days = request.forecast_days,
        include_history = request.include_history,
        "request accepted"
    );

    let outcome = pipeline::generate(&request.sales_data, request.forecast_days, request.include_history);
    write_outcome(stdout, &outcome)
}

fn report_error<W: Write>(stdout: &mut W, err: &AppError) -> u8 {
    tracing::error!(error = %err, "request failed");
    if let Err(write_err) = write_error(stdout, &err.to_document()) {
        eprintln!("{write_err}");
    }
    err.exit_code()
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn run_with(args: &[&str], stdin: &str) -> (u8, String) {
        let mut out = Vec::new();
        let argv = std::iter::once("forecast").chain(args.iter().copied()).map(String::from);
        let code = run(argv, stdin.as_bytes(), &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn argument_request_succeeds() {
        let req = r#"{"sales_data":[{"date":"2024-01-01","units_sold":10},{"date":"2024-01-02","units_sold":12},{"date":"2024-01-03","units_sold":9}],"forecast_days":2}"#;
        let (code, out) = run_with(&[req], "");
        assert_eq!(code, 0);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["success"], true);
        assert_eq!(doc["forecast"].as_array().unwrap().len(), 2);
        assert_eq!(doc["model_info"]["data_points"], 3);
    }

    #[test]
    fn stdin_request_is_used_without_argument() {
        let req = r#"{"sales_data":[{"date":"2024-01-01","units_sold":1},{"date":"2024-01-02","units_sold":2}],"forecast_days":1}"#;
        let (code, out) = run_with(&[], req);
        assert_eq!(code, 0);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["forecast"][0]["date"], "2024-01-03");
    }

    #[test]
    fn empty_input_is_a_usage_error() {
        let (code, out) = run_with(&[], "");
        assert_ne!(code, 0);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["success"], false);
        assert!(doc["error"].as_str().unwrap().contains("Usage"));
    }

    #[test]
    fn pipeline_failure_still_exits_zero() {
        let (code, out) = run_with(&[r#"{"sales_data":[{"date":"2024-01-01","units_sold":5}]}"#], "");
        assert_eq!(code, 0);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["success"], false);
        assert_eq!(doc["fallback_needed"], true);
    }

    #[test]
    fn bad_parameters_request_fallback_and_exit_zero() {
        let rows = r#"[{"date":"2024-01-01","units_sold":4},{"date":"2024-01-02","units_sold":6}]"#;
        for extra in [r#""forecast_days":"3""#, r#""forecast_days":2.5"#, r#""include_history":"yes""#] {
            let req = format!(r#"{{"sales_data":{rows},{extra}}}"#);
            let (code, out) = run_with(&[&req], "");
            assert_eq!(code, 0, "{extra}");
            let doc: Value = serde_json::from_str(&out).unwrap();
            assert_eq!(doc["success"], false);
            assert_eq!(doc["fallback_needed"], true);
        }

        let (code, out) = run_with(&[r#"{"sales_data":"2024-01-01"}"#], "");
        assert_eq!(code, 0);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["fallback_needed"], true);
    }

    #[test]
    fn malformed_stdin_is_a_usage_error() {
        let (code, out) = run_with(&[], "{\"sales_data\": [");
        assert_eq!(code, 1);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["error"], USAGE);
        assert!(doc.get("fallback_needed").is_none());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn help_write_failure_is_not_success() {
        let argv = ["forecast", "--help"].into_iter().map(String::from);
        assert_eq!(run(argv, std::io::empty(), BrokenPipe), 1);
    }

    #[test]
    fn unknown_flag_is_reported_as_json() {
        let (code, out) = run_with(&["--bogus"], "");
        assert_eq!(code, 1);
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["success"], false);
    }

    #[test]
    fn help_prints_text_and_exits_zero() {
        let (code, out) = run_with(&["--help"], "");
        assert_eq!(code, 0);
        assert!(out.contains("Usage"));
    }
}
