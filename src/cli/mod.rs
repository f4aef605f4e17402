//! Command-line parsing.
//!
//! The binary takes at most one positional argument: the request JSON. When
//! it is absent the request is read from stdin.

use clap::{ArgAction, Parser};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Daily demand forecast from sales history (JSON in, JSON out)")]
pub struct Cli {
    /// Request JSON: {"sales_data": [...], "forecast_days": 30, "include_history": false}.
    /// Read from stdin when omitted.
    #[arg(value_name = "JSON")]
    pub json: Option<String>,

    /// Log diagnostics to stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
