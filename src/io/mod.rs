//! Input/output helpers.
//!
//! - request acquisition from argv/stdin + parameter validation (`input`)
//! - sales-record normalization (`ingest`)
//! - JSON document emission (`output`)

pub mod ingest;
pub mod input;
pub mod output;

pub use ingest::*;
pub use input::*;
pub use output::*;
