//! Mathematical utilities: basis functions, penalized least squares and
//! sample statistics.

pub mod basis;
pub mod ols;
pub mod stats;

pub use basis::*;
pub use ols::*;
pub use stats::*;
