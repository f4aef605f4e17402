//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - place potential trend changepoints over the history
//! - fit the decomposition by penalized least squares
//! - simulate prediction intervals for history and future dates

pub mod changepoints;
pub mod fitter;
pub mod uncertainty;

pub use changepoints::*;
pub use fitter::*;
pub use uncertainty::*;
