//! Additive decomposition model: design layout and evaluation.
//!
//! Evaluation is a pair of small, pure functions so fitting and simulation
//! code can share them.

pub mod model;

pub use model::*;
