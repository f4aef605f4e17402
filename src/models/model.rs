//! Model evaluation for the piecewise-linear trend plus Fourier seasonality.
//!
//! Column layout of a design row:
//!
//! ```text
//! [ m | k | δ_1 .. δ_C | season_1 (2·order_1) | season_2 (2·order_2) | ... ]
//! ```
//!
//! - `m`, `k`: trend offset and base slope in scaled time
//! - `δ_j`: slope change at changepoint `s_j`
//! - seasonal blocks: sine/cosine pairs on absolute days

use crate::domain::Seasonality;
use crate::math::{fourier_terms, hinge};

/// Column positions for a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignLayout {
    pub changepoints: Vec<f64>,
    pub seasonalities: Vec<Seasonality>,
}

impl DesignLayout {
    pub fn new(changepoints: Vec<f64>, seasonalities: Vec<Seasonality>) -> Self {
        Self {
            changepoints,
            seasonalities,
        }
    }

    /// Offset and slope.
    pub const TREND_BASE: usize = 2;

    pub fn delta_range(&self) -> std::ops::Range<usize> {
        Self::TREND_BASE..Self::TREND_BASE + self.changepoints.len()
    }

    pub fn seasonal_start(&self) -> usize {
        Self::TREND_BASE + self.changepoints.len()
    }

    pub fn column_count(&self) -> usize {
        self.seasonal_start()
            + self
                .seasonalities
                .iter()
                .map(Seasonality::column_count)
                .sum::<usize>()
    }
}

/// Fill a design row for scaled time `t` and absolute day `day`.
///
/// # Panics
/// Panics if `out.len() != layout.column_count()`.
pub fn fill_design_row(layout: &DesignLayout, t: f64, day: f64, out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = t;
    for (j, &s) in layout.changepoints.iter().enumerate() {
        out[DesignLayout::TREND_BASE + j] = hinge(t, s);
    }

    let mut col = layout.seasonal_start();
    for season in &layout.seasonalities {
        let width = season.column_count();
        fourier_terms(day, season.period, season.fourier_order, &mut out[col..col + width]);
        col += width;
    }
}

/// Trend component in scaled units.
pub fn trend(layout: &DesignLayout, params: &[f64], t: f64) -> f64 {
    let mut y = params[0] + params[1] * t;
    for (j, &s) in layout.changepoints.iter().enumerate() {
        y += params[DesignLayout::TREND_BASE + j] * hinge(t, s);
    }
    y
}

/// Sum of all seasonal components in scaled units.
pub fn seasonal(layout: &DesignLayout, params: &[f64], day: f64) -> f64 {
    let mut y = 0.0;
    let mut col = layout.seasonal_start();
    let mut terms = Vec::new();
    for season in &layout.seasonalities {
        let width = season.column_count();
        terms.resize(width, 0.0);
        fourier_terms(day, season.period, season.fourier_order, &mut terms);
        y += terms
            .iter()
            .zip(&params[col..col + width])
            .map(|(x, b)| x * b)
            .sum::<f64>();
        col += width;
    }
    y
}

/// Predict in scaled units.
pub fn predict(layout: &DesignLayout, params: &[f64], t: f64, day: f64) -> f64 {
    trend(layout, params, t) + seasonal(layout, params, day)
}
