//! Basis functions for the additive decomposition.
//!
//! - `fourier_terms(t, period, order)` fills `[sin(2πkt/P), cos(2πkt/P)]` for
//!   `k = 1..=order`, with `t` in days since the Unix epoch.
//! - `hinge(t, s)` is the ramp `(t - s)_+` that lets the trend slope change at
//!   changepoint `s`.

use std::f64::consts::PI;

/// Fill `out` with interleaved sine/cosine terms.
///
/// # Panics
/// Panics if `out.len() < 2 * order`.
pub fn fourier_terms(t: f64, period: f64, order: usize, out: &mut [f64]) {
    for k in 0..order {
        let x = 2.0 * PI * (k as f64 + 1.0) * t / period;
        out[2 * k] = x.sin();
        out[2 * k + 1] = x.cos();
    }
}

/// Ramp function `(t - s)_+`.
pub fn hinge(t: f64, s: f64) -> f64 {
    (t - s).max(0.0)
}
