//! Prediction intervals by simulation.
//!
//! Each simulated path keeps the fitted seasonality and history trend, adds
//! fresh trend changepoints beyond the end of the history, and then adds
//! observation noise to every row:
//!
//! - changepoint count ~ `Poisson(C · (T - 1))`, where `C` is the number of
//!   fitted changepoints and `T` the largest requested scaled time
//! - locations ~ `Uniform(1, T)`
//! - slope changes ~ `Laplace(0, mean |δ|)`
//! - noise ~ `Normal(0, σ_obs)`
//!
//! The interval bounds are percentiles of the simulated values. The RNG is
//! seeded from the model config, so identical inputs give identical bounds.
//!
//! Per path, the sampled changes are sorted by location and folded into a
//! running slope and offset while walking the rows in time order, so a path
//! costs `O(rows + changes log changes)` however long the horizon is.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Exp1, Normal, Poisson};

use crate::error::AppError;
use crate::fit::fitter::FittedModel;
use crate::math::{mean, percentiles};
use crate::models::predict;

/// Keeps the Laplace scale positive when every fitted slope change is zero.
const LAPLACE_SCALE_EPS: f64 = 1e-8;

/// Simulate `(lower, upper)` bounds in original units for each requested row.
///
/// `t` and `days` are the scaled times and epoch days of the rows.
pub fn simulate_intervals(
    model: &FittedModel,
    t: &[f64],
    days: &[f64],
) -> Result<Vec<(f64, f64)>, AppError> {
    let layout = &model.layout;
    let base: Vec<f64> = t
        .iter()
        .zip(days.iter())
        .map(|(&ti, &di)| predict(layout, &model.params, ti, di))
        .collect();

    let n_samples = model.config.uncertainty_samples;
    if n_samples == 0 {
        return Ok(base.iter().map(|&b| (b * model.y_scale, b * model.y_scale)).collect());
    }

    let mut rng = StdRng::seed_from_u64(model.config.seed);
    let noise = Normal::new(0.0, model.sigma_obs)
        .map_err(|e| AppError::model(format!("Noise distribution error: {e}")))?;

    let deltas: Vec<f64> = model.params[layout.delta_range()].iter().map(|d| d.abs()).collect();
    let laplace_scale = mean(&deltas).unwrap_or(0.0) + LAPLACE_SCALE_EPS;

    let t_max = t.iter().copied().fold(1.0_f64, f64::max);
    let change_rate = layout.changepoints.len() as f64 * (t_max - 1.0);
    let change_count = if change_rate > 0.0 {
        Some(
            Poisson::new(change_rate)
                .map_err(|e| AppError::model(format!("Changepoint distribution error: {e}")))?,
        )
    } else {
        None
    };

    let mut order: Vec<usize> = (0..t.len()).collect();
    order.sort_by(|&a, &b| t[a].total_cmp(&t[b]));

    let mut draws: Vec<Vec<f64>> = (0..t.len()).map(|_| Vec::with_capacity(n_samples)).collect();
    let mut changes: Vec<(f64, f64)> = Vec::new();
    let mut extra = vec![0.0; t.len()];

    for _ in 0..n_samples {
        changes.clear();
        if let Some(dist) = &change_count {
            let k = dist.sample(&mut rng) as usize;
            for _ in 0..k {
                let location = rng.gen_range(1.0..t_max);
                let e1: f64 = rng.sample(Exp1);
                let e2: f64 = rng.sample(Exp1);
                changes.push((location, laplace_scale * (e1 - e2)));
            }
        }

        changes.sort_by(|a, b| a.0.total_cmp(&b.0));
        accumulate_changes(t, &order, &changes, &mut extra);

        for ((row, &b), &e) in draws.iter_mut().zip(base.iter()).zip(extra.iter()) {
            row.push(b + e + noise.sample(&mut rng));
        }
    }

    let (lo_q, hi_q) = model.config.interval_percentiles();
    draws
        .into_iter()
        .map(|mut row| {
            let q = percentiles(&mut row, &[lo_q, hi_q])
                .ok_or_else(|| AppError::model("Empty uncertainty sample."))?;
            Ok((q[0] * model.y_scale, q[1] * model.y_scale))
        })
        .collect()
}

/// Trend shift `Σ δ · (t - s)_+` for every row.
///
/// `changes` must be sorted by location `s`; `order` lists row indexes by
/// ascending `t`.
fn accumulate_changes(t: &[f64], order: &[usize], changes: &[(f64, f64)], out: &mut [f64]) {
    let mut next = 0;
    let mut slope = 0.0;
    let mut offset = 0.0;
    for &i in order {
        while let Some(&(s, d)) = changes.get(next) {
            if s >= t[i] {
                break;
            }
            slope += d;
            offset += d * s;
            next += 1;
        }
        out[i] = slope * t[i] - offset;
    }
}
