//! Penalized least squares solver.
//!
//! The decomposition is fitted as a maximum a posteriori estimate with
//! independent Gaussian priors on each coefficient:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2 + Σ_j λ_j β_j^2
//! ```
//!
//! We solve it by stacking `sqrt(λ_j) e_j` rows under the design matrix and
//! running an ordinary SVD least-squares solve on the augmented system. With
//! any positive penalty the system has full column rank, so it stays solvable
//! even when there are more coefficients than observations.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a ridge problem with one penalty per column.
///
/// Returns `None` if `penalties` does not match the column count, any input is
/// non-finite, or the augmented solve fails.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Option<DVector<f64>> {
    let (n, p) = x.shape();
    if penalties.len() != p || y.len() != n {
        return None;
    }
    if penalties.iter().any(|l| !l.is_finite() || *l < 0.0) {
        return None;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let mut xa = DMatrix::<f64>::zeros(n + p, p);
    xa.view_mut((0, 0), (n, p)).copy_from(x);
    for (j, &lambda) in penalties.iter().enumerate() {
        xa[(n + j, j)] = lambda.sqrt();
    }

    let mut ya = DVector::<f64>::zeros(n + p);
    ya.rows_mut(0, n).copy_from(y);

    solve_least_squares(&xa, &ya)
}
