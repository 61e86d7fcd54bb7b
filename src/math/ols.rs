//! Ordinary least squares for the linear-trend forecaster.
//!
//! We fit `y_i = b0 + b1 * x_i` by building the `n x 2` design matrix and
//! solving it with SVD. (Nalgebra's `QR::solve` is intended for square
//! systems and will panic for tall matrices.)

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

/// Fit a straight line through `(xs[i], ys[i])`, returning `(intercept, slope)`.
///
/// Needs at least two points with distinct x values.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }

    let x = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { xs[r] });
    let y = DVector::from_column_slice(ys);
    let beta = solve_least_squares(&x, &y)?;
    Some((beta[0], beta[1]))
}
