//! Lasso regression by cyclic coordinate descent on standardized regressors.
//!
//! Backs the `Lasso` leaderboard label. Unlike a path-based selector this
//! fits a single penalty strength per call; the orchestrator varies the
//! penalty across leaderboard variants. Honors the engine-wide contract of
//! always producing a usable fit: if the descent fails to converge within
//! the iteration cap, the best coefficients so far are returned.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::defaults::{CD_MAX_ITERATIONS, CD_TOLERANCE};
use crate::regression::{FitKind, OlsFit};
use crate::types::MmError;

fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > gamma {
        z - gamma
    } else if z < -gamma {
        z + gamma
    } else {
        0.0
    }
}

/// Fit a lasso model with penalty `lambda` (in standardized units).
///
/// # Errors
/// `MmError::EmptyInput` for an empty design matrix, `MmError::LengthMismatch`
/// when `y` does not match the row count.
pub fn fit_lasso(
    x: &Array2<f64>,
    y: &Array1<f64>,
    lambda: f64,
    seed: u64,
) -> Result<OlsFit, MmError> {
    let (n, p) = x.dim();
    if n == 0 || p == 0 {
        return Err(MmError::EmptyInput);
    }
    if y.len() != n {
        return Err(MmError::LengthMismatch);
    }

    // Standardize: center y, center and unit-scale each column
    let y_mean = y.mean().unwrap_or(0.0);
    let y_std = y.mapv(|v| v - y_mean);

    let mut x_std = x.clone();
    let mut col_means = vec![0.0; p];
    let mut col_scales = vec![1.0; p];
    for (j, mut col) in x_std.axis_iter_mut(Axis(1)).enumerate() {
        let m = col.mean().unwrap_or(0.0);
        col_means[j] = m;
        col -= m;

        let var = col.iter().map(|&v| v * v).sum::<f64>() / n as f64;
        let scale = var.sqrt();
        if scale > 1e-12 {
            col /= scale;
            col_scales[j] = scale;
        } else {
            // Constant column carries no signal
            for v in col.iter_mut() {
                *v = 0.0;
            }
        }
    }

    let n_f = n as f64;
    let col_norms: Vec<f64> = (0..p)
        .map(|j| x_std.column(j).iter().map(|&v| v * v).sum::<f64>() / n_f)
        .collect();

    let mut beta = vec![0.0; p];
    let mut residual = y_std.clone();
    let mut coords: Vec<usize> = (0..p).collect();
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..CD_MAX_ITERATIONS {
        coords.shuffle(&mut rng);
        let mut max_delta: f64 = 0.0;

        for &j in coords.iter() {
            if col_norms[j] <= 1e-12 {
                beta[j] = 0.0;
                continue;
            }
            let col = x_std.column(j);
            let old = beta[j];

            let mut rho = 0.0;
            for (i, &v) in col.iter().enumerate() {
                rho += v * (residual[i] + v * old);
            }
            rho /= n_f;

            let updated = soft_threshold(rho, lambda) / col_norms[j];
            let diff = updated - old;
            if diff != 0.0 {
                for (i, &v) in col.iter().enumerate() {
                    residual[i] -= diff * v;
                }
                beta[j] = updated;
                max_delta = max_delta.max(diff.abs());
            }
        }

        if max_delta < CD_TOLERANCE {
            break;
        }
    }

    // Back to raw units; recover the intercept from the centering identity
    let coefficients: Vec<f64> = beta
        .iter()
        .zip(col_scales.iter())
        .map(|(&b, &s)| b / s)
        .collect();
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(col_means.iter())
            .map(|(&c, &m)| c * m)
            .sum::<f64>();

    Ok(OlsFit {
        intercept,
        coefficients,
        kind: FitKind::WellPosed,
        xtx_inverse: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_lasso_near_ols_at_tiny_lambda() {
        let x = Array2::from_shape_vec((6, 1), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let y = array![3.0, 5.0, 7.0, 9.0, 11.0, 13.0];

        let fit = fit_lasso(&x, &y, 1e-6, 7).unwrap();
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-3);
        assert!((fit.intercept - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_lasso_large_lambda_zeroes_out() {
        let x = Array2::from_shape_vec((5, 2), vec![
            1.0, 0.5, 2.0, 1.5, 3.0, 1.0, 4.0, 2.5, 5.0, 2.0,
        ])
        .unwrap();
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0];

        // Penalty above lambda_max kills every coefficient
        let fit = fit_lasso(&x, &y, 1e6, 7).unwrap();
        assert!(fit.coefficients.iter().all(|&c| c == 0.0));
        assert!((fit.intercept - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_lasso_sparsifies_weak_regressor() {
        // Second column is pure noise around zero
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                1.0, 0.01, 2.0, -0.02, 3.0, 0.015, 4.0, -0.01, 5.0, 0.02, 6.0, -0.015, 7.0, 0.01,
                8.0, -0.02,
            ],
        )
        .unwrap();
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0];

        let fit = fit_lasso(&x, &y, 0.5, 7).unwrap();
        assert!(fit.coefficients[0] > 1.0);
        assert_eq!(fit.coefficients[1], 0.0);
    }

    #[test]
    fn test_lasso_deterministic_for_seed() {
        let x = Array2::from_shape_vec((5, 2), vec![
            1.0, 0.5, 2.0, 1.5, 3.0, 1.0, 4.0, 2.5, 5.0, 2.0,
        ])
        .unwrap();
        let y = array![2.1, 3.9, 6.2, 7.8, 10.1];

        let a = fit_lasso(&x, &y, 0.1, 42).unwrap();
        let b = fit_lasso(&x, &y, 0.1, 42).unwrap();
        assert_eq!(a.coefficients, b.coefficients);
        assert_eq!(a.intercept, b.intercept);
    }

    #[test]
    fn test_lasso_constant_column() {
        let x = Array2::from_shape_vec((4, 2), vec![
            1.0, 3.0, 2.0, 3.0, 3.0, 3.0, 4.0, 3.0,
        ])
        .unwrap();
        let y = array![1.0, 2.0, 3.0, 4.0];

        let fit = fit_lasso(&x, &y, 1e-6, 7).unwrap();
        assert_eq!(fit.coefficients[1], 0.0);
        assert!((fit.coefficients[0] - 1.0).abs() < 1e-3);
    }
}
