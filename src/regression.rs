//! Ordinary least squares via the normal equations.
//!
//! The solver prepends an intercept column, forms `XᵗX` and inverts it with
//! Gauss–Jordan elimination under partial pivoting. When the pivot magnitude
//! falls below [`PIVOT_EPSILON`](crate::defaults::PIVOT_EPSILON), expected
//! with highly collinear channels, the fit degrades to a fixed fallback
//! (intercept = mean(y), every coefficient = 0.1) instead of erroring, so the
//! pipeline always returns a usable model. The two outcomes are distinguished
//! by [`FitKind`].

use ndarray::{s, Array1, Array2};

use crate::defaults::{FALLBACK_COEFFICIENT, PIVOT_EPSILON};
use crate::stats::normal_cdf;
use crate::types::MmError;

/// Whether the normal equations were solvable or the fallback was taken.
/// Metrics derived from a `Degenerate` fit should be treated as low-confidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitKind {
    WellPosed,
    Degenerate,
}

/// A fitted linear model.
#[derive(Clone, Debug)]
pub struct OlsFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub kind: FitKind,
    /// `(XᵗX)⁻¹` including the intercept row/column; absent for degenerate fits.
    pub(crate) xtx_inverse: Option<Array2<f64>>,
}

impl OlsFit {
    /// Row-wise `intercept + Σ coefficient_j * x[:, j]`.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let mut predictions = Array1::from_elem(x.nrows(), self.intercept);
        for (j, &coef) in self.coefficients.iter().enumerate() {
            if j >= x.ncols() {
                break;
            }
            for (i, &v) in x.column(j).iter().enumerate() {
                predictions[i] += coef * v;
            }
        }
        predictions
    }

    /// Two-sided coefficient p-values from t statistics under a normal
    /// approximation. `None` for degenerate fits or when the residual
    /// degrees of freedom are exhausted.
    pub fn p_values(&self, x: &Array2<f64>, y: &Array1<f64>) -> Option<Vec<f64>> {
        let inverse = self.xtx_inverse.as_ref()?;
        let n = x.nrows();
        let p = self.coefficients.len();
        if n <= p + 1 {
            return None;
        }

        let predictions = self.predict(x);
        let ss_res: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(&a, &f)| (a - f).powi(2))
            .sum();
        let sigma_sq = ss_res / (n - p - 1) as f64;

        let mut p_values = Vec::with_capacity(p);
        for (j, &coef) in self.coefficients.iter().enumerate() {
            // Offset by one: index 0 of the inverse is the intercept
            let variance = sigma_sq * inverse[[j + 1, j + 1]];
            if variance <= 0.0 {
                p_values.push(1.0);
                continue;
            }
            let t = coef / variance.sqrt();
            p_values.push(2.0 * (1.0 - normal_cdf(t.abs())));
        }
        Some(p_values)
    }
}

/// Fit `y = intercept + X β` by solving `β = (XᵗX)⁻¹ Xᵗy`.
///
/// Never fails on singular input; see the module docs for the fallback.
///
/// # Errors
/// `MmError::EmptyInput` for an empty design matrix, `MmError::LengthMismatch`
/// when `y` does not match the row count.
pub fn fit_ols(x: &Array2<f64>, y: &Array1<f64>) -> Result<OlsFit, MmError> {
    let (n, p) = x.dim();
    if n == 0 || p == 0 {
        return Err(MmError::EmptyInput);
    }
    if y.len() != n {
        return Err(MmError::LengthMismatch);
    }

    // [1 | X]
    let mut design = Array2::<f64>::ones((n, p + 1));
    design.slice_mut(s![.., 1..]).assign(x);

    Ok(solve_normal_equations(&design, y, y.mean().unwrap_or(0.0), p))
}

/// Ridge regression by Tikhonov augmentation: appending `sqrt(λ)` penalty
/// rows turns `min ||Xβ - y||² + λ||β||²` into plain least squares. The
/// penalty rows keep the intercept column at zero, so only the channel
/// coefficients shrink.
///
/// # Errors
/// Same as [`fit_ols`].
pub fn fit_ridge(x: &Array2<f64>, y: &Array1<f64>, lambda: f64) -> Result<OlsFit, MmError> {
    if lambda <= 0.0 {
        return fit_ols(x, y);
    }

    let (n, p) = x.dim();
    if n == 0 || p == 0 {
        return Err(MmError::EmptyInput);
    }
    if y.len() != n {
        return Err(MmError::LengthMismatch);
    }

    // [1 | X] over the data rows, then one penalty row per coefficient
    let mut design = Array2::<f64>::zeros((n + p, p + 1));
    design.slice_mut(s![..n, 0]).fill(1.0);
    design.slice_mut(s![..n, 1..]).assign(x);
    let sqrt_lambda = lambda.sqrt();
    for j in 0..p {
        design[[n + j, j + 1]] = sqrt_lambda;
    }

    let mut targets = Array1::<f64>::zeros(n + p);
    targets.slice_mut(s![..n]).assign(y);

    Ok(solve_normal_equations(&design, &targets, y.mean().unwrap_or(0.0), p))
}

fn solve_normal_equations(
    design: &Array2<f64>,
    targets: &Array1<f64>,
    fallback_intercept: f64,
    p: usize,
) -> OlsFit {
    let xt = design.t();
    let xtx = xt.dot(design);
    let xty = xt.dot(targets);

    match invert_gauss_jordan(&xtx) {
        Some(inverse) => {
            let beta = inverse.dot(&xty);
            OlsFit {
                intercept: beta[0],
                coefficients: beta.iter().skip(1).copied().collect(),
                kind: FitKind::WellPosed,
                xtx_inverse: Some(inverse),
            }
        }
        None => OlsFit {
            intercept: fallback_intercept,
            coefficients: vec![FALLBACK_COEFFICIENT; p],
            kind: FitKind::Degenerate,
            xtx_inverse: None,
        },
    }
}

/// Gauss–Jordan inversion with partial pivoting. `None` when a pivot drops
/// below [`PIVOT_EPSILON`], i.e. the matrix is numerically singular.
fn invert_gauss_jordan(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let k = matrix.nrows();
    if matrix.ncols() != k {
        return None;
    }

    // Augment [M | I]
    let mut aug = Array2::<f64>::zeros((k, 2 * k));
    aug.slice_mut(s![.., ..k]).assign(matrix);
    for i in 0..k {
        aug[[i, k + i]] = 1.0;
    }

    for i in 0..k {
        // Partial pivot: largest absolute value in column i among remaining rows
        let mut max_row = i;
        for r in (i + 1)..k {
            if aug[[r, i]].abs() > aug[[max_row, i]].abs() {
                max_row = r;
            }
        }
        if max_row != i {
            for c in 0..2 * k {
                aug.swap([i, c], [max_row, c]);
            }
        }

        let pivot = aug[[i, i]];
        if pivot.abs() < PIVOT_EPSILON {
            return None;
        }

        for c in 0..2 * k {
            aug[[i, c]] /= pivot;
        }

        for r in 0..k {
            if r == i {
                continue;
            }
            let factor = aug[[r, i]];
            if factor == 0.0 {
                continue;
            }
            for c in 0..2 * k {
                aug[[r, c]] -= factor * aug[[i, c]];
            }
        }
    }

    Some(aug.slice(s![.., k..]).to_owned())
}

/// Non-negative least squares by projection: fit OLS, clip negative
/// coefficients to zero, then re-center the intercept on the clipped model's
/// mean residual so predictions stay unbiased.
pub fn fit_nnls(x: &Array2<f64>, y: &Array1<f64>) -> Result<OlsFit, MmError> {
    let mut fit = fit_ols(x, y)?;
    if fit.kind == FitKind::Degenerate {
        return Ok(fit);
    }

    let clipped = fit.coefficients.iter().any(|&c| c < 0.0);
    if !clipped {
        return Ok(fit);
    }

    for coef in fit.coefficients.iter_mut() {
        if *coef < 0.0 {
            *coef = 0.0;
        }
    }

    let mut residual_sum = 0.0;
    for (i, &target) in y.iter().enumerate() {
        let mut pred = 0.0;
        for (j, &coef) in fit.coefficients.iter().enumerate() {
            pred += coef * x[[i, j]];
        }
        residual_sum += target - pred;
    }
    fit.intercept = residual_sum / y.len() as f64;
    // Clipping invalidates the covariance-based significance path
    fit.xtx_inverse = None;

    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ols_recovers_line() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = array![2.0, 4.0, 6.0, 8.0];

        let fit = fit_ols(&x, &y).unwrap();
        assert_eq!(fit.kind, FitKind::WellPosed);
        assert!(fit.intercept.abs() < 1e-8);
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-8);

        let predictions = fit.predict(&x);
        let r2 = crate::stats::r_squared(
            y.as_slice().unwrap(),
            predictions.as_slice().unwrap(),
        );
        assert!((r2 - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_ols_with_intercept() {
        let x = Array2::from_shape_vec((5, 1), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let y = array![5.0, 7.0, 9.0, 11.0, 13.0];

        let fit = fit_ols(&x, &y).unwrap();
        assert!((fit.intercept - 3.0).abs() < 1e-8);
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn test_ols_two_regressors() {
        // y = 1 + 2*a + 3*b
        let x = Array2::from_shape_vec(
            (5, 2),
            vec![1.0, 1.0, 2.0, 1.0, 3.0, 2.0, 4.0, 5.0, 5.0, 3.0],
        )
        .unwrap();
        let y = array![6.0, 8.0, 13.0, 24.0, 20.0];

        let fit = fit_ols(&x, &y).unwrap();
        assert!((fit.intercept - 1.0).abs() < 1e-7);
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-7);
        assert!((fit.coefficients[1] - 3.0).abs() < 1e-7);
    }

    #[test]
    fn test_singular_matrix_falls_back() {
        // Duplicate columns make X'X singular
        let x = Array2::from_shape_vec(
            (4, 2),
            vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0],
        )
        .unwrap();
        let y = array![2.0, 4.0, 6.0, 8.0];

        let fit = fit_ols(&x, &y).unwrap();
        assert_eq!(fit.kind, FitKind::Degenerate);
        assert!((fit.intercept - 5.0).abs() < 1e-12);
        assert_eq!(fit.coefficients, vec![FALLBACK_COEFFICIENT; 2]);
        assert!(fit.p_values(&x, &y).is_none());
    }

    #[test]
    fn test_predict_shape_and_values() {
        let fit = OlsFit {
            intercept: 1.0,
            coefficients: vec![2.0, -1.0],
            kind: FitKind::WellPosed,
            xtx_inverse: None,
        };
        let x = Array2::from_shape_vec((2, 2), vec![1.0, 1.0, 3.0, 2.0]).unwrap();
        let predictions = fit.predict(&x);
        assert_eq!(predictions.len(), 2);
        assert!((predictions[0] - 2.0).abs() < 1e-12);
        assert!((predictions[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_p_values_significant_regressor() {
        // Strong linear signal with mild curvature: slope should be significant
        let n = 20;
        let x = Array2::from_shape_vec(
            (n, 1),
            (0..n).map(|i| i as f64).collect::<Vec<_>>(),
        )
        .unwrap();
        let y = Array1::from(
            (0..n)
                .map(|i| 3.0 * i as f64 + if i % 2 == 0 { 0.5 } else { -0.5 })
                .collect::<Vec<_>>(),
        );

        let fit = fit_ols(&x, &y).unwrap();
        let p_values = fit.p_values(&x, &y).unwrap();
        assert_eq!(p_values.len(), 1);
        assert!(p_values[0] < 0.001);
    }

    #[test]
    fn test_ridge_zero_lambda_matches_ols() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = array![3.0, 5.0, 7.0, 9.0];

        let plain = fit_ols(&x, &y).unwrap();
        let ridge = fit_ridge(&x, &y, 0.0).unwrap();
        assert!((plain.intercept - ridge.intercept).abs() < 1e-12);
        assert!((plain.coefficients[0] - ridge.coefficients[0]).abs() < 1e-12);
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = array![2.0, 4.0, 6.0, 8.0];

        let plain = fit_ols(&x, &y).unwrap();
        let ridge = fit_ridge(&x, &y, 5.0).unwrap();
        assert!(ridge.coefficients[0].abs() < plain.coefficients[0].abs());
        // Closed form for this data with an unpenalized intercept: slope 1.0
        assert!((ridge.coefficients[0] - 1.0).abs() < 1e-8);

        // Shrinkage grows with the penalty
        let heavier = fit_ridge(&x, &y, 50.0).unwrap();
        assert!(heavier.coefficients[0].abs() < ridge.coefficients[0].abs());
    }

    #[test]
    fn test_ridge_leaves_intercept_unpenalized() {
        // Large constant offset: shrinking the slope must pull the intercept
        // up toward mean(y), never toward zero
        let x = Array2::from_shape_vec((5, 1), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let y = array![102.0, 104.0, 106.0, 108.0, 110.0];

        let fit = fit_ridge(&x, &y, 5.0).unwrap();
        assert_eq!(fit.kind, FitKind::WellPosed);
        assert!(fit.coefficients[0] < 2.0);
        assert!(fit.intercept > 100.0);
    }

    #[test]
    fn test_nnls_clips_negative_coefficients() {
        // Exact model y = a - b: plain OLS puts a negative weight on b
        let x = Array2::from_shape_vec(
            (5, 2),
            vec![1.0, 2.0, 2.0, 1.0, 3.0, 3.0, 4.0, 1.0, 5.0, 2.0],
        )
        .unwrap();
        let y = array![-1.0, 1.0, 0.0, 3.0, 3.0];

        let fit = fit_nnls(&x, &y).unwrap();
        assert_eq!(fit.kind, FitKind::WellPosed);
        for &coef in &fit.coefficients {
            assert!(coef >= 0.0);
        }
        assert_eq!(fit.coefficients[1], 0.0);
        assert!(fit.p_values(&x, &y).is_none());
    }

    #[test]
    fn test_empty_and_mismatched_inputs() {
        let x = Array2::<f64>::zeros((0, 0));
        let y = Array1::<f64>::zeros(0);
        assert!(matches!(fit_ols(&x, &y), Err(MmError::EmptyInput)));

        let x = Array2::from_shape_vec((2, 1), vec![1.0, 2.0]).unwrap();
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(fit_ols(&x, &y), Err(MmError::LengthMismatch)));
    }
}
