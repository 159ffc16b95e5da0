//! Numeric primitives over plain slices.
//!
//! Every function here is total: empty input, zero variance and zero
//! denominators resolve to `0.0` by convention rather than NaN or panic,
//! so downstream pipelines never have to branch on degenerate series.

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by N); `0.0` for an empty slice.
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation (stddev / mean); `0.0` when the mean is zero.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    standard_deviation(values) / m
}

/// Pearson correlation; `0.0` on length mismatch, empty input or when either
/// series has zero variance.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut numerator = 0.0;
    let mut sum_x_sq = 0.0;
    let mut sum_y_sq = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        numerator += dx * dy;
        sum_x_sq += dx * dx;
        sum_y_sq += dy * dy;
    }

    let denominator = (sum_x_sq * sum_y_sq).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Coefficient of determination `1 - SS_res / SS_tot`; `0.0` on length
/// mismatch or a constant actual series.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return 0.0;
    }

    let actual_mean = mean(actual);
    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;

    for (&a, &p) in actual.iter().zip(predicted.iter()) {
        ss_tot += (a - actual_mean).powi(2);
        ss_res += (a - p).powi(2);
    }

    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Mean absolute percentage error, in percent. Indices where `actual == 0`
/// are skipped rather than treated as infinite error; `0.0` if none remain.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return 0.0;
    }

    let mut total_error = 0.0;
    let mut count = 0usize;

    for (&a, &p) in actual.iter().zip(predicted.iter()) {
        if a != 0.0 {
            total_error += ((a - p) / a).abs();
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        total_error / count as f64 * 100.0
    }
}

/// Standard normal CDF via the Abramowitz & Stegun 7.1.26 erf polynomial.
/// Absolute error is below 1.5e-7, plenty for coefficient significance.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}
