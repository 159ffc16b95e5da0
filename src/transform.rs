//! Sequence-to-sequence channel transforms.
//!
//! All transforms take a single channel's series ordered by time ascending
//! and return a series of the same length. The orchestrator applies them in
//! a fixed order per channel: adstock, then lag, then a saturation curve.

use crate::defaults::{
    DEFAULT_EXP_DECAY, DEFAULT_POWER, DEFAULT_SCURVE_ALPHA, DEFAULT_SCURVE_GAMMA,
};
use crate::types::SaturationCurve;

/// Geometric adstock: `y[0] = x[0]`, `y[i] = x[i] + rate * y[i-1]`.
///
/// Models the lingering carryover of advertising into later periods. A rate
/// of zero is the identity.
pub fn adstock(values: &[f64], rate: f64) -> Vec<f64> {
    if rate == 0.0 {
        return values.to_vec();
    }

    let mut out = values.to_vec();
    for i in 1..out.len() {
        out[i] = values[i] + rate * out[i - 1];
    }
    out
}

/// Shift right by `periods`, zero-filling the head. `periods == 0` is the identity.
pub fn lag(values: &[f64], periods: usize) -> Vec<f64> {
    if periods == 0 {
        return values.to_vec();
    }

    let mut out = vec![0.0; values.len()];
    for i in periods..values.len() {
        out[i] = values[i - periods];
    }
    out
}

/// `ln(x + 1)` for positive values, `0.0` otherwise.
pub fn log_transform(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v > 0.0 { (v + 1.0).ln() } else { 0.0 })
        .collect()
}

/// Logistic-like saturation on the max-normalized series:
/// `n^alpha / (n^alpha + gamma^alpha)`. All-zero output when the series
/// maximum is zero. `gamma` sets the inflection point, `alpha` the steepness.
pub fn s_curve(values: &[f64], alpha: f64, gamma: f64) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || max == 0.0 {
        return vec![0.0; values.len()];
    }

    let gamma_pow = gamma.powf(alpha);
    values
        .iter()
        .map(|&v| {
            let n = (v / max).powf(alpha);
            n / (n + gamma_pow)
        })
        .collect()
}

/// `1 - exp(-decay * x)`: monotone diminishing returns bounded by 1.
pub fn negative_exponential(values: &[f64], decay: f64) -> Vec<f64> {
    values.iter().map(|&v| 1.0 - (-decay * v).exp()).collect()
}

/// `x^power` for positive values, `0.0` otherwise.
pub fn power_transform(values: &[f64], power: f64) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v > 0.0 { v.powf(power) } else { 0.0 })
        .collect()
}

impl SaturationCurve {
    /// Apply this curve with the engine's standard shape parameters.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        match self {
            SaturationCurve::Log => log_transform(values),
            SaturationCurve::SCurve => {
                s_curve(values, DEFAULT_SCURVE_ALPHA, DEFAULT_SCURVE_GAMMA)
            }
            SaturationCurve::NegativeExponential => {
                negative_exponential(values, DEFAULT_EXP_DECAY)
            }
            SaturationCurve::Power => power_transform(values, DEFAULT_POWER),
        }
    }
}
