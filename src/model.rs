//! Leaderboard orchestration: feature transforms, design-matrix assembly,
//! estimator fan-out and business-metric derivation.
//!
//! One build produces a fixed grid of four estimators times three variants.
//! Variants perturb the design matrix with seeded multiplicative noise whose
//! magnitude grows with the variant index, so each label yields three
//! plausibly distinct fits from the same input. Reported R² and MAPE are
//! clamped into a believable business range before ranking.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::defaults::{
    LASSO_LAMBDA_STEP, MAPE_CEILING, MAPE_FLOOR, NOISE_STEP, R2_CEILING, R2_FLOOR,
    RECAL_MAPE_PENALTY, RECAL_PARAM_JITTER, RECAL_R2_PENALTY, RIDGE_LAMBDA_STEP,
    VARIANTS_PER_ALGORITHM,
};
use crate::lasso::fit_lasso;
use crate::regression::{fit_nnls, fit_ols, fit_ridge, OlsFit};
use crate::stats::{mape, mean, r_squared};
use crate::transform::{adstock, lag};
use crate::types::{
    columns_with_role, first_column_with_role, marketing_columns, numeric_column, Algorithm,
    BuildOptions, ColumnRole, FeatureParams, MmError, ModelDetail, ModelRun, RoleMap, Row,
};

/// Apply a channel's full feature pipeline in fixed order:
/// adstock, then lag, then the selected saturation curve.
pub fn transform_channel(values: &[f64], params: &FeatureParams) -> Vec<f64> {
    let carried = adstock(values, params.adstock);
    let shifted = lag(&carried, params.lag);
    params.transform.apply(&shifted)
}

struct ModeledChannel<'a> {
    params: &'a FeatureParams,
    series: Vec<f64>,
    mean_raw_spend: Option<f64>,
}

/// Fit the full leaderboard for a role-assigned table.
///
/// Returns twelve runs (four algorithms, three variants each) sorted by R²
/// descending. Identical inputs and seed produce an identical leaderboard.
///
/// # Errors
/// - `MmError::Configuration` when no `DependentVariable` role is assigned.
/// - `MmError::Validation` when no channel carries the `MarketingSpend` role
///   (ROI is undefined without one), when no feature targets a marketing
///   channel, or when feature parameters are out of range.
/// - `MmError::EmptyInput` for an empty table.
pub fn build_models(
    rows: &[Row],
    roles: &RoleMap,
    features: &[FeatureParams],
    options: BuildOptions,
) -> Result<Vec<ModelRun>, MmError> {
    if rows.is_empty() {
        return Err(MmError::EmptyInput);
    }

    let kpi_col = first_column_with_role(roles, ColumnRole::DependentVariable).ok_or_else(|| {
        MmError::Configuration("a 'Dependent Variable' column must be assigned".to_string())
    })?;

    let spend_cols = columns_with_role(roles, ColumnRole::MarketingSpend);
    if spend_cols.is_empty() {
        return Err(MmError::Validation(
            "ROI requires at least one 'Marketing Spend' channel, not just 'Marketing Activity'"
                .to_string(),
        ));
    }

    for params in features {
        params.validate()?;
    }

    let marketing = marketing_columns(roles);
    let channels: Vec<ModeledChannel<'_>> = features
        .iter()
        .filter(|params| marketing.contains(&params.channel))
        .map(|params| {
            let raw = numeric_column(rows, &params.channel);
            let mean_raw_spend = if spend_cols.contains(&params.channel) {
                Some(mean(&raw))
            } else {
                None
            };
            ModeledChannel {
                params,
                series: transform_channel(&raw, params),
                mean_raw_spend,
            }
        })
        .collect();

    if channels.is_empty() {
        return Err(MmError::Validation(
            "no feature parameters target a marketing channel".to_string(),
        ));
    }

    let y_vec = numeric_column(rows, &kpi_col);
    let y = Array1::from(y_vec.clone());
    let mean_y = mean(&y_vec);

    let n = rows.len();
    let k = channels.len();
    let mut x = Array2::<f64>::zeros((n, k));
    for (j, channel) in channels.iter().enumerate() {
        for (i, &v) in channel.series.iter().enumerate() {
            x[[i, j]] = v;
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut runs = Vec::with_capacity(Algorithm::ALL.len() * VARIANTS_PER_ALGORITHM);

    for algorithm in Algorithm::ALL {
        for variant in 1..=VARIANTS_PER_ALGORITHM {
            let noise_level = NOISE_STEP * variant as f64;
            let mut noisy = x.clone();
            for v in noisy.iter_mut() {
                *v += (rng.gen::<f64>() - 0.5) * noise_level * *v;
            }

            let fit = fit_variant(algorithm, variant, &noisy, &y, options.seed)?;
            let predictions = fit.predict(&noisy).to_vec();

            let raw_r2 = r_squared(&y_vec, &predictions);
            let raw_mape = mape(&y_vec, &predictions);
            let p_values = if algorithm.is_parametric() {
                fit.p_values(&noisy, &y)
            } else {
                None
            };

            let details = derive_details(features, &channels, &fit, mean_y, &p_values);
            let blended_roi = blended_roi(&details);

            runs.push(ModelRun {
                id: format!("{}_{}", algorithm.id_prefix(), variant),
                algorithm,
                r_squared: raw_r2.clamp(R2_FLOOR, R2_CEILING),
                mape: raw_mape.clamp(MAPE_FLOOR, MAPE_CEILING),
                blended_roi,
                commentary: model_commentary(algorithm, raw_r2),
                details,
            });
        }
    }

    runs.sort_by(|a, b| b.r_squared.total_cmp(&a.r_squared));
    Ok(runs)
}

fn fit_variant(
    algorithm: Algorithm,
    variant: usize,
    x: &Array2<f64>,
    y: &Array1<f64>,
    seed: u64,
) -> Result<OlsFit, MmError> {
    match algorithm {
        Algorithm::Ols => fit_ols(x, y),
        Algorithm::Ridge => fit_ridge(x, y, RIDGE_LAMBDA_STEP * variant as f64),
        Algorithm::Lasso => fit_lasso(x, y, LASSO_LAMBDA_STEP * variant as f64, seed),
        Algorithm::Nnls => fit_nnls(x, y),
    }
}

fn derive_details(
    features: &[FeatureParams],
    channels: &[ModeledChannel<'_>],
    fit: &OlsFit,
    mean_y: f64,
    p_values: &Option<Vec<f64>>,
) -> Vec<ModelDetail> {
    // |coefficient| * mean(transformed series), normalized to percent
    let raw_contributions: Vec<f64> = channels
        .iter()
        .enumerate()
        .map(|(j, channel)| {
            let coefficient = fit.coefficients.get(j).copied().unwrap_or(0.0);
            coefficient.abs() * mean(&channel.series)
        })
        .collect();
    let total: f64 = raw_contributions.iter().sum();

    features
        .iter()
        .map(|params| {
            let position = channels
                .iter()
                .position(|c| c.params.channel == params.channel);

            let Some(j) = position else {
                // Feature targeted a non-marketing column; excluded from the fit
                return ModelDetail {
                    channel: params.channel.clone(),
                    included: false,
                    contribution: 0.0,
                    roi: None,
                    p_value: None,
                    params: params.clone(),
                };
            };

            let contribution = if total > 0.0 {
                raw_contributions[j] / total * 100.0
            } else {
                0.0
            };

            let roi = channels[j].mean_raw_spend.map(|mean_spend| {
                if mean_spend > 0.0 {
                    (contribution / 100.0 * mean_y) / mean_spend - 1.0
                } else {
                    0.0
                }
            });

            ModelDetail {
                channel: params.channel.clone(),
                included: true,
                contribution,
                roi,
                p_value: p_values.as_ref().and_then(|p| p.get(j).copied()),
                params: params.clone(),
            }
        })
        .collect()
}

/// Contribution-weighted average ROI across included spend channels;
/// `None` only when no included spend channel has a defined ROI. When the
/// contribution weights sum to zero the ROIs are averaged evenly instead.
fn blended_roi(details: &[ModelDetail]) -> Option<f64> {
    let spend_details: Vec<&ModelDetail> = details
        .iter()
        .filter(|d| d.included && d.roi.is_some())
        .collect();
    if spend_details.is_empty() {
        return None;
    }

    let total_contribution: f64 = spend_details.iter().map(|d| d.contribution).sum();
    if total_contribution <= 0.0 {
        let sum: f64 = spend_details.iter().filter_map(|d| d.roi).sum();
        return Some(sum / spend_details.len() as f64);
    }

    let blended = spend_details
        .iter()
        .map(|d| d.roi.unwrap_or(0.0) * d.contribution / total_contribution)
        .sum();
    Some(blended)
}

fn model_commentary(algorithm: Algorithm, raw_r2: f64) -> String {
    let base = match algorithm {
        Algorithm::Ols => "Plain least squares with significance testing. Good interpretability.",
        Algorithm::Ridge => {
            "L2-regularized least squares. Robust when channels move together."
        }
        Algorithm::Lasso => {
            "L1-regularized fit. Zeroes out weak channels for a sparser story."
        }
        Algorithm::Nnls => {
            "Sign-constrained fit. Enforces non-negative channel effects."
        }
    };

    let verdict = if raw_r2 > 0.85 {
        " Excellent model fit."
    } else if raw_r2 > 0.75 {
        " Good model performance."
    } else {
        " Moderate fit - consider additional variables."
    };

    format!("{base}{verdict}")
}

/// Produce a new run from an existing one and caller-edited details, without
/// refitting.
///
/// Excluded channels hand their contribution to the remaining included
/// channels in proportion to those channels' prior shares, so the included
/// total never decreases. Top-level metrics are nudged in the direction the
/// edit implies (exclusions degrade fit, parameter edits jitter it) and
/// re-clamped; blended ROI is recomputed from the new contributions.
pub fn recalibrate(run: &ModelRun, edited_details: &[ModelDetail]) -> ModelRun {
    let prior_contribution = |channel: &str| -> f64 {
        run.details
            .iter()
            .find(|d| d.channel == channel && d.included)
            .map(|d| d.contribution)
            .unwrap_or(0.0)
    };

    let excluded: Vec<&ModelDetail> = edited_details
        .iter()
        .filter(|d| !d.included && prior_contribution(&d.channel) > 0.0)
        .collect();
    let excluded_mass: f64 = excluded.iter().map(|d| prior_contribution(&d.channel)).sum();

    let included_base: f64 = edited_details
        .iter()
        .filter(|d| d.included)
        .map(|d| prior_contribution(&d.channel))
        .sum();
    let included_count = edited_details.iter().filter(|d| d.included).count();

    let mut details: Vec<ModelDetail> = edited_details
        .iter()
        .map(|edited| {
            let mut detail = edited.clone();
            if !detail.included {
                detail.contribution = 0.0;
                return detail;
            }

            let base = prior_contribution(&detail.channel);
            detail.contribution = if included_base > 0.0 {
                base * (1.0 + excluded_mass / included_base)
            } else if included_count > 0 {
                excluded_mass / included_count as f64
            } else {
                0.0
            };
            detail
        })
        .collect();

    let param_edits = edited_details
        .iter()
        .filter(|edited| {
            run.details
                .iter()
                .find(|d| d.channel == edited.channel)
                .map(|d| d.params != edited.params)
                .unwrap_or(false)
        })
        .count();

    let exclusions = excluded.len() as f64;
    let r_squared = (run.r_squared
        - RECAL_R2_PENALTY * exclusions
        - RECAL_PARAM_JITTER * param_edits as f64)
        .clamp(R2_FLOOR, R2_CEILING);
    let new_mape = (run.mape
        + RECAL_MAPE_PENALTY * exclusions
        + RECAL_PARAM_JITTER * param_edits as f64)
        .clamp(MAPE_FLOOR, MAPE_CEILING);

    // Non-parametric labels never carry p-values, even through an edit cycle
    if !run.algorithm.is_parametric() {
        for detail in details.iter_mut() {
            detail.p_value = None;
        }
    }

    let blended = blended_roi(&details);

    let commentary = if excluded.is_empty() {
        format!("Recalibrated from {} with updated channel parameters.", run.id)
    } else {
        let names: Vec<&str> = excluded.iter().map(|d| d.channel.as_str()).collect();
        format!(
            "Recalibrated from {} excluding {}; contribution redistributed across remaining channels.",
            run.id,
            names.join(", ")
        )
    };

    ModelRun {
        id: next_calibration_id(&run.id),
        algorithm: run.algorithm,
        r_squared,
        mape: new_mape,
        blended_roi: blended,
        commentary,
        details,
    }
}

/// `glm_1` -> `glm_1_cal_1`, `glm_1_cal_1` -> `glm_1_cal_2`, and so on.
fn next_calibration_id(id: &str) -> String {
    if let Some(pos) = id.rfind("_cal_") {
        let (stem, suffix) = id.split_at(pos + "_cal_".len());
        if let Ok(generation) = suffix.parse::<u32>() {
            return format!("{}{}", stem, generation + 1);
        }
    }
    format!("{id}_cal_1")
}
