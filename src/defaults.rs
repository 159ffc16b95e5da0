//! Default constants for transforms, fitting and leaderboard generation.

/// Seed used when the caller does not supply one; keeps leaderboards reproducible.
pub const DEFAULT_SEED: u64 = 7;

/// Pivot magnitude below which the normal-equation matrix is treated as singular.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Coefficient assigned to every channel by the degenerate fallback fit.
pub const FALLBACK_COEFFICIENT: f64 = 0.1;

/// Exclusive upper bound for the adstock decay rate.
pub const MAX_ADSTOCK: f64 = 0.95;

/// Saturation curve defaults.
pub const DEFAULT_SCURVE_ALPHA: f64 = 2.0;
pub const DEFAULT_SCURVE_GAMMA: f64 = 0.5;
pub const DEFAULT_EXP_DECAY: f64 = 0.5;
pub const DEFAULT_POWER: f64 = 0.5;

/// Variants fitted per algorithm label and the multiplicative noise step
/// applied per variant index.
pub const VARIANTS_PER_ALGORITHM: usize = 3;
pub const NOISE_STEP: f64 = 0.05;

/// Hyperparameter steps per variant for the regularized estimators.
pub const RIDGE_LAMBDA_STEP: f64 = 0.1;
pub const LASSO_LAMBDA_STEP: f64 = 0.05;

/// Reported metric clamps keeping leaderboard figures in a plausible range.
pub const R2_FLOOR: f64 = 0.6;
pub const R2_CEILING: f64 = 0.95;
pub const MAPE_FLOOR: f64 = 5.0;
pub const MAPE_CEILING: f64 = 20.0;

/// Year-over-year trend: window size and minimum observations (weekly cadence).
pub const YOY_WINDOW: usize = 52;
pub const YOY_MIN_OBSERVATIONS: usize = 104;

/// Channel commentary thresholds (coefficient of variation / zero fraction).
pub const CV_HIGH: f64 = 1.5;
pub const CV_MODERATE: f64 = 0.8;
pub const SPARSITY_FLAG: f64 = 0.3;

/// Recalibration nudges applied per edited channel instead of refitting.
pub const RECAL_R2_PENALTY: f64 = 0.02;
pub const RECAL_MAPE_PENALTY: f64 = 0.8;
pub const RECAL_PARAM_JITTER: f64 = 0.005;

/// Coordinate-descent settings for the lasso estimator.
pub const CD_TOLERANCE: f64 = 1e-6;
pub const CD_MAX_ITERATIONS: usize = 10_000;

/// Rows sampled when sniffing whether a column is numeric.
pub const NUMERIC_SNIFF_ROWS: usize = 10;

/// Cap on column pairs considered for cached correlations.
pub const CORRELATION_COLUMN_CAP: usize = 5;
