use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::defaults::MAX_ADSTOCK;

/// One observation: column name -> raw cell value, as supplied by the ingestion layer.
pub type Row = HashMap<String, Cell>;

/// Column-role assignment for a table. Ordered by column name so every
/// engine operation iterates channels deterministically.
pub type RoleMap = BTreeMap<String, ColumnRole>;

/// A raw table cell. Non-numeric text coerces to `0.0` at transform time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell; unparseable text is `0.0`, not an error.
    pub fn as_number(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            Cell::Number(_) => true,
            Cell::Text(s) => s.trim().parse::<f64>().is_ok(),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// Role a column plays in the analysis. Only the two marketing roles enter
/// the design matrix; only `MarketingSpend` supports an ROI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    TimeDimension,
    GeoDimension,
    DependentVariable,
    MarketingSpend,
    MarketingActivity,
    ControlVariable,
    Ignore,
}

impl ColumnRole {
    pub fn is_marketing(&self) -> bool {
        matches!(self, ColumnRole::MarketingSpend | ColumnRole::MarketingActivity)
    }
}

/// Saturation / diminishing-returns curve applied after adstock and lag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaturationCurve {
    Log,
    SCurve,
    NegativeExponential,
    Power,
}

/// Per-channel feature engineering parameters.
///
/// Invariants: `0 <= adstock < 0.95`, `lag >= 0`. Editable by the calling
/// layer between builds; immutable once baked into a [`ModelRun`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureParams {
    pub channel: String,
    pub adstock: f64,
    pub lag: usize,
    pub transform: SaturationCurve,
}

impl FeatureParams {
    pub fn validate(&self) -> Result<(), MmError> {
        if !(0.0..MAX_ADSTOCK).contains(&self.adstock) {
            return Err(MmError::Validation(format!(
                "adstock for '{}' must be in [0, {}), got {}",
                self.channel, MAX_ADSTOCK, self.adstock
            )));
        }
        Ok(())
    }
}

/// Descriptive quality diagnostics for one marketing channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelDiagnostic {
    pub channel: String,
    /// Fraction of exact-zero observations, in [0, 1].
    pub sparsity: f64,
    /// Coefficient of variation as a percentage.
    pub volatility: f64,
    /// Percent change between the last 52 observations and the preceding 52;
    /// `None` with fewer than 104 observations or a zero prior-year total.
    pub yoy_trend: Option<f64>,
    pub commentary: String,
    /// Gates inclusion in modeling; set by the calling layer.
    pub approved: bool,
}

/// One point of the dependent variable's time trend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Output of [`compute_diagnostics`](crate::compute_diagnostics).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub trend: Vec<TrendPoint>,
    pub trend_summary: String,
    pub channels: Vec<ChannelDiagnostic>,
    pub quality_summary: String,
}

/// Estimators backing the leaderboard. All share the same normal-equation
/// core; Ridge and Lasso regularize it, NNLS clips it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Ols,
    Ridge,
    Lasso,
    Nnls,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Ols,
        Algorithm::Ridge,
        Algorithm::Lasso,
        Algorithm::Nnls,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Ols => "OLS Regression",
            Algorithm::Ridge => "Ridge Regression",
            Algorithm::Lasso => "Lasso Regression",
            Algorithm::Nnls => "Non-negative Least Squares",
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            Algorithm::Ols => "ols",
            Algorithm::Ridge => "ridge",
            Algorithm::Lasso => "lasso",
            Algorithm::Nnls => "nnls",
        }
    }

    /// Parametric estimators report coefficient p-values; the others report `None`.
    pub fn is_parametric(&self) -> bool {
        matches!(self, Algorithm::Ols | Algorithm::Ridge)
    }
}

/// Per-channel result within one fitted model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelDetail {
    pub channel: String,
    pub included: bool,
    /// Share of total attributed outcome, in percent.
    pub contribution: f64,
    /// Net return per unit of spend; `None` for activity-only channels.
    pub roi: Option<f64>,
    /// Two-sided coefficient p-value; `None` for non-parametric estimators
    /// and degenerate fits.
    pub p_value: Option<f64>,
    pub params: FeatureParams,
}

/// One fitted model on the leaderboard.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelRun {
    pub id: String,
    pub algorithm: Algorithm,
    pub r_squared: f64,
    pub mape: f64,
    /// Contribution-weighted average ROI across spend channels; `None` when
    /// no spend channel has a defined ROI.
    pub blended_roi: Option<f64>,
    pub commentary: String,
    pub details: Vec<ModelDetail>,
}

/// Options for a leaderboard build.
#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Seed for the variant noise source; identical seeds give identical
    /// leaderboards.
    pub seed: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            seed: crate::defaults::DEFAULT_SEED,
        }
    }
}

/// Library error type. Numerical degeneracy is deliberately absent: a
/// singular design matrix falls back to a usable fit instead of erroring.
#[derive(thiserror::Error, Debug)]
pub enum MmError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("input lengths mismatch")]
    LengthMismatch,
    #[error("empty input")]
    EmptyInput,
}

/// Extract a column as numbers, coercing non-numeric cells to zero.
pub fn numeric_column(rows: &[Row], name: &str) -> Vec<f64> {
    rows.iter()
        .map(|row| row.get(name).map(Cell::as_number).unwrap_or(0.0))
        .collect()
}

/// Columns carrying the given role, in deterministic (name) order.
pub fn columns_with_role(roles: &RoleMap, role: ColumnRole) -> Vec<String> {
    roles
        .iter()
        .filter(|(_, r)| **r == role)
        .map(|(name, _)| name.clone())
        .collect()
}

/// First column carrying the given role, if any.
pub fn first_column_with_role(roles: &RoleMap, role: ColumnRole) -> Option<String> {
    roles
        .iter()
        .find(|(_, r)| **r == role)
        .map(|(name, _)| name.clone())
}

/// Marketing channels (spend or activity), in deterministic order.
pub fn marketing_columns(roles: &RoleMap) -> Vec<String> {
    roles
        .iter()
        .filter(|(_, r)| r.is_marketing())
        .map(|(name, _)| name.clone())
        .collect()
}
