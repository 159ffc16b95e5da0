//! # mmm_engine
//!
//! Statistical core for marketing mix modeling: estimates how much of a
//! business outcome each marketing channel drives, and how efficiently it
//! converts spend into outcome.
//!
//! The crate provides three call surfaces:
//!
//! * [`compute_diagnostics`]: per-channel quality diagnostics (sparsity,
//!   volatility, year-over-year trend) plus the outcome's dated trend,
//!   used to vet channels before modeling.
//! * [`build_models`]: transforms each channel (adstock, lag, saturation),
//!   fits a leaderboard of twelve linear attribution models (four
//!   estimators, three seeded variants each) and derives contribution,
//!   ROI and significance per channel.
//! * [`recalibrate`]: adjusts an existing run for edited channel
//!   parameters or exclusions without refitting.
//!
//! The regression core solves the normal equations by Gauss–Jordan
//! elimination and falls back to a flat degenerate fit on singular input,
//! so a build always yields usable models. All randomness is seeded
//! through [`BuildOptions`]; identical inputs give identical leaderboards.
//!
//! ## Example
//!
//! ```
//! use mmm_engine::{
//!     build_models, BuildOptions, Cell, ColumnRole, FeatureParams, RoleMap, Row,
//!     SaturationCurve,
//! };
//!
//! // Weekly observations: spend on one channel plus the outcome it drives
//! let rows: Vec<Row> = (0..20)
//!     .map(|week| {
//!         let spend = 100.0 + 15.0 * (week % 4) as f64;
//!         let mut row = Row::new();
//!         row.insert("week".to_string(), Cell::from(format!("2024-01-{:02}", week + 1)));
//!         row.insert("tv_spend".to_string(), Cell::from(spend));
//!         row.insert("sales".to_string(), Cell::from(40.0 + 3.0 * spend));
//!         row
//!     })
//!     .collect();
//!
//! let mut roles = RoleMap::new();
//! roles.insert("week".to_string(), ColumnRole::TimeDimension);
//! roles.insert("tv_spend".to_string(), ColumnRole::MarketingSpend);
//! roles.insert("sales".to_string(), ColumnRole::DependentVariable);
//!
//! let features = vec![FeatureParams {
//!     channel: "tv_spend".to_string(),
//!     adstock: 0.3,
//!     lag: 0,
//!     transform: SaturationCurve::Log,
//! }];
//!
//! let leaderboard = build_models(&rows, &roles, &features, BuildOptions::default()).unwrap();
//! assert_eq!(leaderboard.len(), 12);
//!
//! let best = &leaderboard[0];
//! println!("{}: R² = {:.3}, MAPE = {:.1}%", best.id, best.r_squared, best.mape);
//! assert!(best.details[0].roi.is_some());
//! ```

// Module declarations
pub mod cache;
mod defaults;
pub mod diagnostics;
mod lasso;
pub mod model;
pub mod optimizer;
pub mod regression;
pub mod stats;
pub mod transform;
mod types;

// Re-export the call surfaces and public types
pub use cache::{ColumnSummary, DescriptiveCache, TableSummary};
pub use diagnostics::compute_diagnostics;
pub use model::{build_models, recalibrate, transform_channel};
pub use optimizer::{generate_scenarios, OptimizerScenario, ScenarioChannel};
pub use regression::{fit_ols, fit_ridge, FitKind, OlsFit};
pub use types::{
    columns_with_role, first_column_with_role, marketing_columns, numeric_column, Algorithm,
    BuildOptions, Cell, ChannelDiagnostic, ColumnRole, DiagnosticsReport, FeatureParams, MmError,
    ModelDetail, ModelRun, RoleMap, Row, SaturationCurve, TrendPoint,
};
