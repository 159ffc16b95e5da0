//! Build a model leaderboard over a synthetic weekly dataset and print the
//! ranked runs with per-channel contribution and ROI.
//!
//! Run with: `cargo run --example leaderboard`

use mmm_engine::{
    build_models, BuildOptions, Cell, ColumnRole, FeatureParams, RoleMap, Row, SaturationCurve,
};

fn main() {
    let rows: Vec<Row> = (0..52)
        .map(|week| {
            let tv = if week % 8 < 6 { 150.0 + 20.0 * (week % 3) as f64 } else { 0.0 };
            let search = 60.0 + 10.0 * (week % 5) as f64;
            let clicks = 8_000.0 + 400.0 * (week % 6) as f64;
            let sales = 500.0 + 2.2 * tv + 3.5 * search + 0.02 * clicks;

            let mut row = Row::new();
            row.insert("week".to_string(), Cell::from(format!("2024-W{:02}", week + 1)));
            row.insert("tv_spend".to_string(), Cell::from(tv));
            row.insert("search_spend".to_string(), Cell::from(search));
            row.insert("display_clicks".to_string(), Cell::from(clicks));
            row.insert("sales".to_string(), Cell::from(sales));
            row
        })
        .collect();

    let mut roles = RoleMap::new();
    roles.insert("week".to_string(), ColumnRole::TimeDimension);
    roles.insert("sales".to_string(), ColumnRole::DependentVariable);
    roles.insert("tv_spend".to_string(), ColumnRole::MarketingSpend);
    roles.insert("search_spend".to_string(), ColumnRole::MarketingSpend);
    roles.insert("display_clicks".to_string(), ColumnRole::MarketingActivity);

    let features = vec![
        FeatureParams {
            channel: "tv_spend".to_string(),
            adstock: 0.5,
            lag: 1,
            transform: SaturationCurve::SCurve,
        },
        FeatureParams {
            channel: "search_spend".to_string(),
            adstock: 0.1,
            lag: 0,
            transform: SaturationCurve::Log,
        },
        FeatureParams {
            channel: "display_clicks".to_string(),
            adstock: 0.3,
            lag: 0,
            transform: SaturationCurve::Power,
        },
    ];

    let leaderboard =
        build_models(&rows, &roles, &features, BuildOptions::default()).expect("build failed");

    println!("{:<10} {:<28} {:>6} {:>7} {:>8}", "id", "algorithm", "R²", "MAPE", "ROI");
    for run in &leaderboard {
        let roi = run
            .blended_roi
            .map(|r| format!("{r:+.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<10} {:<28} {:>6.3} {:>6.1}% {:>8}",
            run.id,
            run.algorithm.label(),
            run.r_squared,
            run.mape,
            roi
        );
    }

    let best = &leaderboard[0];
    println!("\nTop run {} channel breakdown:", best.id);
    for detail in best.details.iter().filter(|d| d.included) {
        let roi = detail
            .roi
            .map(|r| format!("{r:+.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<16} contribution {:>5.1}%  roi {:>7}",
            detail.channel, detail.contribution, roi
        );
    }
}
