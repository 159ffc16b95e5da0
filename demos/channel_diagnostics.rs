//! Run the pre-modeling diagnostics over two years of weekly data.
//!
//! Run with: `cargo run --example channel_diagnostics`

use mmm_engine::{compute_diagnostics, Cell, ColumnRole, RoleMap, Row};

fn main() {
    let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).expect("valid date");
    let rows: Vec<Row> = (0..104)
        .map(|week| {
            // tv goes dark every fourth week; search grows year over year
            let tv = if week % 4 == 3 { 0.0 } else { 200.0 + 30.0 * (week % 3) as f64 };
            let search = 80.0 + 0.5 * week as f64;
            let sales = 900.0 + 1.5 * tv + 3.0 * search;

            let date = start + chrono::Duration::weeks(week as i64);
            let mut row = Row::new();
            row.insert(
                "week".to_string(),
                Cell::from(date.format("%Y-%m-%d").to_string()),
            );
            row.insert("tv_spend".to_string(), Cell::from(tv));
            row.insert("search_spend".to_string(), Cell::from(search));
            row.insert("sales".to_string(), Cell::from(sales));
            row
        })
        .collect();

    let mut roles = RoleMap::new();
    roles.insert("week".to_string(), ColumnRole::TimeDimension);
    roles.insert("sales".to_string(), ColumnRole::DependentVariable);
    roles.insert("tv_spend".to_string(), ColumnRole::MarketingSpend);
    roles.insert("search_spend".to_string(), ColumnRole::MarketingSpend);

    let report = compute_diagnostics(&rows, &roles).expect("diagnostics failed");

    println!("{}", report.trend_summary);
    println!("{}\n", report.quality_summary);

    for channel in &report.channels {
        let yoy = channel
            .yoy_trend
            .map(|v| format!("{v:+.1}%"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<16} sparsity {:>5.1}%  volatility {:>6.1}% CV  yoy {:>7}",
            channel.channel,
            channel.sparsity * 100.0,
            channel.volatility,
            yoy
        );
        println!("  {}", channel.commentary);
    }
}
