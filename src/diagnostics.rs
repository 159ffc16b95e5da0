//! Descriptive channel diagnostics and the outcome trend.
//!
//! Runs before modeling so the calling layer can vet channels: sparsity,
//! volatility, year-over-year movement and a short rule-based commentary
//! per marketing channel, plus the dependent variable's dated trend.

use chrono::NaiveDate;

use crate::defaults::{
    CV_HIGH, CV_MODERATE, SPARSITY_FLAG, YOY_MIN_OBSERVATIONS, YOY_WINDOW,
};
use crate::stats::{coefficient_of_variation, mean};
use crate::types::{
    first_column_with_role, marketing_columns, numeric_column, ChannelDiagnostic, ColumnRole,
    DiagnosticsReport, MmError, RoleMap, Row, TrendPoint,
};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Compute channel diagnostics and the KPI trend for a role-assigned table.
///
/// Rows whose time cell fails to parse as a date are skipped from the trend;
/// the trend is sorted by parsed date ascending.
///
/// # Errors
/// `MmError::Configuration` unless both a `TimeDimension` and a
/// `DependentVariable` role are assigned.
pub fn compute_diagnostics(rows: &[Row], roles: &RoleMap) -> Result<DiagnosticsReport, MmError> {
    let time_col = first_column_with_role(roles, ColumnRole::TimeDimension).ok_or_else(|| {
        MmError::Configuration("a 'Time Dimension' column must be assigned".to_string())
    })?;
    let kpi_col = first_column_with_role(roles, ColumnRole::DependentVariable).ok_or_else(|| {
        MmError::Configuration("a 'Dependent Variable' column must be assigned".to_string())
    })?;

    let mut trend: Vec<TrendPoint> = rows
        .iter()
        .filter_map(|row| {
            let raw_date = match row.get(&time_col) {
                Some(cell) => match cell {
                    crate::types::Cell::Text(s) => s.clone(),
                    crate::types::Cell::Number(v) => v.to_string(),
                },
                None => return None,
            };
            let date = parse_date(&raw_date)?;
            let value = row
                .get(&kpi_col)
                .map(crate::types::Cell::as_number)
                .unwrap_or(0.0);
            Some(TrendPoint { date, value })
        })
        .collect();
    trend.sort_by_key(|point| point.date);

    let channels: Vec<ChannelDiagnostic> = marketing_columns(roles)
        .into_iter()
        .map(|channel| {
            let values = numeric_column(rows, &channel);
            diagnose_channel(channel, &values)
        })
        .collect();

    let trend_summary = summarize_trend(&trend);
    let quality_summary = summarize_quality(&channels);

    Ok(DiagnosticsReport {
        trend,
        trend_summary,
        channels,
        quality_summary,
    })
}

fn diagnose_channel(channel: String, values: &[f64]) -> ChannelDiagnostic {
    let zero_count = values.iter().filter(|&&v| v == 0.0).count();
    let sparsity = if values.is_empty() {
        0.0
    } else {
        zero_count as f64 / values.len() as f64
    };

    let cv = coefficient_of_variation(values);
    let volatility = cv * 100.0;
    let yoy_trend = year_over_year(values);

    let mut commentary = if cv > CV_HIGH {
        "High volatility suggests heavily flighted campaigns or seasonal patterns.".to_string()
    } else if cv > CV_MODERATE {
        "Moderate volatility indicates some campaign pulsing or seasonal effects.".to_string()
    } else {
        "Low volatility suggests consistent spending patterns.".to_string()
    };
    if sparsity > SPARSITY_FLAG {
        commentary
            .push_str(" Significant zero periods may indicate campaign flights or budget constraints.");
    }

    ChannelDiagnostic {
        channel,
        sparsity,
        volatility,
        yoy_trend,
        commentary,
        approved: true,
    }
}

/// Percent change between the most recent 52 observations and the preceding
/// 52, treating the series as weekly. `None` below 104 observations or when
/// the prior year sums to zero.
fn year_over_year(values: &[f64]) -> Option<f64> {
    if values.len() < YOY_MIN_OBSERVATIONS {
        return None;
    }

    let recent: f64 = values[values.len() - YOY_WINDOW..].iter().sum();
    let previous: f64 = values[values.len() - 2 * YOY_WINDOW..values.len() - YOY_WINDOW]
        .iter()
        .sum();

    if previous > 0.0 {
        Some((recent - previous) / previous * 100.0)
    } else {
        None
    }
}

fn summarize_trend(trend: &[TrendPoint]) -> String {
    let values: Vec<f64> = trend.iter().map(|p| p.value).collect();
    let kpi_mean = mean(&values);

    let change = if values.len() > 1 && values[0] != 0.0 {
        (values[values.len() - 1] - values[0]) / values[0] * 100.0
    } else {
        0.0
    };
    let direction = if change >= 0.0 { "positive" } else { "negative" };

    format!(
        "KPI shows {direction} trend ({change:.1}% change). Average: {kpi_mean:.0}"
    )
}

fn summarize_quality(channels: &[ChannelDiagnostic]) -> String {
    if channels.is_empty() {
        return "No marketing channels assigned; nothing to assess.".to_string();
    }

    let avg_volatility =
        channels.iter().map(|c| c.volatility).sum::<f64>() / channels.len() as f64;
    let grade = if avg_volatility > 100.0 {
        "challenging"
    } else if avg_volatility > 50.0 {
        "moderate"
    } else {
        "good"
    };

    format!("Data quality is {grade} with average volatility of {avg_volatility:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn roles() -> RoleMap {
        let mut roles = RoleMap::new();
        roles.insert("week".to_string(), ColumnRole::TimeDimension);
        roles.insert("sales".to_string(), ColumnRole::DependentVariable);
        roles.insert("tv_spend".to_string(), ColumnRole::MarketingSpend);
        roles
    }

    fn row(date: &str, sales: f64, spend: f64) -> Row {
        let mut row = Row::new();
        row.insert("week".to_string(), Cell::from(date));
        row.insert("sales".to_string(), Cell::from(sales));
        row.insert("tv_spend".to_string(), Cell::from(spend));
        row
    }

    #[test]
    fn test_missing_roles_are_configuration_errors() {
        let mut no_time = RoleMap::new();
        no_time.insert("sales".to_string(), ColumnRole::DependentVariable);
        assert!(matches!(
            compute_diagnostics(&[], &no_time),
            Err(MmError::Configuration(_))
        ));

        let mut no_kpi = RoleMap::new();
        no_kpi.insert("week".to_string(), ColumnRole::TimeDimension);
        assert!(matches!(
            compute_diagnostics(&[], &no_kpi),
            Err(MmError::Configuration(_))
        ));
    }

    #[test]
    fn test_trend_sorted_and_bad_dates_skipped() {
        let rows = vec![
            row("2024-02-05", 120.0, 40.0),
            row("not a date", 999.0, 10.0),
            row("2024-01-01", 100.0, 50.0),
            row("2024-01-15", 110.0, 0.0),
        ];

        let report = compute_diagnostics(&rows, &roles()).unwrap();
        assert_eq!(report.trend.len(), 3);
        assert_eq!(report.trend[0].value, 100.0);
        assert_eq!(report.trend[2].value, 120.0);
        assert!(report.trend.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_sparsity_and_volatility() {
        let rows = vec![
            row("2024-01-01", 100.0, 0.0),
            row("2024-01-08", 110.0, 0.0),
            row("2024-01-15", 105.0, 50.0),
            row("2024-01-22", 120.0, 50.0),
        ];

        let report = compute_diagnostics(&rows, &roles()).unwrap();
        let tv = &report.channels[0];
        assert_eq!(tv.channel, "tv_spend");
        assert!((tv.sparsity - 0.5).abs() < 1e-12);
        // CV of [0, 0, 50, 50] = 1.0 -> 100%
        assert!((tv.volatility - 100.0).abs() < 1e-9);
        assert!(tv.yoy_trend.is_none());
        assert!(tv.commentary.contains("zero periods"));
        assert!(tv.approved);
    }

    #[test]
    fn test_yoy_needs_two_years() {
        assert!(year_over_year(&vec![10.0; 103]).is_none());

        // Prior year 52 * 10, recent year 52 * 12: +20%
        let mut values = vec![10.0; 52];
        values.extend(vec![12.0; 52]);
        let yoy = year_over_year(&values).unwrap();
        assert!((yoy - 20.0).abs() < 1e-9);

        // Zero prior-year total stays undefined
        let mut flat = vec![0.0; 52];
        flat.extend(vec![5.0; 52]);
        assert!(year_over_year(&flat).is_none());
    }

    #[test]
    fn test_summaries() {
        let rows = vec![
            row("2024-01-01", 100.0, 50.0),
            row("2024-01-08", 110.0, 52.0),
            row("2024-01-15", 125.0, 48.0),
        ];

        let report = compute_diagnostics(&rows, &roles()).unwrap();
        assert!(report.trend_summary.contains("positive"));
        assert!(report.trend_summary.contains("25.0%"));
        assert!(report.quality_summary.contains("good"));
    }
}
