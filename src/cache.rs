//! Caller-owned memoization of descriptive statistics.
//!
//! Keyed on a cheap hash of the table shape (row count plus column names),
//! so repeated chat or rendering passes over an unchanged upload skip the
//! per-column scans. The cache is an explicit value the caller owns and
//! threads through, never module-global state, which keeps the engine
//! reentrant; it is an optimization, not a correctness requirement.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::defaults::{CORRELATION_COLUMN_CAP, NUMERIC_SNIFF_ROWS};
use crate::stats::{correlation, mean, standard_deviation};
use crate::types::{numeric_column, Cell, Row};

/// Descriptive statistics for one numeric column.
#[derive(Clone, Debug, Serialize)]
pub struct ColumnSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Shape-keyed summary of a table.
#[derive(Clone, Debug, Serialize)]
pub struct TableSummary {
    /// Numeric columns in name order.
    pub numeric_columns: Vec<String>,
    pub columns: HashMap<String, ColumnSummary>,
    /// Pairwise correlations over the first few numeric columns, capped to
    /// keep the scan linear-ish on wide tables.
    pub correlations: Vec<(String, String, f64)>,
}

/// Memoizes one [`TableSummary`] per table shape.
#[derive(Debug, Default)]
pub struct DescriptiveCache {
    entry: Option<(u64, TableSummary)>,
    hits: u64,
    misses: u64,
}

impl DescriptiveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarize the table, reusing the cached result when the shape
    /// (row count + column names) is unchanged.
    pub fn summarize(&mut self, rows: &[Row]) -> &TableSummary {
        let key = shape_key(rows);
        let stale = match &self.entry {
            Some((cached_key, _)) => *cached_key != key,
            None => true,
        };

        if stale {
            self.misses += 1;
            self.entry = None;
        } else {
            self.hits += 1;
        }

        let (_, summary) = self
            .entry
            .get_or_insert_with(|| (key, compute_summary(rows)));
        summary
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// (hits, misses) since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

fn shape_key(rows: &[Row]) -> u64 {
    let mut hasher = DefaultHasher::new();
    rows.len().hash(&mut hasher);
    for name in column_names(rows) {
        name.hash(&mut hasher);
    }
    hasher.finish()
}

fn column_names(rows: &[Row]) -> Vec<String> {
    let mut names: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

fn compute_summary(rows: &[Row]) -> TableSummary {
    let numeric_columns: Vec<String> = column_names(rows)
        .into_iter()
        .filter(|name| {
            rows.iter()
                .take(NUMERIC_SNIFF_ROWS)
                .any(|row| row.get(name).map(Cell::is_numeric).unwrap_or(false))
        })
        .collect();

    let mut columns = HashMap::new();
    for name in &numeric_columns {
        let values = numeric_column(rows, name);
        columns.insert(
            name.clone(),
            ColumnSummary {
                mean: mean(&values),
                std_dev: standard_deviation(&values),
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                count: values.len(),
            },
        );
    }

    let capped = numeric_columns.len().min(CORRELATION_COLUMN_CAP);
    let mut correlations = Vec::new();
    for i in 0..capped {
        for j in (i + 1)..capped {
            let a = numeric_column(rows, &numeric_columns[i]);
            let b = numeric_column(rows, &numeric_columns[j]);
            correlations.push((
                numeric_columns[i].clone(),
                numeric_columns[j].clone(),
                correlation(&a, &b),
            ));
        }
    }

    TableSummary {
        numeric_columns,
        columns,
        correlations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("spend".to_string(), Cell::from(10.0 * i as f64));
                row.insert("sales".to_string(), Cell::from(25.0 * i as f64));
                row.insert("region".to_string(), Cell::from("north"));
                row
            })
            .collect()
    }

    #[test]
    fn test_numeric_column_detection() {
        let mut cache = DescriptiveCache::new();
        let summary = cache.summarize(&table(5));
        assert_eq!(summary.numeric_columns, vec!["sales", "spend"]);
        assert!(!summary.columns.contains_key("region"));
    }

    #[test]
    fn test_summary_values_and_correlation() {
        let mut cache = DescriptiveCache::new();
        let summary = cache.summarize(&table(5));

        let spend = &summary.columns["spend"];
        assert_eq!(spend.count, 5);
        assert_eq!(spend.min, 0.0);
        assert_eq!(spend.max, 40.0);
        assert!((spend.mean - 20.0).abs() < 1e-12);

        // spend and sales are perfectly linear
        let (_, _, corr) = summary.correlations[0];
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cache_hit_on_same_shape() {
        let mut cache = DescriptiveCache::new();
        let rows = table(8);
        cache.summarize(&rows);
        cache.summarize(&rows);
        assert_eq!(cache.stats(), (1, 1));

        // Different row count misses
        cache.summarize(&table(9));
        assert_eq!(cache.stats(), (1, 2));

        cache.invalidate();
        cache.summarize(&table(9));
        assert_eq!(cache.stats(), (1, 3));
    }
}
