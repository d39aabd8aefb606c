//! Chart-ready grouped tables derived from a filtered dataset.
//!
//! These are the small pivots the charting layer consumes directly: ordered
//! category counts for bar/pie charts, raw numeric columns for histograms and
//! scatters, and per-period series for trend lines.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::period::Period;
use crate::resolve::MetricTable;
use crate::types::CategoryValue;

/// One category's count and share of the grouped total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountRow {
    /// Category label.
    pub category: CategoryValue,
    /// Rows carrying this label.
    pub count: usize,
    /// Fraction of the grouped total, 0..=1.
    pub share: f64,
}

/// Ordering applied to grouped category counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountOrder {
    /// Largest group first, ties broken by label (uptake charts).
    ByCountDesc,
    /// Label order (age and dependents distributions).
    ByCategory,
}

/// Group rows by the labels in `column` and count each group.
///
/// Missing cells are dropped, matching the display behavior where blank
/// survey answers never appear as a chart category. Returns an empty table
/// when the column is absent.
pub fn value_counts(dataset: &Dataset, column: &str, order: CountOrder) -> Vec<CountRow> {
    if !dataset.has_column(column) {
        return Vec::new();
    }
    let mut counts: IndexMap<CategoryValue, usize> = IndexMap::new();
    for row in dataset.rows() {
        if let Some(label) = row.category(column) {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    let total: usize = counts.values().sum();
    let mut table: Vec<CountRow> = counts
        .into_iter()
        .map(|(category, count)| CountRow {
            category,
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();
    match order {
        CountOrder::ByCountDesc => {
            table.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        }
        CountOrder::ByCategory => {
            table.sort_by(|a, b| numeric_aware_cmp(&a.category, &b.category));
        }
    }
    table
}

/// Compare labels numerically when both parse as numbers, lexically otherwise.
/// Keeps age buckets like `9` before `10` in distribution charts.
fn numeric_aware_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// One period's resolved value in a trend series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Month bucket.
    pub period: Period,
    /// Resolved metric value for that bucket.
    pub value: f64,
}

/// Resolve `metric_key` across every period present, in ascending order.
///
/// Periods where the metric is absent are omitted rather than zero-filled so
/// a trend line never fabricates a dip.
pub fn metric_series(table: &MetricTable<'_>, metric_key: &str) -> Vec<SeriesPoint> {
    table
        .periods()
        .into_iter()
        .filter_map(|period| {
            table
                .try_resolve(metric_key, period)
                .map(|value| SeriesPoint { period, value })
        })
        .collect()
}

/// Non-missing numeric values of `column` in row order (histogram feed).
pub fn numeric_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset.rows().filter_map(|row| row.number(column)).collect()
}

/// Paired numeric values where both columns are present (scatter feed).
pub fn paired_values(dataset: &Dataset, x_column: &str, y_column: &str) -> Vec<(f64, f64)> {
    dataset
        .rows()
        .filter_map(|row| match (row.number(x_column), row.number(y_column)) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .collect()
}
