//! Metric lookup over the long-format KPI table.
//!
//! The multi-pillar dataset is "long": one row per (metric name, date, value),
//! with the date coarsened to a month [`Period`] for lookups. Dashboards ask
//! for the latest value of a named metric; a miss is a zero sentinel, never an
//! error, so KPI cards degrade gracefully when an upstream export drops rows.

use crate::constants::columns;
use crate::data::Dataset;
use crate::period::Period;
use crate::types::ColumnName;

/// Read-only resolver over a long-format metric dataset.
pub struct MetricTable<'a> {
    dataset: &'a Dataset,
    metric_column: ColumnName,
    value_column: ColumnName,
    date_column: ColumnName,
}

impl<'a> MetricTable<'a> {
    /// Wrap a dataset using the canonical long-format column names.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            metric_column: columns::METRIC_NAME.to_string(),
            value_column: columns::METRIC_VALUE.to_string(),
            date_column: columns::RECORD_DATE.to_string(),
        }
    }

    /// Wrap a dataset with explicit column names.
    pub fn with_columns(
        dataset: &'a Dataset,
        metric_column: impl Into<ColumnName>,
        value_column: impl Into<ColumnName>,
        date_column: impl Into<ColumnName>,
    ) -> Self {
        Self {
            dataset,
            metric_column: metric_column.into(),
            value_column: value_column.into(),
            date_column: date_column.into(),
        }
    }

    /// The most recent period present in the table, if any rows carry dates.
    pub fn latest_period(&self) -> Option<Period> {
        self.dataset
            .rows()
            .filter_map(|row| row.date(&self.date_column))
            .map(Period::from_date)
            .max()
    }

    /// Distinct periods present, in ascending order.
    pub fn periods(&self) -> Vec<Period> {
        let mut periods: Vec<Period> = self
            .dataset
            .rows()
            .filter_map(|row| row.date(&self.date_column))
            .map(Period::from_date)
            .collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }

    /// Look up `metric_key` for `period`.
    ///
    /// When several rows match (not expected from a well-formed export), the
    /// first in dataset order wins. Returns `None` on a miss.
    pub fn try_resolve(&self, metric_key: &str, period: Period) -> Option<f64> {
        self.dataset
            .rows()
            .find(|row| {
                row.text(&self.metric_column) == Some(metric_key)
                    && row
                        .date(&self.date_column)
                        .map(Period::from_date)
                        .is_some_and(|p| p == period)
            })
            .and_then(|row| row.number(&self.value_column))
    }

    /// Look up `metric_key` for `period`, defaulting to the zero sentinel.
    pub fn resolve(&self, metric_key: &str, period: Period) -> f64 {
        self.try_resolve(metric_key, period).unwrap_or(0.0)
    }

    /// Look up `metric_key` for the latest period present.
    pub fn resolve_latest(&self, metric_key: &str) -> f64 {
        self.latest_period()
            .map(|period| self.resolve(metric_key, period))
            .unwrap_or(0.0)
    }
}
