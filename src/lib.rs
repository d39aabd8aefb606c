#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Aggregation recipes and computed results.
pub mod aggregate;
/// Snapshot cache with an explicit clock.
pub mod cache;
/// Centralized constants used across loading, aggregation, and display.
pub mod constants;
/// Dataset, record, and cell value types.
pub mod data;
/// Sidebar-driven row filtering.
pub mod filter;
/// Month-bucket periods for latest lookups and trend deltas.
pub mod period;
/// Declarative pillar pages and their evaluation.
pub mod pillars;
/// Display formatting for computed results.
pub mod present;
/// Metric lookup over the long-format KPI table.
pub mod resolve;
/// Dataset sources and the CSV loader.
pub mod source;
/// Chart-ready grouped tables.
pub mod tables;
/// Shared type aliases.
pub mod types;

mod errors;

pub use aggregate::{
    aggregate, AggregateResult, AggregateValue, Predicate, RatioDetail, Recipe, ValueFormat,
    ValueTest,
};
pub use cache::{Clock, DatasetCache, SystemClock};
pub use data::{Dataset, FieldValue, Row};
pub use errors::DashboardError;
pub use filter::{FilterCriterion, FilterSelection};
pub use period::Period;
pub use pillars::{
    evaluate_pillar, standard_pillars, ChartData, ChartKind, ChartSpec, ChartTable, FilterScope,
    KpiSpec, KpiValue, PillarReport, PillarSpec,
};
pub use present::format_result;
pub use resolve::MetricTable;
pub use source::{CsvFileSource, DatasetSnapshot, DatasetSource, InMemorySource};
pub use tables::{
    metric_series, numeric_values, paired_values, value_counts, CountOrder, CountRow, SeriesPoint,
};
pub use types::{CategoryValue, ColumnName, DisplayLabel, MetricKey, PillarId, SourceId};
