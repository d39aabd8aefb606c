//! Dataset sources and the CSV loader.
//!
//! Ownership model:
//! - `DatasetSource` is the core-facing interface that produces a full
//!   `Dataset` per load; refreshes replace the dataset wholesale.
//! - `CsvFileSource` reads the flat delimited export, normalizing date
//!   columns and typing cells once so downstream code never re-parses.
//! - `InMemorySource` backs tests and embedded fixtures.
//!
//! Loading is defensive: unreadable rows are skipped and logged, never fatal.
//! Only an unreachable or header-less file is an error.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::loader;
use crate::data::{Dataset, FieldValue};
use crate::errors::DashboardError;
use crate::types::{ColumnName, SourceId};

/// A loaded dataset plus the instant it was produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    /// The immutable table.
    pub dataset: Dataset,
    /// Load completion time, used for staleness checks.
    pub loaded_at: DateTime<Utc>,
}

/// Core-facing dataset source interface.
///
/// For a fixed upstream state, `load` output should be deterministic: loading
/// the same raw data twice yields identical datasets and therefore identical
/// aggregate results.
pub trait DatasetSource: Send + Sync {
    /// Stable source identifier used in errors and logs.
    fn id(&self) -> &str;
    /// Produce a complete dataset.
    fn load(&self) -> Result<Dataset, DashboardError>;
}

/// Source serving a pre-built dataset from memory.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    id: SourceId,
    dataset: Dataset,
}

impl InMemorySource {
    /// Wrap a dataset under a source id.
    pub fn new(id: impl Into<SourceId>, dataset: Dataset) -> Self {
        Self {
            id: id.into(),
            dataset,
        }
    }
}

impl DatasetSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<Dataset, DashboardError> {
        Ok(self.dataset.clone())
    }
}

/// Source reading a flat CSV export from disk.
#[derive(Clone, Debug)]
pub struct CsvFileSource {
    id: SourceId,
    path: PathBuf,
    date_columns: Vec<ColumnName>,
}

impl CsvFileSource {
    /// Create a source for the file at `path`.
    pub fn new(id: impl Into<SourceId>, path: impl AsRef<Path>) -> Self {
        Self {
            id: id.into(),
            path: path.as_ref().to_path_buf(),
            date_columns: Vec::new(),
        }
    }

    /// Declare columns that must be parsed as dates.
    ///
    /// Cells in these columns are tried against every accepted date format;
    /// unparsable values become `Missing` rather than text, mirroring a
    /// coercing date conversion. Columns not listed here still auto-detect
    /// ISO dates.
    pub fn with_date_columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnName>,
    {
        self.date_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

impl DatasetSource for CsvFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<Dataset, DashboardError> {
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|err| DashboardError::SourceUnavailable {
                source_id: self.id.clone(),
                reason: err.to_string(),
            })?;
        let headers = reader
            .headers()
            .map_err(|err| DashboardError::Malformed {
                source_id: self.id.clone(),
                details: format!("unreadable header row: {err}"),
            })?
            .clone();
        let forced_date: Vec<bool> = headers
            .iter()
            .map(|header| self.date_columns.iter().any(|column| column == header))
            .collect();

        let mut dataset = Dataset::new(headers.iter())?;
        let mut skipped = 0usize;
        for (position, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!(row = position, error = %err, "{}", loader::SKIP_UNREADABLE_MSG);
                    skipped += 1;
                    continue;
                }
            };
            if record.len() != headers.len() {
                warn!(
                    row = position,
                    cells = record.len(),
                    columns = headers.len(),
                    "{}",
                    loader::SKIP_UNREADABLE_MSG
                );
                skipped += 1;
                continue;
            }
            let cells = record
                .iter()
                .zip(forced_date.iter())
                .map(|(raw, force_date)| parse_cell(raw, *force_date))
                .collect();
            dataset.push_row(cells)?;
        }
        if skipped > 0 {
            warn!(
                source_id = %self.id,
                skipped,
                "dataset loaded with unreadable rows dropped"
            );
        }
        debug!(source_id = %self.id, rows = dataset.len(), "dataset loaded");
        Ok(dataset)
    }
}

fn parse_cell(raw: &str, force_date: bool) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Missing;
    }
    if force_date {
        return match parse_flexible_date(trimmed) {
            Some(date) => FieldValue::Date(date),
            None => FieldValue::Missing,
        };
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return FieldValue::Number(number);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, loader::DATE_FORMATS[0]) {
        return FieldValue::Date(date);
    }
    FieldValue::Text(trimmed.to_string())
}

/// Try every accepted date format, in order.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    loader::DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
}
