use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::DashboardError;
use crate::types::{CategoryValue, ColumnName};

/// A single typed cell value.
///
/// Loaders normalize raw cells into this enum once; downstream code never
/// re-parses strings. `Missing` is a first-class value so absence can flow
/// through aggregation instead of raising.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A free-form or categorical string value.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// A calendar date, already normalized by the loader.
    Date(NaiveDate),
    /// No value recorded for this cell.
    Missing,
}

impl FieldValue {
    /// True when the cell holds no usable value (missing or blank text).
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Borrow the text content, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the cell. Text that parses as a number counts.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Date view of the cell.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Canonical grouping label for membership tests and value counts.
    ///
    /// Whole numbers drop their fraction so `3.0` groups with `3`.
    pub fn category_label(&self) -> Option<CategoryValue> {
        match self {
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            FieldValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    Some(format!("{}", *value as i64))
                } else {
                    Some(format!("{value}"))
                }
            }
            FieldValue::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            FieldValue::Missing => None,
        }
    }
}

/// An immutable, ordered table of records sharing one schema.
///
/// Created once per load/refresh cycle and replaced wholesale afterwards;
/// in-flight readers never observe a half-updated table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: IndexMap<ColumnName, usize>,
    rows: Vec<Vec<FieldValue>>,
}

impl Dataset {
    /// Create an empty dataset with the given schema.
    ///
    /// Duplicate column names are a configuration error.
    pub fn new<I, S>(columns: I) -> Result<Self, DashboardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnName>,
    {
        let mut index = IndexMap::new();
        for (position, column) in columns.into_iter().enumerate() {
            let column = column.into();
            if index.insert(column.clone(), position).is_some() {
                return Err(DashboardError::Configuration(format!(
                    "duplicate column '{column}' in schema"
                )));
            }
        }
        Ok(Self {
            columns: index,
            rows: Vec::new(),
        })
    }

    /// Create a dataset from a schema and pre-built rows.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<FieldValue>>) -> Result<Self, DashboardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnName>,
    {
        let mut dataset = Self::new(columns)?;
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Append one row. The cell count must match the schema width.
    pub fn push_row(&mut self, cells: Vec<FieldValue>) -> Result<(), DashboardError> {
        if cells.len() != self.columns.len() {
            return Err(DashboardError::Configuration(format!(
                "row has {} cells, schema has {} columns",
                cells.len(),
                self.columns.len()
            )));
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the dataset contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the schema contains `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Schema column names in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Borrow a row view by position.
    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.rows.get(position).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Iterate row views in original order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Build a new dataset keeping rows that satisfy `keep`, in order.
    pub fn retain_rows<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Row<'_>) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|cells| {
                keep(&Row {
                    columns: &self.columns,
                    cells,
                })
            })
            .cloned()
            .collect();
        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// Borrowed view of one dataset row with schema-aware cell access.
///
/// Every accessor returns `Option`: a `None` means the column is absent from
/// the schema or the cell is missing, and callers branch on presence rather
/// than handling errors.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    columns: &'a IndexMap<ColumnName, usize>,
    cells: &'a [FieldValue],
}

impl<'a> Row<'a> {
    /// Borrow the raw cell for `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&'a FieldValue> {
        self.columns
            .get(column)
            .and_then(|position| self.cells.get(*position))
    }

    /// Text content of the cell, if present and non-blank.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    /// Canonical grouping label of the cell.
    pub fn category(&self, column: &str) -> Option<CategoryValue> {
        self.get(column).and_then(FieldValue::category_label)
    }

    /// Numeric view of the cell.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(FieldValue::as_number)
    }

    /// Date view of the cell.
    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.get(column).and_then(FieldValue::as_date)
    }

    /// True when the column exists and the cell holds a usable value.
    pub fn is_answered(&self, column: &str) -> bool {
        self.get(column).is_some_and(|cell| !cell.is_missing())
    }
}
