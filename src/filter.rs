//! Sidebar-driven row filtering.
//!
//! A `FilterSelection` is the user's current sidebar state: for each column,
//! either a set of accepted categorical values or an inclusive date range.
//! Applying a selection is a stable filter: rows keep their original order,
//! and every present criterion must pass (logical AND). Criteria naming a
//! column absent from the schema are skipped, not errors: a dashboard built
//! against an older schema keeps rendering when a survey wave drops a column.

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Row};
use crate::types::{CategoryValue, ColumnName};

/// One per-column filter criterion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FilterCriterion {
    /// Keep rows whose cell label is a member of this set.
    ///
    /// An *empty* set is an explicit "deselect everything" and keeps nothing;
    /// it is not the same as omitting the criterion.
    AnyOf(IndexSet<CategoryValue>),
    /// Keep rows whose date cell falls inside the closed interval.
    DateRange {
        /// Inclusive lower bound.
        start: NaiveDate,
        /// Inclusive upper bound.
        end: NaiveDate,
    },
}

impl FilterCriterion {
    fn accepts(&self, row: &Row<'_>, column: &str) -> bool {
        match self {
            FilterCriterion::AnyOf(accepted) => row
                .category(column)
                .map(|label| accepted.contains(&label))
                .unwrap_or(false),
            FilterCriterion::DateRange { start, end } => row
                .date(column)
                .map(|date| date >= *start && date <= *end)
                .unwrap_or(false),
        }
    }
}

/// A set of named criteria applied together (logical AND).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    criteria: IndexMap<ColumnName, FilterCriterion>,
}

impl FilterSelection {
    /// An empty selection that passes every row through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set-membership criterion on `column`.
    pub fn any_of<C, I, V>(mut self, column: C, values: I) -> Self
    where
        C: Into<ColumnName>,
        I: IntoIterator<Item = V>,
        V: Into<CategoryValue>,
    {
        let accepted: IndexSet<CategoryValue> = values.into_iter().map(Into::into).collect();
        self.criteria
            .insert(column.into(), FilterCriterion::AnyOf(accepted));
        self
    }

    /// Add an inclusive date-range criterion on `column`.
    pub fn date_range<C: Into<ColumnName>>(
        mut self,
        column: C,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        self.criteria
            .insert(column.into(), FilterCriterion::DateRange { start, end });
        self
    }

    /// True when no criteria are set.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Iterate criteria in insertion order.
    pub fn criteria(&self) -> impl Iterator<Item = (&str, &FilterCriterion)> {
        self.criteria
            .iter()
            .map(|(column, criterion)| (column.as_str(), criterion))
    }

    /// Apply the selection to a dataset, keeping rows that satisfy every
    /// criterion whose column exists in the schema.
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        if self.criteria.is_empty() {
            return dataset.clone();
        }
        let active: Vec<(&str, &FilterCriterion)> = self
            .criteria
            .iter()
            .filter(|(column, _)| dataset.has_column(column))
            .map(|(column, criterion)| (column.as_str(), criterion))
            .collect();
        if active.is_empty() {
            return dataset.clone();
        }
        dataset.retain_rows(|row| {
            active
                .iter()
                .all(|(column, criterion)| criterion.accepts(row, column))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FieldValue;

    fn participants() -> Dataset {
        let joined = |y, m, d| FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        Dataset::from_rows(
            ["ZAPIER_Gender", "State Code", "Approved"],
            vec![
                vec![
                    FieldValue::Text("Female".into()),
                    FieldValue::Text("NSW".into()),
                    joined(2024, 11, 3),
                ],
                vec![
                    FieldValue::Text("Male".into()),
                    FieldValue::Text("VIC".into()),
                    joined(2025, 1, 20),
                ],
                vec![
                    FieldValue::Missing,
                    FieldValue::Text("NSW".into()),
                    joined(2025, 2, 8),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn apply_keeps_original_order_and_is_a_subset() {
        let dataset = participants();
        let filtered = FilterSelection::new()
            .any_of("State Code", ["NSW"])
            .apply(&dataset);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.row(0).unwrap().text("ZAPIER_Gender"), Some("Female"));
        assert!(filtered.row(1).unwrap().text("ZAPIER_Gender").is_none());
    }

    #[test]
    fn apply_is_idempotent() {
        let dataset = participants();
        let selection = FilterSelection::new().any_of("ZAPIER_Gender", ["Female", "Male"]);
        let once = selection.apply(&dataset);
        let twice = selection.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_cell_fails_membership() {
        let dataset = participants();
        let filtered = FilterSelection::new()
            .any_of("ZAPIER_Gender", ["Female", "Male"])
            .apply(&dataset);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn empty_accepted_set_empties_the_result() {
        let dataset = participants();
        let filtered = FilterSelection::new()
            .any_of("State Code", Vec::<String>::new())
            .apply(&dataset);
        assert!(filtered.is_empty());
    }

    #[test]
    fn absent_column_criterion_is_skipped() {
        let dataset = participants();
        let filtered = FilterSelection::new()
            .any_of("Organisation Code", Vec::<String>::new())
            .apply(&dataset);
        assert_eq!(filtered.len(), dataset.len());
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let dataset = participants();
        let filtered = FilterSelection::new()
            .date_range(
                "Approved",
                NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 8).unwrap(),
            )
            .apply(&dataset);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn and_semantics_across_criteria() {
        let dataset = participants();
        let filtered = FilterSelection::new()
            .any_of("State Code", ["NSW"])
            .any_of("ZAPIER_Gender", ["Female"])
            .apply(&dataset);
        assert_eq!(filtered.len(), 1);
    }
}
