//! Named aggregation recipes over a filtered dataset.
//!
//! Every displayed KPI is a [`Recipe`] evaluated against the rows that
//! survived filtering. Evaluation is a pure function of its inputs and never
//! raises for data-shape problems: empty inputs and absent columns degrade to
//! the sentinel variants of [`AggregateValue`], which carry enough intent for
//! a renderer to show `N/A`, `no data`, or suppress the figure entirely.

use serde::{Deserialize, Serialize};

use crate::constants::answers;
use crate::data::{Dataset, FieldValue, Row};
use crate::period::Period;
use crate::resolve::MetricTable;
use crate::types::{CategoryValue, ColumnName, MetricKey};

/// Test applied to a single cell when counting rows for a ratio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValueTest {
    /// Cell text equals `yes`, compared case-insensitively.
    YesInsensitive,
    /// Cell holds any usable value.
    Answered,
    /// Cell holds a usable value other than the exact literal `No`.
    ///
    /// Product rule inherited from the survey pipeline: explicit `No`
    /// responses are excluded from "answered" denominators, so the base is
    /// "all answered except explicit No", which is subtly different from
    /// "all answered". Preserved as-is pending product clarification.
    AnsweredExceptNo,
    /// Cell label equals the literal exactly.
    Equals(CategoryValue),
    /// Cell label equals any of the literals exactly.
    AnyOfLiterals(Vec<CategoryValue>),
    /// Cell text contains the token, compared case-insensitively.
    ContainsInsensitive(String),
}

impl ValueTest {
    fn passes(&self, cell: Option<&FieldValue>) -> bool {
        let Some(cell) = cell else {
            return false;
        };
        match self {
            ValueTest::YesInsensitive => cell
                .as_text()
                .is_some_and(|text| text.trim().eq_ignore_ascii_case(answers::YES)),
            ValueTest::Answered => !cell.is_missing(),
            ValueTest::AnsweredExceptNo => {
                !cell.is_missing() && cell.as_text().map(str::trim) != Some(answers::EXPLICIT_NO)
            }
            ValueTest::Equals(literal) => {
                cell.category_label().as_deref() == Some(literal.as_str())
            }
            ValueTest::AnyOfLiterals(literals) => cell
                .category_label()
                .is_some_and(|label| literals.iter().any(|literal| *literal == label)),
            ValueTest::ContainsInsensitive(token) => cell.as_text().is_some_and(|text| {
                text.to_lowercase().contains(token.to_lowercase().as_str())
            }),
        }
    }
}

/// Row predicate used by [`Recipe::ConditionalRatio`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Test one column's cell.
    Column {
        /// Column holding the cell under test.
        column: ColumnName,
        /// Test applied to the cell.
        test: ValueTest,
    },
    /// Pass when the test holds for *any* of the listed columns.
    AnyColumn {
        /// Columns scanned in order.
        columns: Vec<ColumnName>,
        /// Test applied to each cell.
        test: ValueTest,
    },
    /// Invert another predicate.
    Not(Box<Predicate>),
    /// Pass every row.
    All,
}

impl Predicate {
    /// Single-column predicate.
    pub fn column(column: impl Into<ColumnName>, test: ValueTest) -> Self {
        Predicate::Column {
            column: column.into(),
            test,
        }
    }

    /// Any-of-columns predicate.
    pub fn any_column<I, C>(columns: I, test: ValueTest) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnName>,
    {
        Predicate::AnyColumn {
            columns: columns.into_iter().map(Into::into).collect(),
            test,
        }
    }

    /// Negation of this predicate.
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluate against one row.
    pub fn matches(&self, row: &Row<'_>) -> bool {
        match self {
            Predicate::Column { column, test } => test.passes(row.get(column)),
            Predicate::AnyColumn { columns, test } => {
                columns.iter().any(|column| test.passes(row.get(column)))
            }
            Predicate::Not(inner) => !inner.matches(row),
            Predicate::All => true,
        }
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Column { column, .. } => out.push(column.as_str()),
            Predicate::AnyColumn { columns, .. } => {
                out.extend(columns.iter().map(String::as_str))
            }
            Predicate::Not(inner) => inner.collect_columns(out),
            Predicate::All => {}
        }
    }

    fn count(&self, dataset: &Dataset) -> usize {
        dataset.rows().filter(|row| self.matches(row)).count()
    }
}

/// A named aggregation over the filtered row set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Recipe {
    /// Numeric sum across all rows; an empty set sums to 0.
    Sum(ColumnName),
    /// Arithmetic mean; an empty set is `NotApplicable`, never 0.
    Mean(ColumnName),
    /// Number of distinct non-missing labels.
    CountDistinct(ColumnName),
    /// `numerator` count over `denominator` count, times 100.
    ///
    /// A zero denominator yields `NoData` rather than a division error.
    ConditionalRatio {
        /// Predicate counted in the numerator.
        numerator: Predicate,
        /// Predicate counted in the denominator.
        denominator: Predicate,
    },
    /// Difference of a resolved metric between two periods.
    ///
    /// If either side is missing the delta is `Suppressed`; showing `+0pp`
    /// would imply "no change" when the truth is "no data".
    PeriodDelta {
        /// Metric looked up in the long-format table.
        metric_key: MetricKey,
        /// Baseline period.
        from: Period,
        /// Comparison period.
        to: Period,
    },
}

impl Recipe {
    /// Share of `yes` answers over all answered-except-explicit-`No` rows.
    ///
    /// This is the still-housed / rent-affordability shape: the numerator is
    /// case-insensitive `yes`, the denominator excludes the exact literal
    /// `No`. See [`ValueTest::AnsweredExceptNo`] for why the exclusion is
    /// asymmetric.
    pub fn yes_share_excluding_explicit_no(column: impl Into<ColumnName>) -> Self {
        let column = column.into();
        Recipe::ConditionalRatio {
            numerator: Predicate::column(column.clone(), ValueTest::YesInsensitive),
            denominator: Predicate::column(column, ValueTest::AnsweredExceptNo),
        }
    }

    /// Share of rows passing `test` over all answered rows in `column`.
    pub fn answered_share(column: impl Into<ColumnName>, test: ValueTest) -> Self {
        let column = column.into();
        Recipe::ConditionalRatio {
            numerator: Predicate::column(column.clone(), test),
            denominator: Predicate::column(column, ValueTest::Answered),
        }
    }

    /// Columns this recipe reads from the dataset.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        match self {
            Recipe::Sum(column) | Recipe::Mean(column) | Recipe::CountDistinct(column) => {
                columns.push(column.as_str());
            }
            Recipe::ConditionalRatio {
                numerator,
                denominator,
            } => {
                numerator.collect_columns(&mut columns);
                denominator.collect_columns(&mut columns);
            }
            Recipe::PeriodDelta { .. } => {}
        }
        columns
    }

    /// True when every referenced column exists in the dataset schema.
    pub fn columns_present(&self, dataset: &Dataset) -> bool {
        self.referenced_columns()
            .iter()
            .all(|column| dataset.has_column(column))
    }
}

/// Computed scalar plus the sentinel states a dashboard must render
/// distinctly.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AggregateValue {
    /// A concrete number.
    Value(f64),
    /// Nothing to average; renders as `N/A`, never as 0.
    NotApplicable,
    /// Ratio with an empty denominator; numerically 0, flagged "no data".
    NoData,
    /// Trend delta with a missing side; not rendered at all.
    Suppressed,
}

impl AggregateValue {
    /// Numeric view for hosts that only consume numbers.
    ///
    /// `NoData` reports 0.0 (the defined ratio result); `NotApplicable` and
    /// `Suppressed` have no numeric reading.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            AggregateValue::Value(value) => Some(*value),
            AggregateValue::NoData => Some(0.0),
            AggregateValue::NotApplicable | AggregateValue::Suppressed => None,
        }
    }

    /// True for the concrete-number variant.
    pub fn is_value(&self) -> bool {
        matches!(self, AggregateValue::Value(_))
    }
}

/// Formatting intent attached to a computed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    /// Whole-number count with thousands grouping.
    Count,
    /// Currency amount, two decimals.
    Currency,
    /// Percentage, one decimal.
    Percent,
    /// Signed percentage-point delta.
    PercentagePoints,
    /// Score out of five, one decimal.
    ScoreOutOfFive,
    /// Bare number, minimal formatting.
    Plain,
}

/// Numerator/denominator counts behind a ratio, kept for `(yes/total)`
/// style display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioDetail {
    /// Rows counted in the numerator.
    pub numerator: usize,
    /// Rows counted in the denominator.
    pub denominator: usize,
}

/// A computed scalar plus its formatting intent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// The computed value or sentinel.
    pub value: AggregateValue,
    /// How the display layer should format it.
    pub format: ValueFormat,
    /// Ratio counts, when the recipe was a ratio.
    pub detail: Option<RatioDetail>,
}

impl AggregateResult {
    fn plain(value: AggregateValue, format: ValueFormat) -> Self {
        Self {
            value,
            format,
            detail: None,
        }
    }
}

/// Evaluate `recipe` against `dataset`, tagging the result with `format`.
pub fn aggregate(dataset: &Dataset, recipe: &Recipe, format: ValueFormat) -> AggregateResult {
    match recipe {
        Recipe::Sum(column) => {
            let total: f64 = dataset.rows().filter_map(|row| row.number(column)).sum();
            AggregateResult::plain(AggregateValue::Value(total), format)
        }
        Recipe::Mean(column) => {
            let values: Vec<f64> = dataset.rows().filter_map(|row| row.number(column)).collect();
            if values.is_empty() {
                AggregateResult::plain(AggregateValue::NotApplicable, format)
            } else {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                AggregateResult::plain(AggregateValue::Value(mean), format)
            }
        }
        Recipe::CountDistinct(column) => {
            let mut seen: Vec<CategoryValue> = dataset
                .rows()
                .filter_map(|row| row.category(column))
                .collect();
            seen.sort_unstable();
            seen.dedup();
            AggregateResult::plain(AggregateValue::Value(seen.len() as f64), format)
        }
        Recipe::ConditionalRatio {
            numerator,
            denominator,
        } => {
            let denominator_count = denominator.count(dataset);
            let numerator_count = numerator.count(dataset);
            let detail = Some(RatioDetail {
                numerator: numerator_count,
                denominator: denominator_count,
            });
            let value = if denominator_count == 0 {
                AggregateValue::NoData
            } else {
                AggregateValue::Value(numerator_count as f64 / denominator_count as f64 * 100.0)
            };
            AggregateResult {
                value,
                format,
                detail,
            }
        }
        Recipe::PeriodDelta {
            metric_key,
            from,
            to,
        } => {
            let table = MetricTable::new(dataset);
            let value = match (
                table.try_resolve(metric_key, *from),
                table.try_resolve(metric_key, *to),
            ) {
                (Some(baseline), Some(current)) => AggregateValue::Value(current - baseline),
                _ => AggregateValue::Suppressed,
            };
            AggregateResult::plain(value, format)
        }
    }
}
