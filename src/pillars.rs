//! Declarative pillar pages.
//!
//! In the live product each pillar is one dashboard page. Instead of one-off
//! aggregation code per page, a [`PillarSpec`] declares the page as data:
//! which columns its sidebar filters, which named KPIs it shows and under
//! which recipe, and which grouped tables feed its charts. Evaluation is a
//! single generic pass shared by every page.

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, AggregateResult, Predicate, Recipe, ValueFormat, ValueTest};
use crate::constants::{answers, survey};
use crate::data::Dataset;
use crate::filter::FilterSelection;
use crate::tables::{numeric_values, paired_values, value_counts, CountOrder, CountRow};
use crate::types::{ColumnName, DisplayLabel, MetricKey, PillarId};

/// Which dataset a KPI is computed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterScope {
    /// The sidebar-filtered rows (the default).
    Filtered,
    /// The full dataset, ignoring the sidebar.
    ///
    /// Program-reach headline counts are reported against everyone enrolled,
    /// not the filtered subset.
    Unfiltered,
}

/// One named KPI on a pillar page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiSpec {
    /// Stable metric identifier.
    pub key: MetricKey,
    /// Label shown on the summary card.
    pub label: DisplayLabel,
    /// Aggregation recipe.
    pub recipe: Recipe,
    /// Formatting intent for the computed value.
    pub format: ValueFormat,
    /// Dataset scope.
    pub scope: FilterScope,
    /// Stand-in evaluated when the primary recipe's columns are absent.
    pub fallback: Option<Box<KpiSpec>>,
}

impl KpiSpec {
    /// A filtered-scope KPI with no fallback.
    pub fn new(
        key: impl Into<MetricKey>,
        label: impl Into<DisplayLabel>,
        recipe: Recipe,
        format: ValueFormat,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            recipe,
            format,
            scope: FilterScope::Filtered,
            fallback: None,
        }
    }

    /// Compute against the full dataset instead of the filtered rows.
    pub fn unfiltered(mut self) -> Self {
        self.scope = FilterScope::Unfiltered;
        self
    }

    /// Attach a fallback KPI used when this recipe's columns are absent.
    pub fn with_fallback(mut self, fallback: KpiSpec) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Walk the fallback chain to the first spec whose columns exist.
    ///
    /// The last spec in the chain is used regardless, so a fully absent
    /// schema still degrades to the recipe's own sentinel.
    fn active_spec(&self, dataset: &Dataset) -> &KpiSpec {
        let mut spec = self;
        while !spec.recipe.columns_present(dataset) {
            match spec.fallback.as_deref() {
                Some(fallback) => spec = fallback,
                None => break,
            }
        }
        spec
    }
}

/// Shape of one chart's backing table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChartKind {
    /// Grouped category counts (bar/pie charts).
    Categories {
        /// Column grouped on.
        column: ColumnName,
        /// Ordering of the grouped table.
        order: CountOrder,
    },
    /// Raw numeric values (histograms).
    Distribution {
        /// Column sampled.
        column: ColumnName,
    },
    /// Paired numeric values (scatter plots).
    Scatter {
        /// X-axis column.
        x: ColumnName,
        /// Y-axis column.
        y: ColumnName,
    },
}

/// One chart slot on a pillar page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Stable chart identifier.
    pub key: MetricKey,
    /// Title shown above the chart.
    pub title: DisplayLabel,
    /// Backing table shape.
    pub kind: ChartKind,
}

/// A full pillar page declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PillarSpec {
    /// Stable pillar identifier.
    pub id: PillarId,
    /// Page title.
    pub title: DisplayLabel,
    /// Columns offered as sidebar filters on this page.
    pub filter_columns: Vec<ColumnName>,
    /// Summary-card KPIs, in display order.
    pub kpis: Vec<KpiSpec>,
    /// Charts, in display order.
    pub charts: Vec<ChartSpec>,
}

/// A computed KPI ready for a summary card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiValue {
    /// Identifier of the spec that was actually evaluated (the fallback's
    /// when the primary columns were absent).
    pub key: MetricKey,
    /// Label of the evaluated spec.
    pub label: DisplayLabel,
    /// The computed result.
    pub result: AggregateResult,
}

/// Chart-ready data emitted for one chart slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChartData {
    /// Grouped counts.
    Categories(Vec<CountRow>),
    /// Raw numeric values.
    Values(Vec<f64>),
    /// Paired numeric values.
    Points(Vec<(f64, f64)>),
}

/// One evaluated chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartTable {
    /// Chart identifier from the spec.
    pub key: MetricKey,
    /// Chart title from the spec.
    pub title: DisplayLabel,
    /// The backing data.
    pub data: ChartData,
}

/// Everything a renderer needs for one pillar page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PillarReport {
    /// Pillar identifier.
    pub id: PillarId,
    /// Page title.
    pub title: DisplayLabel,
    /// Rows remaining after the sidebar selection.
    pub filtered_rows: usize,
    /// Computed KPIs in display order.
    pub kpis: Vec<KpiValue>,
    /// Computed chart tables in display order.
    pub charts: Vec<ChartTable>,
}

/// Evaluate a pillar page against a dataset and the current sidebar state.
pub fn evaluate_pillar(
    spec: &PillarSpec,
    full: &Dataset,
    selection: &FilterSelection,
) -> PillarReport {
    let filtered = selection.apply(full);
    let kpis = spec
        .kpis
        .iter()
        .map(|kpi| {
            let scope_dataset = match kpi.scope {
                FilterScope::Filtered => &filtered,
                FilterScope::Unfiltered => full,
            };
            let active = kpi.active_spec(scope_dataset);
            KpiValue {
                key: active.key.clone(),
                label: active.label.clone(),
                result: aggregate(scope_dataset, &active.recipe, active.format),
            }
        })
        .collect();
    let charts = spec
        .charts
        .iter()
        .map(|chart| {
            let data = match &chart.kind {
                ChartKind::Categories { column, order } => {
                    ChartData::Categories(value_counts(&filtered, column, *order))
                }
                ChartKind::Distribution { column } => {
                    ChartData::Values(numeric_values(&filtered, column))
                }
                ChartKind::Scatter { x, y } => ChartData::Points(paired_values(&filtered, x, y)),
            };
            ChartTable {
                key: chart.key.clone(),
                title: chart.title.clone(),
                data,
            }
        })
        .collect();
    PillarReport {
        id: spec.id.clone(),
        title: spec.title.clone(),
        filtered_rows: filtered.len(),
        kpis,
        charts,
    }
}

/// The three standard pillar pages of the participant dashboard.
pub fn standard_pillars() -> Vec<PillarSpec> {
    vec![
        reach_demographics(),
        housing_stability(),
        financial_impact(),
    ]
}

fn reach_demographics() -> PillarSpec {
    PillarSpec {
        id: "reach_demographics".into(),
        title: "Program Reach & Demographics".into(),
        filter_columns: vec![
            survey::GENDER.into(),
            survey::ORGANISATION.into(),
            survey::AGE_GROUP.into(),
            survey::STATE.into(),
        ],
        kpis: vec![
            KpiSpec::new(
                "total_participants",
                "Total Participants",
                Recipe::CountDistinct(survey::IDENTIFIER.into()),
                ValueFormat::Count,
            )
            .unfiltered(),
            KpiSpec::new(
                "avg_age",
                "Avg. Age",
                Recipe::Mean(survey::AGE.into()),
                ValueFormat::Plain,
            ),
            KpiSpec::new(
                "avg_dependents",
                "Avg. Dependents",
                Recipe::Mean(survey::DEPENDENTS.into()),
                ValueFormat::Plain,
            ),
            KpiSpec::new(
                "org_count",
                "Org Count",
                Recipe::CountDistinct(survey::ORGANISATION.into()),
                ValueFormat::Count,
            ),
            KpiSpec::new(
                "avg_monthly_rent",
                "Avg. Monthly Rent",
                Recipe::Mean(survey::MONTHLY_RENT.into()),
                ValueFormat::Currency,
            ),
            KpiSpec::new(
                "avg_monthly_income",
                "Avg. Monthly Income",
                Recipe::Mean(survey::MONTHLY_INCOME.into()),
                ValueFormat::Currency,
            ),
        ],
        charts: vec![
            ChartSpec {
                key: "age_distribution".into(),
                title: "Age Distribution".into(),
                kind: ChartKind::Categories {
                    column: survey::AGE.into(),
                    order: CountOrder::ByCategory,
                },
            },
            ChartSpec {
                key: "gender_distribution".into(),
                title: "Gender Distribution of Participants".into(),
                kind: ChartKind::Categories {
                    column: survey::GENDER.into(),
                    order: CountOrder::ByCountDesc,
                },
            },
            ChartSpec {
                key: "participants_by_state".into(),
                title: "Participant Distribution by State".into(),
                kind: ChartKind::Categories {
                    column: survey::STATE.into(),
                    order: CountOrder::ByCategory,
                },
            },
            ChartSpec {
                key: "dependents_distribution".into(),
                title: "Number of Dependents".into(),
                kind: ChartKind::Categories {
                    column: survey::DEPENDENTS.into(),
                    order: CountOrder::ByCategory,
                },
            },
            ChartSpec {
                key: "uptake_by_org".into(),
                title: "Program Uptake by Referral Org".into(),
                kind: ChartKind::Categories {
                    column: survey::ORGANISATION.into(),
                    order: CountOrder::ByCountDesc,
                },
            },
            ChartSpec {
                key: "rent_vs_income".into(),
                title: "Entry Rent & Income".into(),
                kind: ChartKind::Scatter {
                    x: survey::MONTHLY_RENT.into(),
                    y: survey::MONTHLY_INCOME.into(),
                },
            },
        ],
    }
}

fn housing_stability() -> PillarSpec {
    let safe_top = || {
        ValueTest::AnyOfLiterals(
            answers::SAFE_TOP_BUCKETS
                .iter()
                .map(|bucket| bucket.to_string())
                .collect(),
        )
    };
    PillarSpec {
        id: "housing_stability".into(),
        title: "Housing Stability & Participant Outcomes".into(),
        filter_columns: vec![
            survey::GENDER.into(),
            survey::ORGANISATION.into(),
            survey::AGE_GROUP.into(),
        ],
        kpis: vec![
            KpiSpec::new(
                "still_housed_3mo",
                "Still Housed (3mo)",
                Recipe::yes_share_excluding_explicit_no(survey::STILL_HOUSED_3MO),
                ValueFormat::Percent,
            ),
            KpiSpec::new(
                "still_housed_6mo",
                "Still Housed (6mo)",
                Recipe::yes_share_excluding_explicit_no(survey::STILL_HOUSED_6MO),
                ValueFormat::Percent,
            ),
            KpiSpec::new(
                "rent_affordable_3mo",
                "Rent Affordable (3mo)",
                Recipe::yes_share_excluding_explicit_no(survey::RENT_AFFORDABLE_3MO),
                ValueFormat::Percent,
            ),
            KpiSpec::new(
                "rent_affordable_6mo",
                "Rent Affordable (6mo)",
                Recipe::yes_share_excluding_explicit_no(survey::RENT_AFFORDABLE_6MO),
                ValueFormat::Percent,
            ),
            KpiSpec::new(
                "safe_at_home_3mo",
                "Feel Safe at Home (3mo)",
                Recipe::answered_share(survey::SAFE_AT_HOME_3MO, safe_top()),
                ValueFormat::Percent,
            ),
            KpiSpec::new(
                "safe_in_area_3mo",
                "Feel Safe in Area (3mo)",
                Recipe::answered_share(survey::SAFE_IN_AREA_3MO, safe_top()),
                ValueFormat::Percent,
            ),
        ],
        charts: vec![
            ChartSpec {
                key: "housing_situation_3mo".into(),
                title: "Housing Situation (3 Months)".into(),
                kind: ChartKind::Categories {
                    column: survey::HOUSING_SITUATION_3MO.into(),
                    order: CountOrder::ByCountDesc,
                },
            },
            ChartSpec {
                key: "housing_situation_6mo".into(),
                title: "Housing Situation (6 Months)".into(),
                kind: ChartKind::Categories {
                    column: survey::HOUSING_SITUATION_6MO.into(),
                    order: CountOrder::ByCountDesc,
                },
            },
            ChartSpec {
                key: "safety_at_home_3mo".into(),
                title: "Safety at Home (3mo)".into(),
                kind: ChartKind::Categories {
                    column: survey::SAFE_AT_HOME_3MO.into(),
                    order: CountOrder::ByCountDesc,
                },
            },
            ChartSpec {
                key: "safety_in_area_3mo".into(),
                title: "Safety in Area (3mo)".into(),
                kind: ChartKind::Categories {
                    column: survey::SAFE_IN_AREA_3MO.into(),
                    order: CountOrder::ByCountDesc,
                },
            },
        ],
    }
}

fn financial_impact() -> PillarSpec {
    PillarSpec {
        id: "financial_impact".into(),
        title: "Financial & Social Impact".into(),
        filter_columns: vec![
            survey::GENDER.into(),
            survey::ORGANISATION.into(),
            survey::AGE_GROUP.into(),
        ],
        kpis: vec![
            KpiSpec::new(
                "total_disbursed",
                "Total Disbursed",
                Recipe::Sum(survey::TOTAL_DISBURSED.into()),
                ValueFormat::Currency,
            ),
            KpiSpec::new(
                "improved_ability",
                "% Reporting Improved Ability",
                Recipe::answered_share(
                    survey::FINANCIAL_CONFIDENCE_3MO,
                    ValueTest::ContainsInsensitive(answers::IMPROVED_TOKEN.into()),
                ),
                ValueFormat::Percent,
            )
            .with_fallback(KpiSpec::new(
                "not_struggling_bills",
                "% Not Struggling to Pay Bills",
                Recipe::ConditionalRatio {
                    numerator: Predicate::any_column(
                        survey::BILL_STRUGGLE_3MO,
                        ValueTest::YesInsensitive,
                    )
                    .negate(),
                    denominator: Predicate::All,
                },
                ValueFormat::Percent,
            )),
            KpiSpec::new(
                "essential_items",
                "Essential Items Provided",
                Recipe::Sum(survey::ESSENTIAL_ITEMS.into()),
                ValueFormat::Count,
            ),
            KpiSpec::new(
                "volunteer_interactions",
                "Volunteer Interactions",
                Recipe::Sum(survey::VOLUNTEER_INTERACTIONS.into()),
                ValueFormat::Count,
            ),
        ],
        charts: vec![
            ChartSpec {
                key: "disbursed_distribution".into(),
                title: "Distribution of Individual Disbursed Amounts".into(),
                kind: ChartKind::Distribution {
                    column: survey::TOTAL_DISBURSED.into(),
                },
            },
            ChartSpec {
                key: "financial_confidence_3mo".into(),
                title: "Participants' Financial Confidence (3mo Survey)".into(),
                kind: ChartKind::Categories {
                    column: survey::FINANCIAL_CONFIDENCE_3MO.into(),
                    order: CountOrder::ByCountDesc,
                },
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateValue;
    use crate::data::FieldValue;

    fn participant(id: &str, gender: &str, confidence: Option<&str>) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(id.into()),
            FieldValue::Text(gender.into()),
            match confidence {
                Some(text) => FieldValue::Text(text.into()),
                None => FieldValue::Missing,
            },
        ]
    }

    fn confidence_dataset() -> Dataset {
        Dataset::from_rows(
            [
                survey::IDENTIFIER,
                survey::GENDER,
                survey::FINANCIAL_CONFIDENCE_3MO,
            ],
            vec![
                participant("p1", "Female", Some("I now feel I have it covered")),
                participant("p2", "Male", Some("Still worried")),
                participant("p3", "Female", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn standard_pillars_cover_the_three_pages() {
        let pillars = standard_pillars();
        let ids: Vec<&str> = pillars.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["reach_demographics", "housing_stability", "financial_impact"]
        );
        assert!(pillars.iter().all(|p| !p.kpis.is_empty()));
    }

    #[test]
    fn total_participants_ignores_the_sidebar() {
        let dataset = confidence_dataset();
        let selection = FilterSelection::new().any_of(survey::GENDER, ["Female"]);
        let report = evaluate_pillar(&reach_demographics(), &dataset, &selection);
        assert_eq!(report.filtered_rows, 2);
        let total = report
            .kpis
            .iter()
            .find(|kpi| kpi.key == "total_participants")
            .unwrap();
        assert_eq!(total.result.value, AggregateValue::Value(3.0));
    }

    #[test]
    fn improved_ability_uses_the_confidence_column_when_present() {
        let dataset = confidence_dataset();
        let report = evaluate_pillar(&financial_impact(), &dataset, &FilterSelection::new());
        let kpi = report
            .kpis
            .iter()
            .find(|kpi| kpi.key == "improved_ability")
            .unwrap();
        assert_eq!(kpi.result.value, AggregateValue::Value(50.0));
    }

    #[test]
    fn absent_confidence_column_engages_the_bill_fallback() {
        let dataset = Dataset::from_rows(
            [survey::IDENTIFIER, survey::BILL_STRUGGLE_3MO[0]],
            vec![
                vec![FieldValue::Text("p1".into()), FieldValue::Text("Yes".into())],
                vec![FieldValue::Text("p2".into()), FieldValue::Missing],
            ],
        )
        .unwrap();
        let report = evaluate_pillar(&financial_impact(), &dataset, &FilterSelection::new());
        let kpi = report
            .kpis
            .iter()
            .find(|kpi| kpi.key == "not_struggling_bills")
            .expect("fallback KPI reported under its own key");
        assert_eq!(kpi.label, "% Not Struggling to Pay Bills");
        assert_eq!(kpi.result.value, AggregateValue::Value(50.0));
    }

    #[test]
    fn charts_follow_the_filtered_rows() {
        let dataset = confidence_dataset();
        let selection = FilterSelection::new().any_of(survey::GENDER, ["Female"]);
        let report = evaluate_pillar(&financial_impact(), &dataset, &selection);
        let chart = report
            .charts
            .iter()
            .find(|chart| chart.key == "financial_confidence_3mo")
            .unwrap();
        match &chart.data {
            ChartData::Categories(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].count, 1);
            }
            other => panic!("expected category table, got {other:?}"),
        }
    }
}
