/// Name of a column in a dataset schema.
/// Examples: `ZAPIER_Gender`, `Organisation Code`, `Total monthly rent`
pub type ColumnName = String;
/// Logical identifier for a displayed metric.
/// Examples: `still_housed_3mo`, `total_disbursed`, `avg_monthly_income`
pub type MetricKey = String;
/// Identifier for the source that produced a dataset.
/// Examples: `merged_csv`, `pillar_kpis`, `fixture`
pub type SourceId = String;
/// Identifier for a pillar (one dashboard page per pillar).
/// Examples: `reach_demographics`, `housing_stability`, `financial_impact`
pub type PillarId = String;
/// Human-facing label attached to a KPI or chart.
/// Examples: `Still Housed (3mo)`, `Avg. Monthly Rent`
pub type DisplayLabel = String;
/// Normalized categorical cell value used for grouping and membership tests.
/// Examples: `Female`, `NSW`, `Renting the same property`
pub type CategoryValue = String;
