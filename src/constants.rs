/// Constants used by the long-format KPI table (one row per metric/period).
pub mod columns {
    /// Metric-name column in the long-format dataset.
    pub const METRIC_NAME: &str = "Agg_Metric";
    /// Metric-value column in the long-format dataset.
    pub const METRIC_VALUE: &str = "Agg_Value";
    /// Record-date column used to derive period buckets.
    pub const RECORD_DATE: &str = "Date";
    /// Pillar grouping column in the long-format dataset.
    pub const PILLAR: &str = "Pillar";
}

/// Canonical column names from the merged participant survey export.
///
/// The survey platform emits verbose question text as headers; these are kept
/// verbatim so datasets load without a rename pass.
pub mod survey {
    /// Participant identifier used for uniqueness counts.
    pub const IDENTIFIER: &str = "IDENTIFIER";
    /// Participant gender.
    pub const GENDER: &str = "ZAPIER_Gender";
    /// Participant age in years.
    pub const AGE: &str = "ZAPIER_Age";
    /// Participant age bucket.
    pub const AGE_GROUP: &str = "ZAPIER_Age Group";
    /// Number of dependents.
    pub const DEPENDENTS: &str = "ZAPIER_Dependents";
    /// Referral organisation code.
    pub const ORGANISATION: &str = "Organisation Code";
    /// State/territory code.
    pub const STATE: &str = "State Code";
    /// Monthly rent at program entry.
    pub const MONTHLY_RENT: &str = "Total monthly rent";
    /// Monthly income at program entry.
    pub const MONTHLY_INCOME: &str = "Monthly Income";
    /// Total rent/bond amount disbursed to the participant.
    pub const TOTAL_DISBURSED: &str = "ZAPIER_Total Bill Amount";
    /// Count of essential items provided.
    pub const ESSENTIAL_ITEMS: &str = "Essential items count";
    /// Count of volunteer interactions.
    pub const VOLUNTEER_INTERACTIONS: &str = "Volunteer interactions";

    /// 3-month survey: still living in the approved property.
    pub const STILL_HOUSED_3MO: &str =
        "SM3_I am still living in the same property that I was when I got approved for Kickstarter";
    /// 6-month survey: still living in the approved property.
    pub const STILL_HOUSED_6MO: &str =
        "SM6_I am still living in the same property that I was when I got approved for Kickstarter2";
    /// 3-month survey: current housing situation.
    pub const HOUSING_SITUATION_3MO: &str =
        "SM3_Which best describes where you are now living?This helps us understand if/how the Kickstarter payments have helped you.";
    /// 6-month survey: current housing situation.
    pub const HOUSING_SITUATION_6MO: &str =
        "SM6_Which best describes where you are now living?This helps us understand if/how the Kickstarter payments have helped you. The answer to your question will not affect your survey payment.";
    /// 3-month survey: can pay rent without program support.
    pub const RENT_AFFORDABLE_3MO: &str =
        "SM3_I feel I could pay my rent now, without getting an extra boost via the Kickstarter program.";
    /// 6-month survey: current rent is affordable.
    pub const RENT_AFFORDABLE_6MO: &str = "SM6_I feel my current rent is affordable for me.";
    /// 3-month survey: feels safe at home.
    pub const SAFE_AT_HOME_3MO: &str = "SM3_I feel safe in my current home:";
    /// 3-month survey: feels safe in the area.
    pub const SAFE_IN_AREA_3MO: &str = "SM3_I feel safe in the area I live:";
    /// 3-month survey: financial confidence covering rent and expenses.
    pub const FINANCIAL_CONFIDENCE_3MO: &str =
        "SM3_How do you feel about having enough money to pay your rent and cover all your other important expenses with what you currently have?";

    /// 3-month survey: bill-struggle columns scanned by the fallback
    /// "% not struggling" metric when no confidence column is present.
    pub const BILL_STRUGGLE_3MO: [&str; 5] = [
        "SM3_Electricity, gas or phone bill - No money to pay bills last 2 month",
        "SM3_Car repair, rego or insurance  - No money to pay bills last 2 month",
        "SM3_Food  - No money to pay bills last 2 month",
        "SM3_Credit card balance or debts, e.g. Afterpay  - No money to pay bills last 2 month",
        "SM3_All expenses  - No money to pay bills last 2 month",
    ];
}

/// Constants used by yes/no and likert answer evaluation.
pub mod answers {
    /// Affirmative answer, compared case-insensitively.
    pub const YES: &str = "yes";
    /// Exact literal excluded from "answered" denominators.
    ///
    /// Product rule inherited from the survey pipeline: a response of exactly
    /// `No` is excluded from the denominator, so the base is "all answered
    /// except explicit No" rather than "all answered".
    pub const EXPLICIT_NO: &str = "No";
    /// Likert buckets counted as a positive safety perception.
    pub const SAFE_TOP_BUCKETS: [&str; 2] = ["Always", "Usually"];
    /// Substring marking an "improved ability" confidence response.
    pub const IMPROVED_TOKEN: &str = "cover";
}

/// Constants used by display formatting.
pub mod format {
    /// Sentinel shown when a mean has no values to average.
    pub const NOT_APPLICABLE: &str = "N/A";
    /// Sentinel shown when a ratio has an empty denominator.
    pub const NO_DATA: &str = "no data";
    /// Currency symbol used for disbursement and rent/income figures.
    pub const CURRENCY_SYMBOL: &str = "$";
    /// Suffix for percentage-point trend deltas.
    pub const PP_SUFFIX: &str = "pp";
    /// Denominator label for score-out-of-five metrics.
    pub const SCORE_DENOMINATOR: &str = "/ 5";
}

/// Constants used by the dataset cache.
pub mod cache {
    /// Default snapshot time-to-live in seconds before a refresh is due.
    pub const DEFAULT_TTL_SECONDS: i64 = 900;
}

/// Constants used by dataset loading.
pub mod loader {
    /// Log message used when unreadable rows are skipped.
    pub const SKIP_UNREADABLE_MSG: &str = "skipping unreadable csv row";

    /// Date formats accepted when normalizing date columns, tried in order.
    pub const DATE_FORMATS: [&str; 5] = [
        "%Y-%m-%d", // 2024-10-15 (ISO)
        "%m/%d/%Y", // 02/25/2025
        "%d.%m.%Y", // 15.10.2024
        "%b %d, %Y", // Oct 15, 2024
        "%B %d, %Y", // October 15, 2024
    ];
}
