//! Display formatting for computed results.
//!
//! The boundary with the rendering layer: results come in typed, strings go
//! out. No business meaning is derived here; sentinels were decided during
//! aggregation and are only spelled out.

use crate::aggregate::{AggregateResult, AggregateValue, ValueFormat};
use crate::constants::format as labels;

/// Format a result for display.
///
/// Returns `None` for suppressed values: the caller shows nothing at all
/// rather than an implied "+0pp no change".
pub fn format_result(result: &AggregateResult) -> Option<String> {
    let value = match result.value {
        AggregateValue::Suppressed => return None,
        AggregateValue::NotApplicable => return Some(labels::NOT_APPLICABLE.to_string()),
        AggregateValue::NoData => return Some(labels::NO_DATA.to_string()),
        AggregateValue::Value(value) => value,
    };
    let rendered = match result.format {
        ValueFormat::Count => format_count(value),
        ValueFormat::Currency => format_currency(value),
        ValueFormat::Percent => format_percent(value),
        ValueFormat::PercentagePoints => format_percentage_points(value),
        ValueFormat::ScoreOutOfFive => format_score(value),
        ValueFormat::Plain => format_plain(value),
    };
    match (result.format, result.detail) {
        (ValueFormat::Percent, Some(detail)) => Some(format!(
            "{rendered} ({}/{})",
            detail.numerator, detail.denominator
        )),
        _ => Some(rendered),
    }
}

/// Whole-number count with thousands grouping.
pub fn format_count(value: f64) -> String {
    group_thousands(value.round().abs() as u128, value < -0.5)
}

/// Currency amount with grouping and two decimals.
pub fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = group_thousands(cents / 100, false);
    let sign = if negative { "-" } else { "" };
    format!(
        "{sign}{}{whole}.{:02}",
        labels::CURRENCY_SYMBOL,
        cents % 100
    )
}

/// Percentage with one decimal.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Signed percentage-point delta with one decimal.
pub fn format_percentage_points(value: f64) -> String {
    format!("{value:+.1}{}", labels::PP_SUFFIX)
}

/// Score out of five with one decimal.
pub fn format_score(value: f64) -> String {
    format!("{value:.1} {}", labels::SCORE_DENOMINATOR)
}

fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

fn group_thousands(value: u128, negative: bool) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + raw.len() / 3 + 1);
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    if negative {
        grouped_reversed.push('-');
    }
    grouped_reversed.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RatioDetail;

    fn result(value: AggregateValue, format: ValueFormat) -> AggregateResult {
        AggregateResult {
            value,
            format,
            detail: None,
        }
    }

    #[test]
    fn formatting_helpers_are_stable() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(1_234_567.0), "1,234,567");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(-12.345), "-$12.35");
        assert_eq!(format_percent(82.345), "82.3%");
        assert_eq!(format_percentage_points(3.5), "+3.5pp");
        assert_eq!(format_percentage_points(-1.25), "-1.2pp");
        assert_eq!(format_score(4.25), "4.2 / 5");
    }

    #[test]
    fn sentinels_render_their_labels() {
        let na = result(AggregateValue::NotApplicable, ValueFormat::Currency);
        assert_eq!(format_result(&na).as_deref(), Some("N/A"));
        let none = result(AggregateValue::NoData, ValueFormat::Percent);
        assert_eq!(format_result(&none).as_deref(), Some("no data"));
    }

    #[test]
    fn suppressed_values_render_nothing() {
        let suppressed = result(AggregateValue::Suppressed, ValueFormat::PercentagePoints);
        assert_eq!(format_result(&suppressed), None);
    }

    #[test]
    fn percent_results_carry_ratio_detail() {
        let ratio = AggregateResult {
            value: AggregateValue::Value(100.0),
            format: ValueFormat::Percent,
            detail: Some(RatioDetail {
                numerator: 2,
                denominator: 2,
            }),
        };
        assert_eq!(format_result(&ratio).as_deref(), Some("100.0% (2/2)"));
    }
}
