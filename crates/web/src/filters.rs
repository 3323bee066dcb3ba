//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a menu price with two decimal places.
///
/// Usage in templates: `{{ item.price|price }}`
#[askama::filter_fn]
pub fn price(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_price(&value.to_string()))
}

fn format_price(raw: &str) -> String {
    raw.parse::<Decimal>()
        .map_or_else(|_| raw.to_string(), |d| format!("{:.2}", d.round_dp(2)))
}

#[cfg(test)]
mod tests {
    use super::format_price;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("3.5"), "3.50");
        assert_eq!(format_price("12.999"), "13.00");
        assert_eq!(format_price("250"), "250.00");
        assert_eq!(format_price("n/a"), "n/a");
    }
}
