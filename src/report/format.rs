use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::loan::round;

/// Formats `amount` with Indian digit grouping (`12,34,567.89`).
pub fn format_currency(amount: Decimal, symbol: &str, fraction_digits: u32) -> String {
    let rounded = round(amount.abs(), fraction_digits);
    let text = rounded.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let mut out = format!("{}{}{}", sign, symbol, group_indian(whole));
    if fraction_digits > 0 {
        out.push('.');
        out.push_str(fraction);
        for _ in fraction.len()..fraction_digits as usize {
            out.push('0');
        }
    }
    out
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (rest, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = rest.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&rest[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), last_three)
}

pub fn format_percent(rate: Decimal) -> String {
    let rounded = round(rate, 2);
    let text = rounded.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    format!("{}.{:0<2}%", whole, fraction)
}

/// Tenure in years, e.g. "5 Years" or "2.5 Years".
pub fn format_years(tenure_months: u32) -> String {
    let years = round(Decimal::from(tenure_months) / dec!(12), 2).normalize();
    let unit = if years == Decimal::ONE { "Year" } else { "Years" };
    format!("{} {}", years, unit)
}
