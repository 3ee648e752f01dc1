//! # Formatting Utilities
//!
//! Pure string helpers shared by the ledger (name normalization) and the
//! presentation layer (currency and date display).
//!
//! Display conventions follow Colombian usage: `.` groups thousands, `,`
//! separates decimals, dates read day/month/year.

use chrono::NaiveDate;

use crate::money::Money;

/// Trims surrounding whitespace.
#[inline]
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Normalizes a person's name to title case.
///
/// Words are split on single spaces, so repeated inner spaces survive as-is;
/// only the surrounding whitespace is trimmed.
///
/// ## Example
/// ```rust
/// use reserva_core::format::title_case;
///
/// assert_eq!(title_case("  ana LÓPEZ "), "Ana López");
/// ```
pub fn title_case(name: &str) -> String {
    name.trim()
        .split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rounds to `decimals` places, halves away from zero.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// `value` as a percentage of `total`; zero when `total` is not positive.
pub fn calculate_percentage(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

/// Formats an amount for display: `$1.500.000` or `$2.200.000,50`.
///
/// Cents are shown only when non-zero.
pub fn format_currency(amount: Money, symbol: &str) -> String {
    let sign = if amount.cents() < 0 { "-" } else { "" };
    let units = group_thousands(amount.units().unsigned_abs());
    if amount.cents_part() == 0 {
        format!("{sign}{symbol}{units}")
    } else {
        format!("{sign}{symbol}{units},{:02}", amount.cents_part())
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Formats a date for display as day/month/year without padding: `1/6/2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Parses an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
