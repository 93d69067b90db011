//! Conversion between free-text currency fields and [`Decimal`] amounts.
//!
//! Parsing is deliberately forgiving: symbols, separators and stray letters
//! are stripped, and anything that still fails to parse becomes zero. A
//! currency field can never make a calculation fail.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::warn;

use crate::calculations::common::round_half_up;

static NON_AMOUNT_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.]").expect("static pattern"));
static NON_DIGIT_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("static pattern"));

/// Largest amount a field may hold. Anything above it is treated as
/// unparseable, which keeps every sum and product in the calculators far
/// inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000000);

/// Parses a currency field, keeping digits and the decimal point.
///
/// Only the leading number is used: a second `.` ends it. Empty or
/// unparseable text yields zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::calculations::currency::parse_amount;
///
/// assert_eq!(parse_amount("$1,234.50"), dec!(1234.50));
/// assert_eq!(parse_amount("7.5%"), dec!(7.5));
/// assert_eq!(parse_amount(""), dec!(0));
/// assert_eq!(parse_amount("n/a"), dec!(0));
/// ```
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned = NON_AMOUNT_CHARS.replace_all(text, "");
    let mut parts = cleaned.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();

    if whole.is_empty() && fraction.is_empty() {
        if !text.trim().is_empty() {
            warn!(input = %text, "amount has no numeric content; treating as zero");
        }
        return Decimal::ZERO;
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let candidate = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };

    match candidate.parse() {
        Ok(value) => bounded(value, text),
        Err(e) => {
            warn!(input = %text, error = %e, "amount could not be parsed; treating as zero");
            Decimal::ZERO
        }
    }
}

/// Parses a whole-dollar field, keeping digits only.
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::calculations::currency::parse_whole_amount;
///
/// assert_eq!(parse_whole_amount("$250,000"), dec!(250000));
/// ```
pub fn parse_whole_amount(text: &str) -> Decimal {
    let cleaned = NON_DIGIT_CHARS.replace_all(text, "");
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    match cleaned.parse() {
        Ok(value) => bounded(value, text),
        Err(e) => {
            warn!(input = %text, error = %e, "whole amount could not be parsed; treating as zero");
            Decimal::ZERO
        }
    }
}

fn bounded(
    value: Decimal,
    text: &str,
) -> Decimal {
    if value > MAX_AMOUNT {
        warn!(input = %text, max = %MAX_AMOUNT, "amount out of range; treating as zero");
        return Decimal::ZERO;
    }
    value
}

/// Formats an amount as whole dollars with thousands separators.
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::calculations::currency::format_amount;
///
/// assert_eq!(format_amount(dec!(1234567)), "$1,234,567");
/// assert_eq!(format_amount(dec!(0)), "$0");
/// assert_eq!(format_amount(dec!(-2500.5)), "-$2,501");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", group_thousands(&digits))
}

/// Formats a raw field for redisplay. Empty text stays empty so the input's
/// placeholder shows; an explicit zero renders as `$0`.
pub fn format_field(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    format_amount(parse_amount(text))
}

/// Formats an optional amount, empty when absent.
pub fn format_optional_amount(value: Option<Decimal>) -> String {
    value.map(format_amount).unwrap_or_default()
}

/// Formats a ratio to two decimal places, or `N/A` when it is undefined.
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::calculations::currency::format_ratio;
///
/// assert_eq!(format_ratio(Some(dec!(185000) / dec!(30000))), "6.17");
/// assert_eq!(format_ratio(Some(dec!(1.5))), "1.50");
/// assert_eq!(format_ratio(None), "N/A");
/// ```
pub fn format_ratio(value: Option<Decimal>) -> String {
    match value {
        Some(ratio) => format!("{:.2}", round_half_up(ratio)),
        None => "N/A".to_string(),
    }
}

/// Formats a fraction as a percentage with one decimal place, or `N/A`.
pub fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(fraction) => {
            let percent = (fraction * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            format!("{percent:.1}%")
        }
        None => "N/A".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
