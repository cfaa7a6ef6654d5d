use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub const NOT_AVAILABLE: &str = "N/A";
const CURRENCY_PREFIX: &str = "NT$";

/// Whole-unit currency string, e.g. `NT$1,234,567`.
pub fn format_currency(amount: impl Into<Option<f64>>) -> String {
    let Some(amount) = finite(amount) else {
        return NOT_AVAILABLE.to_string();
    };
    let fixed = round_fixed(amount, 0);
    match fixed.strip_prefix('-') {
        Some(digits) => format!("-{CURRENCY_PREFIX}{}", group_thousands(digits)),
        None => format!("{CURRENCY_PREFIX}{}", group_thousands(&fixed)),
    }
}

/// Fixed-point percentage, e.g. `12.35%`.
pub fn format_percentage(value: impl Into<Option<f64>>, decimals: u32) -> String {
    match finite(value) {
        Some(value) => format!("{}%", round_fixed(value, decimals)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Thousands-grouped fixed-point number, e.g. `1,234.5`.
pub fn format_number(value: impl Into<Option<f64>>, decimals: u32) -> String {
    match finite(value) {
        Some(value) => group_thousands(&round_fixed(value, decimals)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn finite(value: impl Into<Option<f64>>) -> Option<f64> {
    value.into().filter(|value| value.is_finite())
}

/// Rounds half away from zero on the shortest decimal form of `value`, so
/// `12.345` rounds to `12.35` even though its binary value sits just below.
fn round_fixed(value: f64, decimals: u32) -> String {
    let rendered = match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => {
            let mut rounded =
                decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(decimals);
            rounded.to_string()
        }
        // Beyond Decimal's range; fall back to the float formatter.
        Err(_) => format!("{value:.prec$}", prec = decimals as usize),
    };
    strip_negative_zero(rendered)
}

fn strip_negative_zero(rendered: String) -> String {
    match rendered.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => rendered,
    }
}

/// Inserts `,` every three digits of the integer part.
fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
