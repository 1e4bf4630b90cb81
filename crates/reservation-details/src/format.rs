//! French display formatting for amounts, dates and counts.
//!
//! Output follows the fr-FR conventions used on the back office: a narrow
//! no-break space groups thousands, a comma marks decimals and the currency
//! symbol trails after a no-break space (`1 234,56 €`).

use chrono::{Datelike, Timelike};

use crate::dates::parse_timestamp;
use crate::financial::DEFAULT_CURRENCY;

/// Thousands separator (U+202F NARROW NO-BREAK SPACE).
const GROUP_SEPARATOR: char = '\u{202F}';
/// Space between the amount and the symbol (U+00A0 NO-BREAK SPACE).
const SYMBOL_SEPARATOR: char = '\u{00A0}';

/// Placeholder for a missing or unreadable date.
pub const PLACEHOLDER: &str = "-";

const MONTHS_LONG: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

const MONTHS_SHORT: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.", "déc.",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePattern {
    /// `05 janvier 2025`
    #[default]
    Long,
    /// `05 janv. 2025`
    Short,
    /// `05 janv. 2025 à 14:30`
    DateTime,
}

// ── Currency ──────────────────────────────────────────────────────────────────

/// Upper-cased ISO code, or EUR when `code` is not three ASCII letters.
fn normalize_currency(code: &str) -> String {
    let code = code.trim();
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        code.to_ascii_uppercase()
    } else {
        DEFAULT_CURRENCY.to_string()
    }
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "EUR" => "€",
        "USD" => "$US",
        "GBP" => "£GB",
        other => other,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }
    out
}

/// `1234.5` in EUR is `1 234,50 €`. A missing amount formats as zero.
pub fn format_currency(amount: Option<f64>, currency: &str) -> String {
    let amount = amount.filter(|a| a.is_finite()).unwrap_or(0.0);
    let code = normalize_currency(currency);

    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.bytes().all(|b| b == b'0');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

    format!(
        "{sign}{},{frac_part}{SYMBOL_SEPARATOR}{}",
        group_thousands(int_part),
        currency_symbol(&code)
    )
}

/// Amount shown as a deduction whatever its stored sign (`-10,00 €`).
pub fn format_signed_currency(amount: f64, currency: &str) -> String {
    let formatted = format_currency(Some(amount.abs()), currency);
    if amount == 0.0 {
        formatted
    } else {
        format!("-{formatted}")
    }
}

/// Rounded integer percentage, `45%`.
pub fn format_percent(percent: f64) -> String {
    let rounded = if percent.is_finite() { percent.round() as i64 } else { 0 };
    format!("{rounded}%")
}

// ── Dates ─────────────────────────────────────────────────────────────────────

pub fn format_date(raw: Option<&str>, pattern: DatePattern) -> String {
    let Some(at) = raw.and_then(parse_timestamp) else {
        return PLACEHOLDER.to_string();
    };
    let month = at.month0() as usize;

    match pattern {
        DatePattern::Long => format!("{:02} {} {}", at.day(), MONTHS_LONG[month], at.year()),
        DatePattern::Short => format!("{:02} {} {}", at.day(), MONTHS_SHORT[month], at.year()),
        DatePattern::DateTime => format!(
            "{:02} {} {} à {:02}:{:02}",
            at.day(),
            MONTHS_SHORT[month],
            at.year(),
            at.hour(),
            at.minute()
        ),
    }
}

pub fn format_nights(nights: i64) -> String {
    if nights > 1 {
        format!("{nights} nuits")
    } else {
        format!("{nights} nuit")
    }
}
