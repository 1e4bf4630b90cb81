//! Tolerant numeric parsing.
//!
//! Amounts and counts arrive as JSON numbers or as strings depending on the
//! report version. These two functions are the only place that decides what
//! a field is worth; neither can fail, anything unreadable is `0`.

use serde_json::Value;

/// Read a monetary amount.
///
/// Numbers pass through. Strings are read like a lenient decimal parser: the
/// longest numeric prefix after leading whitespace counts (`"12.5 EUR"` is
/// `12.5`), and a string with no numeric prefix is `0`. Every other JSON
/// type, and any non-finite result, is `0`.
pub fn parse_amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => float_prefix(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

/// Read an integer count (guests, nights).
///
/// Strings keep their leading integer digits only (`"2.7"` is `2`), numbers
/// are truncated toward zero, and everything else is `0`.
pub fn parse_count(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => int_prefix(s).unwrap_or(0),
        _ => 0,
    }
}

/// Longest `[+-]digits[.digits][e[+-]digits]` prefix, if it holds any digit.
fn float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        end
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digit_count = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            digit_count += frac_end - end - 1;
            end = frac_end;
        }
    }
    if digit_count == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Leading `[+-]digits` prefix, saturating on overflow.
fn int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: Vec<i64> = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits
        .into_iter()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(d));
    Some(if negative { -magnitude } else { magnitude })
}
