//! Display formatting for amounts, dates, documents and phone numbers.
//!
//! Every formatter renders missing or unparseable input as `-` so views never
//! show an empty cell.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MISSING: &str = "-";

/// Formats an amount as Colombian pesos: `$150.000`, no decimals.
pub fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let rounded = v.round();
            let grouped = group_thousands(&format!("{:.0}", rounded.abs()));
            if rounded < 0.0 {
                format!("-${}", grouped)
            } else {
                format!("${}", grouped)
            }
        }
        _ => MISSING.to_string(),
    }
}

/// Same as [`format_currency`] for amounts received as text.
pub fn format_currency_text(value: &str) -> String {
    format_currency(value.trim().parse::<f64>().ok())
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Parses the date formats the backend has been seen to send.
///
/// Offset timestamps keep their own wall-clock time; no conversion to the
/// host time zone is made.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `2025-01-15T10:30:00Z` -> `15/01/2025`.
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// `2025-01-15T10:30:00Z` -> `15/01/2025, 10:30:00`.
pub fn format_date_time(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Groups a document number with dots: `1234567890` -> `1.234.567.890`.
///
/// Values that are not purely digits are returned unchanged.
pub fn format_document_number(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return MISSING.to_string();
    }
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.to_string();
    }
    group_thousands(raw)
}

/// Colombian phone layout: mobiles `300 123 4567`, landlines `123 4567`.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0 => MISSING.to_string(),
        10 => format!("{} {} {}", &digits[..3], &digits[3..6], &digits[6..]),
        7 => format!("{} {}", &digits[..3], &digits[3..]),
        _ => digits,
    }
}

/// Cuts `text` to `max_chars` characters and appends `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim())
}

/// `juan PÉREZ` -> `Juan Pérez`.
pub fn capitalize_words(text: &str) -> String {
    text.to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
