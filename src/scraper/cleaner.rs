use crate::error::ExtractError;

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Canonical date text.
/// "08/18/2022" → "2022-08-18" | "2022-08-18" → "2022-08-18"
///
/// Only the separator is looked at; "13/40/2022" becomes "2022-13-40".
pub fn isodate(date: &str) -> String {
    let date = date.trim();
    if !date.contains('/') {
        return date.to_string();
    }
    let mdy: Vec<&str> = date.split('/').collect();
    match mdy.as_slice() {
        [m, d, y, ..] => format!("{}-{}-{}", y, m, d),
        _ => date.to_string(),
    }
}

// ── Numbers ───────────────────────────────────────────────────────────────────

/// Parse a plain decimal cell, tolerating thousands separators.
/// "738.3417" → 738.3417 | "1,024.5" → 1024.5
pub fn parse_decimal(field: &'static str, s: &str) -> Result<f64, ExtractError> {
    let cleaned = s.trim().replace(',', "");
    cleaned.parse().map_err(|_| ExtractError::InvalidNumber {
        field,
        raw: s.to_string(),
    })
}

/// Parse a currency cell: leading "$" and thousands separators are dropped.
/// "$8,523.52" → 8523.52
pub fn parse_currency(field: &'static str, s: &str) -> Result<f64, ExtractError> {
    let t = s.trim();
    let t = t.strip_prefix('$').unwrap_or(t);
    parse_decimal(field, t).map_err(|_| ExtractError::InvalidNumber {
        field,
        raw: s.to_string(),
    })
}

pub fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

/// Value relative to the amount invested, 3 decimals. Near 1.0 means break-even.
pub fn normalized(value: f64, invested: f64) -> f64 {
    round_to(value / invested, 3)
}

// ── Text ──────────────────────────────────────────────────────────────────────

/// Remove every whitespace character, including non-breaking spaces.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Directory key for a fund display name.
pub fn fund_key(name: &str) -> String {
    strip_whitespace(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
