use std::sync::OnceLock;

use regex::Regex;

/// Rounds to one decimal place, ties going up (`0.25 -> 0.3`, `-0.25 -> -0.2`)
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Truncates down to one decimal place. The result never exceeds `value`.
pub fn floor_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let tenths = (value * 10.0).floor();
    let floored = tenths / 10.0;
    // value * 10.0 can round up onto the next integer
    if floored > value {
        (tenths - 1.0) / 10.0
    } else {
        floored
    }
}

fn leading_number() -> &'static Regex {
    static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();
    LEADING_NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
            .expect("leading number pattern is valid")
    })
}

/// Parses the leading numeric portion of a cell (`"14.4"`, `"14.4kph"`), falling back
/// to 0 for anything that does not yield a finite number.
pub fn numeric_or_zero(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return if value.is_finite() { value } else { 0.0 };
    }

    leading_number()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
