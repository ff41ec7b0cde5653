use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::tools::waves::deep_water_wavelength;
use crate::units::{CardinalDirection, Unit};

/// One directional wave train: height in meters, period in seconds and the
/// direction it arrives from in degrees clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwellComponent {
    pub height: f64,
    pub period: f64,
    pub direction: f64,
}

impl SwellComponent {
    pub fn new(height: f64, period: f64, direction: f64) -> SwellComponent {
        SwellComponent {
            height,
            period,
            direction,
        }
    }

    /// Reads a decoded element, coercing each field on its own. Missing or
    /// non-numeric fields become 0, and so does every field of a non-object element.
    fn from_value(value: &Value) -> SwellComponent {
        let field = |name: &str| value.get(name).map(coerce_number).unwrap_or(0.0);
        SwellComponent {
            height: field("height"),
            period: field("period"),
            direction: field("direction"),
        }
    }

    pub fn cardinal_direction(&self) -> CardinalDirection {
        CardinalDirection::from_degrees(self.direction)
    }

    /// Deep water wavelength in meters for this component's period
    pub fn deep_water_wavelength(&self) -> f64 {
        deep_water_wavelength(self.period)
    }
}

impl fmt::Display for SwellComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} @ {} {} {}{} {}",
            self.height,
            Unit::Meters.abbreviation(),
            self.period,
            Unit::Seconds.abbreviation(),
            self.direction,
            Unit::Degrees.abbreviation(),
            self.cardinal_direction()
        )
    }
}

fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

struct RepairPatterns {
    single_quoted_key: Regex,
    single_quoted_value: Regex,
    bare_key: Regex,
    height_pair: Regex,
}

fn repair_patterns() -> &'static RepairPatterns {
    static PATTERNS: OnceLock<RepairPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| RepairPatterns {
        single_quoted_key: Regex::new(r#"([{,]\s*)'([^']+?)'(\s*:)"#)
            .expect("single quoted key pattern is valid"),
        single_quoted_value: Regex::new(r#":\s*'([^']*)'"#)
            .expect("single quoted value pattern is valid"),
        bare_key: Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*:)"#)
            .expect("bare key pattern is valid"),
        height_pair: Regex::new(r#"["']?height["']?\s*:\s*["']?([0-9]*\.?[0-9]+)"#)
            .expect("height pair pattern is valid"),
    })
}

/// Decodes the swell column of a forecast row.
///
/// The cell is meant to hold a JSON array of `{height, period, direction}` objects
/// but shows up HTML escaped, backslash escaped, CSV quote-doubled, single quoted or
/// with bare keys. Stages, first success wins:
///
/// 1. strip one pair of enclosing double quotes
/// 2. unescape `&quot;`, `&#34;`, `\"` and `""` into `"`
/// 3. strict JSON parse, accepted only when it yields an array
/// 4. quote single-quoted and bare keys and single-quoted values, then parse again
/// 5. scan for `height: <number>` pairs, one component per match
///
/// Anything left over decodes to no swells. This never fails. Components are
/// returned in source order and are not filtered by height.
pub fn decode_swells(raw: &str) -> Vec<SwellComponent> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return vec![];
    }

    let unwrapped = strip_enclosing_quotes(trimmed);
    let normalized = normalize_escaping(unwrapped);

    if let Some(swells) = parse_swell_array(&normalized) {
        return swells;
    }

    let repaired = repair_quoting(&normalized);
    if let Some(swells) = parse_swell_array(&repaired) {
        return swells;
    }

    let scanned = scan_heights(&normalized);
    if !scanned.is_empty() {
        debug!(count = scanned.len(), "swell cell recovered by height scan");
    }
    scanned
}

fn strip_enclosing_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

fn normalize_escaping(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("\\\"", "\"")
        .replace("\"\"", "\"")
}

fn repair_quoting(text: &str) -> String {
    let patterns = repair_patterns();
    let repaired = patterns
        .single_quoted_key
        .replace_all(text, "${1}\"${2}\"${3}");
    let repaired = patterns
        .single_quoted_value
        .replace_all(&repaired, ":\"${1}\"");
    patterns
        .bare_key
        .replace_all(&repaired, "${1}\"${2}\"${3}")
        .into_owned()
}

fn parse_swell_array(text: &str) -> Option<Vec<SwellComponent>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items.iter().map(SwellComponent::from_value).collect()),
        _ => None,
    }
}

fn scan_heights(text: &str) -> Vec<SwellComponent> {
    repair_patterns()
        .height_pair
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|h| h.is_finite())
        .map(|height| SwellComponent::new(height, 0.0, 0.0))
        .collect()
}
