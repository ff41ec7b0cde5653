use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::csv_line::unquote;

/// Semantic role of a forecast CSV column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForecastField {
    Timestamp,
    Temperature,
    Condition,
    TideHeight,
    WindSpeedKph,
    WindAngle,
    DirectionType,
    Swells,
}

impl ForecastField {
    pub const ALL: [ForecastField; 8] = [
        ForecastField::Timestamp,
        ForecastField::Temperature,
        ForecastField::Condition,
        ForecastField::TideHeight,
        ForecastField::WindSpeedKph,
        ForecastField::WindAngle,
        ForecastField::DirectionType,
        ForecastField::Swells,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastField::Timestamp => "timestamp",
            ForecastField::Temperature => "temperature",
            ForecastField::Condition => "condition",
            ForecastField::TideHeight => "tideHeight",
            ForecastField::WindSpeedKph => "windSpeedKph",
            ForecastField::WindAngle => "windAngle",
            ForecastField::DirectionType => "directionType",
            ForecastField::Swells => "swells",
        }
    }

    /// Header names matched exactly, in preference order
    fn exact_names(&self) -> &'static [&'static str] {
        match self {
            ForecastField::Timestamp => &["timestamp"],
            ForecastField::Temperature => &["temperature"],
            ForecastField::Condition => &["condition"],
            ForecastField::TideHeight => &["height", "tideHeight", "tide"],
            ForecastField::WindSpeedKph => &["speed", "windSpeedKph", "windSpeed"],
            ForecastField::WindAngle => &["direction", "windAngle", "windDirection"],
            ForecastField::DirectionType => &["directionType", "windDirectionType"],
            ForecastField::Swells => &["swells"],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ForecastField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fallback header match for one field, `include` must match and `exclude` must not
struct FuzzyRule {
    include: Regex,
    exclude: Option<Regex>,
}

impl FuzzyRule {
    fn new(include: &str, exclude: Option<&str>) -> FuzzyRule {
        FuzzyRule {
            include: Regex::new(include).expect("column include pattern is valid"),
            exclude: exclude.map(|e| Regex::new(e).expect("column exclude pattern is valid")),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.include.is_match(name) && !self.exclude.as_ref().is_some_and(|e| e.is_match(name))
    }
}

fn fuzzy_rules() -> &'static [FuzzyRule; 8] {
    static RULES: OnceLock<[FuzzyRule; 8]> = OnceLock::new();
    // Same order as ForecastField::ALL
    RULES.get_or_init(|| {
        [
            FuzzyRule::new(r"(?i)timestamp|datetime|date_time|^(date|time|ts)$", None),
            FuzzyRule::new(r"(?i)temp", None),
            FuzzyRule::new(r"(?i)condition|weather|icon", None),
            FuzzyRule::new(r"(?i)tide|^height$", None),
            FuzzyRule::new(r"(?i)speed|kph|km/?h", Some(r"(?i)gust")),
            FuzzyRule::new(r"(?i)direction|angle|bearing", Some(r"(?i)type|swell|wave")),
            FuzzyRule::new(r"(?i)direction[ _-]?type|shore", None),
            FuzzyRule::new(r"(?i)swell", None),
        ]
    })
}

/// Header cell as it should be compared: trimmed, unquoted, without a byte order mark
fn header_name(raw: &str) -> &str {
    unquote(raw.trim_start_matches('\u{feff}'))
}

/// Resolved column positions for each [`ForecastField`]. Built once from the header
/// row; a field with no position reads as empty text / 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnIndex {
    positions: [Option<usize>; 8],
}

impl ColumnIndex {
    /// Resolves every field against the tokenized header row.
    ///
    /// Exact, case sensitive names are tried first for all fields. Fields still
    /// unresolved then take the first column not already claimed whose name matches
    /// the field's pattern, so renamed or reordered headers land on the same roles.
    pub fn resolve(header: &[&str]) -> ColumnIndex {
        let names: Vec<&str> = header.iter().map(|h| header_name(h)).collect();
        let mut positions = [None; 8];
        let mut claimed = vec![false; names.len()];

        for field in ForecastField::ALL {
            let found = field.exact_names().iter().find_map(|exact| {
                names
                    .iter()
                    .enumerate()
                    .position(|(i, name)| !claimed[i] && name == exact)
            });
            if let Some(position) = found {
                claimed[position] = true;
                positions[field.index()] = Some(position);
            }
        }

        for field in ForecastField::ALL {
            if positions[field.index()].is_some() {
                continue;
            }
            let rule = &fuzzy_rules()[field.index()];
            let found = names
                .iter()
                .enumerate()
                .position(|(i, name)| !claimed[i] && rule.matches(name));
            if let Some(position) = found {
                claimed[position] = true;
                positions[field.index()] = Some(position);
            }
        }

        ColumnIndex { positions }
    }

    pub fn position(&self, field: ForecastField) -> Option<usize> {
        self.positions[field.index()]
    }

    pub fn has_timestamp(&self) -> bool {
        self.position(ForecastField::Timestamp).is_some()
    }

    /// The raw cell for `field` in `row`, if the column exists and the row is long enough
    pub fn get<'a>(&self, field: ForecastField, row: &[&'a str]) -> Option<&'a str> {
        self.position(field).and_then(|position| row.get(position).copied())
    }
}
