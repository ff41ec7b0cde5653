use std::fmt;

use serde::{Deserialize, Serialize};

/// How the wind blows relative to the shoreline of a spot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindRelation {
    Onshore,
    Offshore,
    Cross,
    Unknown,
}

impl WindRelation {
    /// Classifies a free-form direction type label such as `onshore`, `Off`,
    /// `Cross shore`, `side-shore` or their katakana forms.
    pub fn classify(label: &str) -> WindRelation {
        let raw = label.trim();
        if raw.is_empty() {
            return WindRelation::Unknown;
        }

        let lowered = raw
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join("-");
        let has_token = |token: &str| lowered.split('-').any(|part| part == token);

        if has_token("onshore") || lowered == "on" || raw.contains("オン") {
            WindRelation::Onshore
        } else if has_token("offshore") || lowered == "off" || raw.contains("オフ") {
            WindRelation::Offshore
        } else if has_token("cross")
            || has_token("side")
            || has_token("sideshore")
            || has_token("crossshore")
            || raw.contains("サイド")
        {
            WindRelation::Cross
        } else {
            WindRelation::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindRelation::Onshore => "onshore",
            WindRelation::Offshore => "offshore",
            WindRelation::Cross => "cross",
            WindRelation::Unknown => "",
        }
    }
}

impl fmt::Display for WindRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
