pub mod cardinal_direction;
pub mod wind_relation;

pub use cardinal_direction::CardinalDirection;
pub use wind_relation::WindRelation;

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Meters,
    MetersPerSecond,
    KilometersPerHour,
    Seconds,
    Degrees,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Meters => "meters",
            Unit::MetersPerSecond => "meters per second",
            Unit::KilometersPerHour => "kilometers per hour",
            Unit::Seconds => "seconds",
            Unit::Degrees => "degrees",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Unit::Meters => "m",
            Unit::MetersPerSecond => "m/s",
            Unit::KilometersPerHour => "km/h",
            Unit::Seconds => "s",
            Unit::Degrees => "°",
        }
    }

    /// Converts `value` from this unit into `destination`. Incompatible pairs pass the
    /// value through unchanged.
    pub fn convert(&self, destination: &Unit, value: f64) -> f64 {
        match (self, destination) {
            (Unit::KilometersPerHour, Unit::MetersPerSecond) => value / 3.6,
            _ => value,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataParseError {
    InvalidString,
}

impl fmt::Display for DataParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataParseError::InvalidString => write!(f, "invalid string"),
        }
    }
}
