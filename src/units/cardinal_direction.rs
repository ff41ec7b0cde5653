use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DataParseError;

/// Sixteen point compass rose, clockwise from north
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardinalDirection {
    North,
    NorthNorthEast,
    NorthEast,
    EastNorthEast,
    East,
    EastSouthEast,
    SouthEast,
    SouthSouthEast,
    South,
    SouthSouthWest,
    SouthWest,
    WestSouthWest,
    West,
    WestNorthWest,
    NorthWest,
    NorthNorthWest,
}

const COMPASS: [CardinalDirection; 16] = [
    CardinalDirection::North,
    CardinalDirection::NorthNorthEast,
    CardinalDirection::NorthEast,
    CardinalDirection::EastNorthEast,
    CardinalDirection::East,
    CardinalDirection::EastSouthEast,
    CardinalDirection::SouthEast,
    CardinalDirection::SouthSouthEast,
    CardinalDirection::South,
    CardinalDirection::SouthSouthWest,
    CardinalDirection::SouthWest,
    CardinalDirection::WestSouthWest,
    CardinalDirection::West,
    CardinalDirection::WestNorthWest,
    CardinalDirection::NorthWest,
    CardinalDirection::NorthNorthWest,
];

impl CardinalDirection {
    /// Nearest compass point for an angle in degrees. Any angle is accepted and
    /// wrapped into [0, 360); non-finite angles are treated as north.
    pub fn from_degrees(degrees: f64) -> CardinalDirection {
        if !degrees.is_finite() {
            return CardinalDirection::North;
        }
        let normalized = degrees.rem_euclid(360.0);
        let index = (normalized / 22.5).round() as usize % COMPASS.len();
        COMPASS[index]
    }

    pub fn to_degrees(&self) -> f64 {
        let index = COMPASS.iter().position(|d| d == self).unwrap_or(0);
        index as f64 * 22.5
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            CardinalDirection::North => "n",
            CardinalDirection::NorthNorthEast => "nne",
            CardinalDirection::NorthEast => "ne",
            CardinalDirection::EastNorthEast => "ene",
            CardinalDirection::East => "e",
            CardinalDirection::EastSouthEast => "ese",
            CardinalDirection::SouthEast => "se",
            CardinalDirection::SouthSouthEast => "sse",
            CardinalDirection::South => "s",
            CardinalDirection::SouthSouthWest => "ssw",
            CardinalDirection::SouthWest => "sw",
            CardinalDirection::WestSouthWest => "wsw",
            CardinalDirection::West => "w",
            CardinalDirection::WestNorthWest => "wnw",
            CardinalDirection::NorthWest => "nw",
            CardinalDirection::NorthNorthWest => "nnw",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for CardinalDirection {
    type Err = DataParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        COMPASS
            .iter()
            .find(|d| d.abbreviation() == lowered)
            .copied()
            .ok_or(DataParseError::InvalidString)
    }
}

#[cfg(test)]
mod tests {
    use super::CardinalDirection;

    #[test]
    fn test_from_degrees() {
        assert_eq!(CardinalDirection::from_degrees(0.0), CardinalDirection::North);
        assert_eq!(CardinalDirection::from_degrees(359.0), CardinalDirection::North);
        assert_eq!(CardinalDirection::from_degrees(250.0), CardinalDirection::WestSouthWest);
        assert_eq!(CardinalDirection::from_degrees(270.0), CardinalDirection::West);
        assert_eq!(CardinalDirection::from_degrees(-90.0), CardinalDirection::West);
        assert_eq!(CardinalDirection::from_degrees(11.0), CardinalDirection::North);
        assert_eq!(CardinalDirection::from_degrees(12.0), CardinalDirection::NorthNorthEast);
    }

    #[test]
    fn test_parse() {
        assert_eq!("SSE".parse::<CardinalDirection>(), Ok(CardinalDirection::SouthSouthEast));
        assert!("northish".parse::<CardinalDirection>().is_err());
        assert_eq!(CardinalDirection::SouthSouthEast.to_degrees(), 157.5);
    }
}
