//! Single-dart value type and its board notation.
//!
//! A dart is immutable once built. Every constructor validates the segment
//! and multiplier, so a `Dart` in hand is always a throw that can land on a
//! real board.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Segment value of the bullseye.
pub const BULL_VALUE: u8 = 25;

/// Highest numbered segment on the board.
pub const MAX_SEGMENT: u8 = 20;

/// Ring a dart landed in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
pub enum Multiplier {
    /// Single ring (x1).
    Single,
    /// Double ring (x2). Includes the inner bull.
    Double,
    /// Triple ring (x3).
    Triple,
}

impl Multiplier {
    /// Returns the numeric factor (1, 2 or 3).
    pub fn factor(self) -> u32 {
        match self {
            Multiplier::Single => 1,
            Multiplier::Double => 2,
            Multiplier::Triple => 3,
        }
    }

    /// Maps a numeric factor back to a multiplier.
    pub fn from_factor(factor: u8) -> Option<Self> {
        match factor {
            1 => Some(Multiplier::Single),
            2 => Some(Multiplier::Double),
            3 => Some(Multiplier::Triple),
            _ => None,
        }
    }
}

/// Error raised when a dart cannot exist on a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum DartError {
    /// Segment is not 0, 1..=20 or 25.
    #[display("Segment {} is not on the board", _0)]
    InvalidSegment(u8),

    /// Multiplier factor is not 1, 2 or 3.
    #[display("Multiplier {} is not one of 1, 2, 3", _0)]
    InvalidMultiplier(u8),

    /// The bull has no triple ring.
    #[display("Triple bull is not a legal throw")]
    TripleBull,

    /// A miss carries no ring.
    #[display("A miss cannot be doubled or tripled")]
    MultipliedMiss,

    /// Text could not be read as a dart.
    #[display("Unrecognised dart notation: {:?}", _0)]
    InvalidNotation(String),
}

impl std::error::Error for DartError {}

/// A single thrown dart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDart", into = "RawDart")]
pub struct Dart {
    value: u8,
    multiplier: Multiplier,
}

impl Dart {
    /// A dart that scored nothing.
    pub const MISS: Dart = Dart {
        value: 0,
        multiplier: Multiplier::Single,
    };

    /// Outer bull, 25 points.
    pub const OUTER_BULL: Dart = Dart {
        value: BULL_VALUE,
        multiplier: Multiplier::Single,
    };

    /// Inner bull, 50 points, counts as a double.
    pub const BULL: Dart = Dart {
        value: BULL_VALUE,
        multiplier: Multiplier::Double,
    };

    /// Builds a dart, rejecting throws that cannot exist on a board.
    #[instrument]
    pub fn new(value: u8, multiplier: Multiplier) -> Result<Self, DartError> {
        match (value, multiplier) {
            (0, Multiplier::Single) => Ok(Self::MISS),
            (0, _) => Err(DartError::MultipliedMiss),
            (BULL_VALUE, Multiplier::Triple) => Err(DartError::TripleBull),
            (BULL_VALUE, _) | (1..=MAX_SEGMENT, _) => Ok(Self { value, multiplier }),
            _ => Err(DartError::InvalidSegment(value)),
        }
    }

    /// Builds a dart from raw segment and factor values.
    pub fn from_raw(value: u8, mult: u8) -> Result<Self, DartError> {
        let multiplier = Multiplier::from_factor(mult).ok_or(DartError::InvalidMultiplier(mult))?;
        Self::new(value, multiplier)
    }

    /// Single of the given segment.
    pub fn single(value: u8) -> Result<Self, DartError> {
        Self::new(value, Multiplier::Single)
    }

    /// Double of the given segment.
    pub fn double(value: u8) -> Result<Self, DartError> {
        Self::new(value, Multiplier::Double)
    }

    /// Triple of the given segment.
    pub fn triple(value: u8) -> Result<Self, DartError> {
        Self::new(value, Multiplier::Triple)
    }

    /// Segment value (0 for a miss, 25 for the bull).
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Ring the dart landed in.
    pub fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    /// Points scored by this dart.
    pub fn score(&self) -> u32 {
        crate::rules::dart_score(self)
    }

    /// Whether this dart can finish a leg under double-out.
    pub fn is_double(&self) -> bool {
        crate::rules::is_double(self)
    }

    /// Whether this dart hit a triple ring.
    pub fn is_triple(&self) -> bool {
        crate::rules::is_triple(self)
    }

    /// Whether this dart hit either bull.
    pub fn is_bull(&self) -> bool {
        self.value == BULL_VALUE
    }

    /// Whether this dart missed the scoring area.
    pub fn is_miss(&self) -> bool {
        self.value == 0
    }
}

impl FromStr for Dart {
    type Err = DartError;

    /// Reads board notation: `T20`, `D16`, `S5`, `5`, `25`, `SB`, `Bull`, `DB`, `M`.
    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let upper = token.to_ascii_uppercase();
        let invalid = || DartError::InvalidNotation(token.to_string());

        match upper.as_str() {
            "" => return Err(invalid()),
            "M" | "MISS" | "0" => return Ok(Self::MISS),
            "BULL" | "DB" | "BULLSEYE" => return Ok(Self::BULL),
            "SB" | "OB" => return Ok(Self::OUTER_BULL),
            _ => {}
        }

        let (multiplier, digits) = match upper.as_bytes()[0] {
            b'S' => (Multiplier::Single, &upper[1..]),
            b'D' => (Multiplier::Double, &upper[1..]),
            b'T' => (Multiplier::Triple, &upper[1..]),
            _ => (Multiplier::Single, upper.as_str()),
        };

        let value: u8 = digits.parse().map_err(|_| invalid())?;
        Self::new(value, multiplier)
    }
}

impl std::fmt::Display for Dart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.value, self.multiplier) {
            (0, _) => write!(f, "Miss"),
            (BULL_VALUE, Multiplier::Double) => write!(f, "Bull"),
            (value, Multiplier::Single) => write!(f, "{}", value),
            (value, Multiplier::Double) => write!(f, "D{}", value),
            (value, Multiplier::Triple) => write!(f, "T{}", value),
        }
    }
}

/// Wire form of a dart: `{ "value": 20, "mult": 3 }`.
#[derive(Serialize, Deserialize)]
struct RawDart {
    value: u8,
    mult: u8,
}

impl TryFrom<RawDart> for Dart {
    type Error = DartError;

    fn try_from(raw: RawDart) -> Result<Self, Self::Error> {
        Dart::from_raw(raw.value, raw.mult)
    }
}

impl From<Dart> for RawDart {
    fn from(dart: Dart) -> Self {
        Self {
            value: dart.value,
            mult: dart.multiplier.factor() as u8,
        }
    }
}
