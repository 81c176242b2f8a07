//! Point values and ring classification for single darts.

use crate::dart::{BULL_VALUE, Dart, Multiplier};
use tracing::instrument;

/// Returns the points scored by a dart.
///
/// The bull is special-cased: the inner bull scores 50 and the outer bull 25.
/// Every other segment scores `value * multiplier`.
#[instrument]
pub fn dart_score(dart: &Dart) -> u32 {
    if dart.value() == BULL_VALUE {
        return match dart.multiplier() {
            Multiplier::Double => 50,
            _ => 25,
        };
    }
    u32::from(dart.value()) * dart.multiplier().factor()
}

/// Returns true if the dart landed in a double ring, inner bull included.
#[instrument]
pub fn is_double(dart: &Dart) -> bool {
    dart.multiplier() == Multiplier::Double
}

/// Returns true if the dart landed in a triple ring.
#[instrument]
pub fn is_triple(dart: &Dart) -> bool {
    dart.multiplier() == Multiplier::Triple
}

/// Sums the points of a sequence of darts.
pub fn darts_total(darts: &[Dart]) -> u32 {
    darts.iter().map(dart_score).sum()
}
