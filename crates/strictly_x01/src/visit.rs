//! First-class visit type.
//!
//! A visit is the player's intent for one turn: up to three darts, in the
//! order thrown. It is validated on construction and only resolved against
//! a score when a leg plays it.

use crate::dart::{Dart, DartError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Maximum darts in one visit.
pub const MAX_DARTS: usize = 3;

/// One to three darts thrown by a player in a single turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Dart>", into = "Vec<Dart>")]
pub struct Visit {
    darts: Vec<Dart>,
}

impl Visit {
    /// Creates a visit, rejecting empty or oversized sequences.
    #[instrument(skip(darts))]
    pub fn new(darts: impl Into<Vec<Dart>>) -> Result<Self, VisitError> {
        let darts = darts.into();
        match darts.len() {
            0 => Err(VisitError::Empty),
            n if n > MAX_DARTS => Err(VisitError::TooManyDarts(n)),
            _ => Ok(Self { darts }),
        }
    }

    /// Returns the darts in throwing order.
    pub fn darts(&self) -> &[Dart] {
        &self.darts
    }

    /// Number of darts thrown.
    pub fn len(&self) -> usize {
        self.darts.len()
    }

    /// Always false; a visit holds at least one dart.
    pub fn is_empty(&self) -> bool {
        self.darts.is_empty()
    }

    /// Face value of every dart added up, ignoring bust rules.
    pub fn total(&self) -> u32 {
        crate::rules::darts_total(&self.darts)
    }
}

impl FromStr for Visit {
    type Err = VisitError;

    /// Reads whitespace or comma separated darts, e.g. `"T20 T20 D20"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let darts = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(Dart::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(darts)
    }
}

impl TryFrom<Vec<Dart>> for Visit {
    type Error = VisitError;

    fn try_from(darts: Vec<Dart>) -> Result<Self, Self::Error> {
        Self::new(darts)
    }
}

impl From<Visit> for Vec<Dart> {
    fn from(visit: Visit) -> Self {
        visit.darts
    }
}

impl std::fmt::Display for Visit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<String> = self.darts.iter().map(ToString::to_string).collect();
        write!(f, "{}", labels.join(" "))
    }
}

/// Error that can occur when building a visit.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum VisitError {
    /// No darts were supplied.
    #[display("A visit needs at least one dart")]
    Empty,

    /// More than three darts were supplied.
    #[display("A visit holds at most {} darts, got {}", MAX_DARTS, _0)]
    TooManyDarts(usize),

    /// One of the darts was not a legal throw.
    #[display("Invalid dart: {}", _0)]
    InvalidDart(DartError),
}

impl std::error::Error for VisitError {}

impl From<DartError> for VisitError {
    fn from(err: DartError) -> Self {
        VisitError::InvalidDart(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_visit() {
        let visit: Visit = "T20 T20 D20".parse().unwrap();
        assert_eq!(visit.len(), 3);
        assert_eq!(visit.total(), 160);
        assert_eq!(visit.to_string(), "T20 T20 D20");
    }

    #[test]
    fn test_parse_comma_separated() {
        let visit: Visit = "T19,  19,D16".parse().unwrap();
        assert_eq!(visit.total(), 57 + 19 + 32);
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Visit::new(Vec::<Dart>::new()), Err(VisitError::Empty));
        assert_eq!("   ".parse::<Visit>(), Err(VisitError::Empty));
    }

    #[test]
    fn test_rejects_four_darts() {
        let darts = vec![Dart::MISS; 4];
        assert_eq!(Visit::new(darts), Err(VisitError::TooManyDarts(4)));
    }

    #[test]
    fn test_bad_dart_surfaces() {
        assert!(matches!(
            "T20 T25".parse::<Visit>(),
            Err(VisitError::InvalidDart(DartError::TripleBull))
        ));
    }

    #[test]
    fn test_deserialize_checks_length() {
        let bad: Result<Visit, _> = serde_json::from_str("[]");
        assert!(bad.is_err());
    }
}
