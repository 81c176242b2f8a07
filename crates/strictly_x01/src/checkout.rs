//! Suggested finishing routes.
//!
//! The table is a read-only value handed to whoever renders hints. The
//! scoring rules never consult it.

use crate::visit::{Visit, VisitError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Lowest score that can be checked out under double-out.
pub const MIN_CHECKOUT: u32 = 2;

/// Highest score that can be checked out in three darts.
pub const MAX_CHECKOUT: u32 = 170;

const STANDARD_ROUTES: &[(u32, &str)] = &[
    (170, "T20 T20 Bull"),
    (167, "T20 T19 Bull"),
    (164, "T20 T18 Bull"),
    (161, "T20 T17 Bull"),
    (160, "T20 T20 D20"),
    (158, "T20 T20 D19"),
    (157, "T20 T19 D20"),
    (156, "T20 T20 D18"),
    (155, "T20 T19 D19"),
    (154, "T20 T18 D20"),
    (153, "T20 T19 D18"),
    (152, "T20 T20 D16"),
    (151, "T20 T17 D20"),
    (150, "T20 T18 D18"),
    (149, "T20 T19 D16"),
    (148, "T20 T16 D20"),
    (147, "T20 T17 D18"),
    (146, "T20 T18 D16"),
    (145, "T20 T15 D20"),
    (144, "T20 T20 D12"),
    (141, "T20 T19 D12"),
    (140, "T20 T20 D10"),
    (136, "T20 T20 D8"),
    (132, "Bull Bull D16"),
    (130, "T20 20 Bull"),
    (129, "T19 T16 D12"),
    (121, "T20 11 Bull"),
    (120, "T20 20 D20"),
    (117, "T20 17 D20"),
    (116, "T20 16 D20"),
    (115, "T20 15 D20"),
    (112, "T20 12 D20"),
    (110, "T20 10 D20"),
    (100, "T20 D20"),
    (96, "T20 D18"),
    (95, "T19 D19"),
    (94, "T18 D20"),
    (90, "T20 D15"),
    (86, "T18 D16"),
    (84, "T20 D12"),
    (81, "T15 D18"),
    (80, "T20 D10"),
    (78, "T18 D12"),
    (76, "T20 D8"),
    (74, "T14 D16"),
    (72, "T16 D12"),
    (70, "T18 D8"),
    (68, "T20 D4"),
    (66, "T10 D18"),
    (64, "T16 D8"),
    (62, "T10 D16"),
    (60, "20 D20"),
    (58, "18 D20"),
    (56, "16 D20"),
    (54, "14 D20"),
    (52, "20 D16"),
    (50, "10 D20"),
    (48, "16 D16"),
    (46, "6 D20"),
    (44, "12 D16"),
    (40, "D20"),
    (38, "D19"),
    (36, "D18"),
    (32, "D16"),
    (28, "D14"),
    (24, "D12"),
    (20, "D10"),
    (16, "D8"),
    (12, "D6"),
    (8, "D4"),
    (6, "D3"),
    (4, "D2"),
    (2, "D1"),
];

/// Lookup from remaining score to a suggested dart sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTable {
    routes: BTreeMap<u32, String>,
}

impl CheckoutTable {
    /// The built-in table of common finishes.
    #[instrument]
    pub fn standard() -> Self {
        Self::from_routes(STANDARD_ROUTES.iter().copied())
    }

    /// Builds a table from `(remaining, route)` pairs.
    pub fn from_routes<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            routes: routes
                .into_iter()
                .map(|(score, route)| (score, route.into()))
                .collect(),
        }
    }

    /// Returns the suggested route for `remaining`, if one is known.
    ///
    /// Scores outside `2..=170` never have a suggestion.
    pub fn suggest(&self, remaining: u32) -> Option<&str> {
        if !(MIN_CHECKOUT..=MAX_CHECKOUT).contains(&remaining) {
            return None;
        }
        self.routes.get(&remaining).map(String::as_str)
    }

    /// Returns the suggested route parsed into a visit.
    pub fn suggest_visit(&self, remaining: u32) -> Option<Result<Visit, VisitError>> {
        self.suggest(remaining).map(str::parse)
    }

    /// Iterates over `(remaining, route)` pairs in ascending score order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.routes.iter().map(|(score, route)| (*score, route.as_str()))
    }

    /// Number of known routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
