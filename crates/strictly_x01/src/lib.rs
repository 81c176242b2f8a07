//! Strictly X01 - pure darts scoring logic.
//!
//! # Architecture
//!
//! - **Darts**: validated single-throw values with board notation
//! - **Rules**: point values and the visit resolver (in rule, bust, checkout)
//! - **Legs**: typestate leg machine (`LegInProgress` → `LegFinished`)
//! - **Matches**: leg sequencing, leg and set tallies, starter rotation
//! - **Checkouts**: read-only table of suggested finishes
//!
//! # Example
//!
//! ```
//! use strictly_x01::{Match, PlayerProfile, Visit};
//!
//! let roster = vec![PlayerProfile::new("a", "Alice"), PlayerProfile::new("b", "Bob")];
//! let game = Match::new(501, roster, 3)?;
//!
//! let visit: Visit = "T20 T20 D20".parse()?;
//! let (game, report) = game.play_visit(&visit)?;
//!
//! assert_eq!(report.visit_result.map(|r| r.next_score()), Some(341));
//! assert!(!report.leg_ended);
//! assert_eq!(game.leg().sheet().active_index(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod checkout;
mod contracts;
mod dart;
pub mod invariants;
mod leg;
mod match_state;
mod player;
pub mod rules;
mod visit;

// Crate-level exports - Darts and visits
pub use dart::{BULL_VALUE, Dart, DartError, MAX_SEGMENT, Multiplier};
pub use visit::{MAX_DARTS, Visit, VisitError};

// Crate-level exports - Rules
pub use rules::{
    BustReason, InRule, OutRule, VisitOutcome, VisitResult, apply_visit, apply_visit_rules,
    apply_visit_with, dart_score, is_double,
};

// Crate-level exports - Players
pub use player::{PlayerId, PlayerProfile, PlayerState};

// Crate-level exports - Legs
pub use leg::{
    Leg, LegError, LegFinished, LegInProgress, LegOutcome, LegReport, LegRules, Scoresheet,
    VisitRecord,
};

// Crate-level exports - Contracts
pub use contracts::{Contract, LegalVisit, VisitContract};

// Crate-level exports - Matches
pub use match_state::{
    Match, MatchError, MatchFormat, MatchSettings, MatchVisitReport, STANDARD_STARTING_SCORES,
};

// Crate-level exports - Checkouts
pub use checkout::{CheckoutTable, MAX_CHECKOUT, MIN_CHECKOUT};
