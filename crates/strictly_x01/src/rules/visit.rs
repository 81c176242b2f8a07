//! Visit resolution: walking up to three darts against a remaining score.
//!
//! Darts are evaluated strictly in order. The first dart that busts or
//! finishes ends the visit; anything thrown after it is ignored. A bust
//! always rolls back to the score held before the visit began.
//!
//! These functions take a raw dart slice. [`Visit`](crate::Visit) is the
//! validated entry point that guarantees one to three darts.

use super::score::{dart_score, is_double, is_triple};
use crate::dart::Dart;
use crate::visit::MAX_DARTS;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Condition a finishing dart has to meet.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutRule {
    /// Finish on a double or the inner bull.
    #[default]
    Double,
    /// Finish on anything that reaches exactly zero.
    Straight,
    /// Finish on a double or a triple.
    Master,
}

impl OutRule {
    /// Returns true if `dart` may be the one that reaches zero.
    pub fn permits_finish(self, dart: &Dart) -> bool {
        match self {
            OutRule::Double => is_double(dart),
            OutRule::Straight => true,
            OutRule::Master => is_double(dart) || is_triple(dart),
        }
    }

    /// Returns true if a player left on `remaining` could never finish.
    pub fn is_dead_score(self, remaining: u32) -> bool {
        remaining == 1 && self != OutRule::Straight
    }
}

/// Condition a player's first scoring dart has to meet.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InRule {
    /// Every dart counts from the first throw.
    #[default]
    Straight,
    /// Nothing counts until a double or the inner bull lands.
    Double,
    /// Nothing counts until a double or a triple lands.
    Master,
}

impl InRule {
    /// Returns true if `dart` opens scoring for a player who is not yet in.
    pub fn permits_open(self, dart: &Dart) -> bool {
        match self {
            InRule::Straight => true,
            InRule::Double => is_double(dart),
            InRule::Master => is_double(dart) || is_triple(dart),
        }
    }

    /// Whether players start the leg already scoring.
    pub fn starts_open(self) -> bool {
        self == InRule::Straight
    }
}

/// Why a visit was thrown out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum BustReason {
    /// The dart scored more than was left.
    Overshot,
    /// The dart left exactly 1, which cannot be finished.
    LeftOne,
    /// The dart reached zero without meeting the out rule.
    InvalidFinish,
}

/// Classification of a resolved visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitOutcome {
    /// Every dart was accepted; the leg continues.
    Normal,
    /// The visit was discarded at `dart_index`.
    Bust {
        /// Index of the dart that busted.
        dart_index: usize,
        /// What the dart did wrong.
        reason: BustReason,
    },
    /// The player checked out on `checkout_dart_index`.
    Finished {
        /// Index of the finishing dart.
        checkout_dart_index: usize,
    },
}

/// Result of applying a visit to a remaining score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitResult {
    start_score: u32,
    next_score: u32,
    outcome: VisitOutcome,
    darts_evaluated: usize,
    #[serde(default)]
    opened_at: Option<usize>,
}

impl VisitResult {
    /// Score held before the visit.
    pub fn start_score(&self) -> u32 {
        self.start_score
    }

    /// Score after the visit (the start score again on a bust).
    pub fn next_score(&self) -> u32 {
        self.next_score
    }

    /// How the visit resolved.
    pub fn outcome(&self) -> VisitOutcome {
        self.outcome
    }

    /// Number of darts looked at before the visit ended.
    pub fn darts_evaluated(&self) -> usize {
        self.darts_evaluated
    }

    /// Index of the dart that opened scoring during this visit.
    ///
    /// `None` when the player was already in, never got in, or busted.
    pub fn opened_at(&self) -> Option<usize> {
        self.opened_at
    }

    /// Points taken off the score by this visit.
    pub fn scored(&self) -> u32 {
        self.start_score - self.next_score
    }

    /// Whether the visit busted.
    pub fn is_bust(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Bust { .. })
    }

    /// Whether the visit checked out.
    pub fn is_finished(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Finished { .. })
    }

    /// Index of the finishing dart, if the visit checked out.
    pub fn checkout_dart_index(&self) -> Option<usize> {
        match self.outcome {
            VisitOutcome::Finished {
                checkout_dart_index,
            } => Some(checkout_dart_index),
            _ => None,
        }
    }
}

/// Applies a visit under double-out rules.
#[instrument(skip(darts), fields(darts = darts.len()))]
pub fn apply_visit(start_score: u32, darts: &[Dart]) -> VisitResult {
    apply_visit_with(start_score, darts, OutRule::Double)
}

/// Applies a visit under the given out rule, for a player already scoring.
#[instrument(skip(darts), fields(darts = darts.len()))]
pub fn apply_visit_with(start_score: u32, darts: &[Dart], out_rule: OutRule) -> VisitResult {
    apply_visit_rules(start_score, darts, InRule::Straight, out_rule, true)
}

/// Applies a visit under both an in rule and an out rule.
///
/// While `opened` is false, darts are skipped until one satisfies
/// `in_rule`; that dart and the ones after it are scored as usual. A bust
/// discards the whole visit, the opening dart included.
#[instrument(skip(darts), fields(darts = darts.len()))]
pub fn apply_visit_rules(
    start_score: u32,
    darts: &[Dart],
    in_rule: InRule,
    out_rule: OutRule,
    opened: bool,
) -> VisitResult {
    debug_assert!(
        !darts.is_empty() && darts.len() <= MAX_DARTS,
        "a visit holds 1 to {} darts, got {}",
        MAX_DARTS,
        darts.len()
    );

    let bust = |dart_index: usize, reason: BustReason| {
        debug!(dart_index, %reason, "Visit busted");
        VisitResult {
            start_score,
            next_score: start_score,
            outcome: VisitOutcome::Bust { dart_index, reason },
            darts_evaluated: dart_index + 1,
            opened_at: None,
        }
    };

    let (first, opened_at) = if opened {
        (0, None)
    } else {
        match darts.iter().position(|dart| in_rule.permits_open(dart)) {
            Some(index) => {
                debug!(opened_at = index, %in_rule, "Player opened");
                (index, Some(index))
            }
            None => {
                return VisitResult {
                    start_score,
                    next_score: start_score,
                    outcome: VisitOutcome::Normal,
                    darts_evaluated: darts.len(),
                    opened_at: None,
                };
            }
        }
    };

    let mut current = start_score;

    for (index, dart) in darts.iter().enumerate().skip(first) {
        let Some(proposed) = current.checked_sub(dart_score(dart)) else {
            return bust(index, BustReason::Overshot);
        };

        if proposed == 0 {
            if !out_rule.permits_finish(dart) {
                return bust(index, BustReason::InvalidFinish);
            }
            debug!(checkout_dart_index = index, %dart, "Checkout");
            return VisitResult {
                start_score,
                next_score: 0,
                outcome: VisitOutcome::Finished {
                    checkout_dart_index: index,
                },
                darts_evaluated: index + 1,
                opened_at,
            };
        }

        if out_rule.is_dead_score(proposed) {
            return bust(index, BustReason::LeftOne);
        }

        current = proposed;
    }

    VisitResult {
        start_score,
        next_score: current,
        outcome: VisitOutcome::Normal,
        darts_evaluated: darts.len(),
        opened_at,
    }
}
