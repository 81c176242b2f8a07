//! Contract-based validation for visits.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} visit {Q}

use crate::invariants::{InvariantSet, LegInvariants};
use crate::leg::{LegError, Scoresheet};
use crate::visit::Visit;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// - Precondition: {P(state, action)} - must hold before applying action
/// - Postcondition: {Q(before, after)} - must hold after applying action
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), LegError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), LegError>;
}

// ─────────────────────────────────────────────────────────────
//  Visit Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the leg has somebody to throw.
pub struct RosterNotEmpty;

impl RosterNotEmpty {
    /// Checks the throwing order is non-empty.
    #[instrument(skip(sheet))]
    pub fn check(sheet: &Scoresheet) -> Result<(), LegError> {
        if sheet.order().is_empty() {
            Err(LegError::EmptyRoster)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the active index names a player with a score.
pub struct ActivePlayerKnown;

impl ActivePlayerKnown {
    /// Checks the active index and the player it points at.
    #[instrument(skip(sheet))]
    pub fn check(sheet: &Scoresheet) -> Result<(), LegError> {
        let Some(id) = sheet.active_player_id() else {
            return Err(LegError::ActiveIndexOutOfRange {
                index: sheet.active_index(),
                players: sheet.order().len(),
            });
        };
        if sheet.player(id).is_none() {
            return Err(LegError::UnknownPlayer(id.clone()));
        }
        Ok(())
    }
}

/// Composite precondition: a visit can be played on this sheet.
pub struct LegalVisit;

impl LegalVisit {
    /// Validates all preconditions for a visit.
    #[instrument(skip(sheet, _visit))]
    pub fn check(sheet: &Scoresheet, _visit: &Visit) -> Result<(), LegError> {
        RosterNotEmpty::check(sheet)?;
        ActivePlayerKnown::check(sheet)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Visit Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for visits on a leg that continues.
///
/// Preconditions:
/// - Throwing order is non-empty
/// - Active index points at a known player
///
/// Postconditions:
/// - Only the thrower's score moved, and only downwards
/// - All leg invariants hold
pub struct VisitContract;

impl Contract<Scoresheet, Visit> for VisitContract {
    fn pre(sheet: &Scoresheet, visit: &Visit) -> Result<(), LegError> {
        LegalVisit::check(sheet, visit)
    }

    fn post(before: &Scoresheet, after: &Scoresheet) -> Result<(), LegError> {
        SingleThrowerMoved::check(before, after)?;

        LegInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            LegError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

/// Postcondition: one visit changes at most the thrower's score, never upwards.
pub struct SingleThrowerMoved;

impl SingleThrowerMoved {
    /// Compares scores across a transition.
    #[instrument(skip(before, after))]
    pub fn check(before: &Scoresheet, after: &Scoresheet) -> Result<(), LegError> {
        let thrower = before.active_player_id();

        for state in before.players() {
            let id = state.id();
            let Some(now) = after.score_of(id) else {
                return Err(LegError::UnknownPlayer(id.clone()));
            };
            let was = *state.score();

            let moved = now != was;
            if now > was || (moved && Some(id) != thrower) {
                warn!(player = %id, was, now, "Score moved outside the thrower's visit");
                return Err(LegError::InvariantViolation(format!(
                    "Postcondition failed: score of {} moved from {} to {}",
                    id, was, now
                )));
            }
        }
        Ok(())
    }
}
