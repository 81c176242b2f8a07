//! Roster consistency invariant: the throwing order and the score map agree.

use super::Invariant;
use crate::leg::Scoresheet;
use std::collections::BTreeSet;

/// Invariant: every id in the order is unique and has exactly one score entry
/// keyed by its own id.
pub struct RosterConsistentInvariant;

impl Invariant<Scoresheet> for RosterConsistentInvariant {
    fn holds(sheet: &Scoresheet) -> bool {
        let order: BTreeSet<_> = sheet.order().iter().collect();
        if order.len() != sheet.order().len() || order.len() != sheet.players.len() {
            return false;
        }

        sheet
            .players
            .iter()
            .all(|(id, state)| order.contains(id) && state.id() == id)
    }

    fn description() -> &'static str {
        "Throwing order is unique and matches the players holding scores"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leg::LegInProgress;
    use crate::player::{PlayerId, PlayerProfile};

    fn leg() -> LegInProgress {
        let roster = vec![PlayerProfile::new("a", "Alice"), PlayerProfile::new("b", "Bob")];
        LegInProgress::new(501, &roster, None).unwrap()
    }

    #[test]
    fn test_fresh_leg_holds() {
        assert!(RosterConsistentInvariant::holds(leg().sheet()));
    }

    #[test]
    fn test_duplicate_in_order_violates() {
        let mut leg = leg();
        leg.sheet.order.push(PlayerId::from("a"));
        assert!(!RosterConsistentInvariant::holds(leg.sheet()));
    }

    #[test]
    fn test_missing_score_violates() {
        let mut leg = leg();
        leg.sheet.players.remove(&PlayerId::from("b"));
        assert!(!RosterConsistentInvariant::holds(leg.sheet()));
    }
}
