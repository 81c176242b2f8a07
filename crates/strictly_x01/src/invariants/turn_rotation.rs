//! Turn rotation invariant: players throw in order, wrapping after the last.

use super::Invariant;
use crate::leg::Scoresheet;

/// Invariant: visit `i` belongs to `order[i % n]`, and the active index is
/// `visits % n` while the leg continues.
pub struct TurnRotationInvariant;

impl Invariant<Scoresheet> for TurnRotationInvariant {
    fn holds(sheet: &Scoresheet) -> bool {
        let order = sheet.order();
        if order.is_empty() {
            return false;
        }

        let in_turn = sheet
            .history()
            .iter()
            .enumerate()
            .all(|(i, record)| record.player() == &order[i % order.len()]);

        in_turn && sheet.active_index() == sheet.history().len() % order.len()
    }

    fn description() -> &'static str {
        "Players throw in rotation and the active index follows the visit count"
    }
}
