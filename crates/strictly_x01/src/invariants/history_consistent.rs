//! History consistency invariant: scores are exactly what the visits say.

use super::Invariant;
use crate::leg::Scoresheet;

/// Invariant: replaying each player's visit results from the starting score
/// lands on the score they currently hold.
///
/// Every record must also start from where that player's previous record
/// left off.
pub struct HistoryConsistentInvariant;

impl Invariant<Scoresheet> for HistoryConsistentInvariant {
    fn holds(sheet: &Scoresheet) -> bool {
        sheet.players().all(|player| {
            let mut running = sheet.starting_score();

            for record in sheet.history().iter().filter(|r| r.player() == player.id()) {
                if record.result().start_score() != running {
                    return false;
                }
                running = record.result().next_score();
            }

            running == *player.score()
        })
    }

    fn description() -> &'static str {
        "Each player's score matches the results of their recorded visits"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leg::{Leg, LegInProgress};
    use crate::player::{PlayerId, PlayerProfile};
    use crate::visit::Visit;

    fn played() -> LegInProgress {
        let roster = vec![PlayerProfile::new("a", "Alice"), PlayerProfile::new("b", "Bob")];
        let visits: Vec<Visit> = ["T20 T20 T20", "T20 T20 T20", "T20 T20 T20", "T20 T20 T20"]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();
        match LegInProgress::new(201, &roster, None).unwrap().replay(&visits).unwrap() {
            Leg::InProgress(leg) => leg,
            Leg::Finished(_) => panic!("Expected leg in progress"),
        }
    }

    #[test]
    fn test_scores_match_history_after_busts() {
        let leg = played();
        // Second visit each busts from 21: 60 overshoots.
        assert_eq!(leg.sheet().score_of(&PlayerId::from("a")), Some(21));
        assert!(HistoryConsistentInvariant::holds(leg.sheet()));
    }

    #[test]
    fn test_edited_score_violates() {
        let mut leg = played();
        leg.sheet
            .players
            .get_mut(&PlayerId::from("a"))
            .unwrap()
            .set_score(20);
        assert!(!HistoryConsistentInvariant::holds(leg.sheet()));
    }

    #[test]
    fn test_dropped_record_violates() {
        let mut leg = played();
        leg.sheet.history.remove(0);
        assert!(!HistoryConsistentInvariant::holds(leg.sheet()));
    }
}
