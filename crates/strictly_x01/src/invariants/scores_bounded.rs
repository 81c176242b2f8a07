//! Scores bounded invariant: every score sits between 0 and the starting score.

use super::Invariant;
use crate::leg::Scoresheet;

/// Invariant: scores never climb above the start and never rest on a dead score.
///
/// Under double-out and master-out a player can never be left on 1.
pub struct ScoresBoundedInvariant;

impl Invariant<Scoresheet> for ScoresBoundedInvariant {
    fn holds(sheet: &Scoresheet) -> bool {
        sheet.players().all(|player| {
            let score = *player.score();
            score <= sheet.starting_score() && !sheet.out_rule().is_dead_score(score)
        })
    }

    fn description() -> &'static str {
        "Scores stay within 0..=starting score and never rest on a dead score"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leg::LegInProgress;
    use crate::player::{PlayerId, PlayerProfile};
    use crate::rules::OutRule;

    fn leg(out_rule: OutRule) -> LegInProgress {
        let roster = vec![PlayerProfile::new("a", "Alice")];
        LegInProgress::with_out_rule(101, out_rule, &roster, None).unwrap()
    }

    #[test]
    fn test_fresh_leg_holds() {
        assert!(ScoresBoundedInvariant::holds(leg(OutRule::Double).sheet()));
    }

    #[test]
    fn test_score_above_start_violates() {
        let mut leg = leg(OutRule::Double);
        leg.sheet
            .players
            .get_mut(&PlayerId::from("a"))
            .unwrap()
            .set_score(102);
        assert!(!ScoresBoundedInvariant::holds(leg.sheet()));
    }

    #[test]
    fn test_one_is_dead_only_when_finish_is_restricted() {
        for (rule, expected) in [
            (OutRule::Double, false),
            (OutRule::Master, false),
            (OutRule::Straight, true),
        ] {
            let mut leg = leg(rule);
            leg.sheet
                .players
                .get_mut(&PlayerId::from("a"))
                .unwrap()
                .set_score(1);
            assert_eq!(ScoresBoundedInvariant::holds(leg.sheet()), expected, "{rule}");
        }
    }
}
