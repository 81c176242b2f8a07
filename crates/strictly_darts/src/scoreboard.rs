//! Plain-text rendering of match state and turns.

use crate::session::TurnSummary;
use std::fmt;
use strictly_x01::{InRule, LegOutcome, Match, MatchFormat, VisitOutcome};

/// Scoreboard view of a match.
///
/// ```text
/// Leg 1 of 3 (501, double out)
/// > Alice        341  legs 0
///   Bob          501  legs 0
/// ```
pub struct Scoreboard<'a>(pub &'a Match);

impl fmt::Display for Scoreboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let game = self.0;
        let settings = game.settings();
        let leg = game.current_leg_number();
        match settings.format() {
            MatchFormat::Fixed => write!(f, "Leg {} of {}", leg, game.total_legs())?,
            MatchFormat::Legs { legs_to_win } => {
                write!(f, "Leg {}, first to {} legs", leg, legs_to_win)?
            }
            MatchFormat::Sets {
                sets_to_win,
                legs_per_set,
            } => write!(
                f,
                "Set {} leg {}, first to {} sets of {} legs",
                game.current_set_number(),
                leg,
                sets_to_win,
                legs_per_set
            )?,
        }

        write!(f, " ({}, ", settings.starting_score())?;
        if *settings.in_rule() != InRule::Straight {
            write!(f, "{} in, ", settings.in_rule())?;
        }
        write!(f, "{} out", settings.out_rule())?;
        if let Some(rounds) = settings.max_rounds() {
            write!(f, ", {} rounds", rounds)?;
        }
        writeln!(f, ")")?;

        let sheet = game.leg().sheet();
        let active = if game.leg().is_finished() {
            None
        } else {
            sheet.active_player_id()
        };
        let with_sets = matches!(settings.format(), MatchFormat::Sets { .. });

        for state in sheet.players() {
            let marker = if Some(state.id()) == active { '>' } else { ' ' };
            write!(
                f,
                "{} {:<12} {:>4}  ",
                marker,
                state.profile().name(),
                state.score()
            )?;
            if with_sets {
                writeln!(
                    f,
                    "sets {}  legs {}",
                    game.sets_won(state.id()),
                    game.set_legs_won(state.id())
                )?;
            } else {
                writeln!(f, "legs {}", game.legs_won(state.id()))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TurnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.thrower.name();
        match self.result.outcome() {
            VisitOutcome::Normal => write!(
                f,
                "{}: {} scored {}, {} left",
                name,
                self.visit,
                self.result.scored(),
                self.result.next_score()
            )?,
            VisitOutcome::Bust { dart_index, reason } => write!(
                f,
                "{}: {} BUST on dart {} ({}), back to {}",
                name,
                self.visit,
                dart_index + 1,
                reason,
                self.result.next_score()
            )?,
            VisitOutcome::Finished {
                checkout_dart_index,
            } => {
                let finisher = self
                    .visit
                    .darts()
                    .get(checkout_dart_index)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                write!(
                    f,
                    "{}: {} checked out {} on {}",
                    name,
                    self.visit,
                    self.result.start_score(),
                    finisher
                )?;
            }
        }

        match (&self.leg_outcome, &self.leg_winner) {
            (Some(LegOutcome::Draw), _) => {
                write!(f, "\nRound limit reached: leg {} drawn", self.leg_number)?
            }
            (Some(LegOutcome::RoundLimit(_)), Some(winner)) => write!(
                f,
                "\nRound limit reached: {} wins leg {}",
                winner.name(),
                self.leg_number
            )?,
            (_, Some(winner)) => write!(f, "\n{} wins leg {}", winner.name(), self.leg_number)?,
            (_, None) => {}
        }
        if let Some(winner) = &self.set_winner {
            write!(f, "\n{} wins set {}", winner.name(), self.set_number)?;
        }
        if self.match_complete {
            write!(f, "\nMatch complete")?;
        } else if let Some(next) = self.next_leg {
            write!(f, "\nLeg {} begins", next)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_x01::{MatchSettings, OutRule, PlayerProfile, Visit};

    fn game() -> Match {
        let roster = vec![PlayerProfile::new("a", "Alice"), PlayerProfile::new("b", "Bob")];
        Match::new(501, roster, 3).unwrap()
    }

    #[test]
    fn test_scoreboard_marks_next_thrower() {
        let visit: Visit = "T20 T20 D20".parse().unwrap();
        let (game, _) = game().play_visit(&visit).unwrap();
        let board = Scoreboard(&game).to_string();
        let lines: Vec<_> = board.lines().collect();

        assert_eq!(lines[0], "Leg 1 of 3 (501, double out)");
        assert!(lines[1].starts_with("  Alice"));
        assert!(lines[1].contains("341"));
        assert!(lines[2].starts_with("> Bob"));
    }

    #[test]
    fn test_sets_header_and_columns() {
        let roster = vec![PlayerProfile::new("a", "Alice"), PlayerProfile::new("b", "Bob")];
        let settings = MatchSettings::new(501, 1, OutRule::Double)
            .with_in_rule(InRule::Double)
            .with_format(MatchFormat::Sets {
                sets_to_win: 3,
                legs_per_set: 3,
            })
            .with_max_rounds(Some(20));
        let game = Match::with_settings(settings, roster).unwrap();
        let board = Scoreboard(&game).to_string();
        let lines: Vec<_> = board.lines().collect();

        assert_eq!(
            lines[0],
            "Set 1 leg 1, first to 3 sets of 3 legs (501, double in, double out, 20 rounds)"
        );
        assert!(lines[1].ends_with("sets 0  legs 0"));
    }
}
