//! Tests for line-driven scoring sessions.

use strictly_darts::{DartsConfig, Scoreboard, ScoringSession, SessionError};
use strictly_x01::{BustReason, InRule, LegOutcome, MatchFormat, OutRule, VisitOutcome};

fn session(start: u32, legs: u32) -> ScoringSession {
    let config = DartsConfig::default()
        .with_starting_score(start)
        .with_total_legs(legs)
        .with_player_names(["Alice", "Bob"]);
    ScoringSession::from_config(&config).unwrap()
}

#[test]
fn test_opening_visits() {
    let mut session = session(501, 3);
    let turns = session.play_lines(["T20 T20 D20", "T20 T20 T20"]).unwrap();

    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].thrower.name(), "Alice");
    assert_eq!(turns[0].result.next_score(), 341);
    assert_eq!(turns[1].thrower.name(), "Bob");
    assert_eq!(turns[1].result.next_score(), 321);
    assert_eq!(turns[0].to_string(), "Alice: T20 T20 D20 scored 160, 341 left");
}

#[test]
fn test_bust_is_reported_and_rolled_back() {
    let mut session = session(40, 1);
    let turn = session.submit_line("T20").unwrap().unwrap();

    assert_eq!(
        turn.result.outcome(),
        VisitOutcome::Bust {
            dart_index: 0,
            reason: BustReason::Overshot
        }
    );
    assert_eq!(turn.result.next_score(), 40);
    assert!(turn.to_string().contains("BUST on dart 1"));
}

#[test]
fn test_legs_roll_over_with_rotation() {
    let mut session = session(40, 2);
    let turns = session.play_lines(["D20", "# leg 2", "Miss", "D20"]).unwrap();

    assert_eq!(turns[0].leg_winner.as_ref().map(|p| p.name().as_str()), Some("Alice"));
    assert_eq!(turns[0].next_leg, Some(2));
    // Bob opens leg 2 after Alice won leg 1.
    assert_eq!(turns[1].thrower.name(), "Bob");
    assert_eq!(turns[2].thrower.name(), "Alice");
    assert_eq!(turns[2].next_leg, None);
    assert!(turns[2].match_complete);
    assert!(session.is_over());
}

#[test]
fn test_no_rotation_keeps_opener() {
    let config = DartsConfig::default()
        .with_starting_score(40)
        .with_total_legs(2)
        .with_rotate_first(false)
        .with_player_names(["Alice", "Bob"]);
    let mut session = ScoringSession::from_config(&config).unwrap();

    let turns = session.play_lines(["D20", "Miss"]).unwrap();
    assert_eq!(turns[1].leg_number, 2);
    assert_eq!(turns[1].thrower.name(), "Alice");
}

#[test]
fn test_visits_after_match_are_rejected() {
    let mut session = session(40, 1);
    session.submit_line("D20").unwrap();
    assert!(session.is_over());
    assert_eq!(session.submit_line("T20"), Err(SessionError::MatchOver));
    assert_eq!(session.submit_line("# trailing notes").unwrap(), None);
}

#[test]
fn test_straight_out_finishes_on_single() {
    let config = DartsConfig::default()
        .with_starting_score(20)
        .with_total_legs(1)
        .with_out_rule(OutRule::Straight)
        .with_player_names(["Alice"]);
    let mut session = ScoringSession::from_config(&config).unwrap();

    let turn = session.submit_line("20").unwrap().unwrap();
    assert!(turn.result.is_finished());
    assert!(turn.match_complete);
}

#[test]
fn test_invalid_config_is_refused() {
    let config = DartsConfig::default();
    assert!(matches!(
        ScoringSession::from_config(&config),
        Err(SessionError::Config(_))
    ));
}

#[test]
fn test_scoreboard_after_leg_change() {
    let mut session = session(40, 3);
    session.submit_line("D20").unwrap();
    let board = Scoreboard(session.game()).to_string();

    assert!(board.starts_with("Leg 2 of 3 (40, double out)"));
    assert!(board.contains("> Bob"));
    assert!(board.lines().any(|l| l.contains("Alice") && l.ends_with("legs 1")));
}

fn pair() -> DartsConfig {
    DartsConfig::default().with_player_names(["Alice", "Bob"])
}

#[test]
fn test_first_to_two_legs_stops_early() {
    let config = pair()
        .with_starting_score(40)
        .with_format(MatchFormat::Legs { legs_to_win: 2 });
    let mut session = ScoringSession::from_config(&config).unwrap();

    let turns = session.play_lines(["D20", "Miss", "D20"]).unwrap();
    assert_eq!(turns[0].next_leg, Some(2));
    assert!(turns[2].match_complete);
    assert!(session.is_over());
    assert_eq!(session.game().winner().map(|p| p.name().as_str()), Some("Alice"));
    assert_eq!(session.submit_line("D20"), Err(SessionError::MatchOver));
}

#[test]
fn test_set_win_is_announced() {
    let config = pair().with_starting_score(40).with_format(MatchFormat::Sets {
        sets_to_win: 2,
        legs_per_set: 1,
    });
    let mut session = ScoringSession::from_config(&config).unwrap();

    let turn = session.submit_line("D20").unwrap().unwrap();
    assert_eq!(turn.set_number, 1);
    assert_eq!(turn.set_winner.as_ref().map(|p| p.name().as_str()), Some("Alice"));
    assert!(turn.to_string().contains("Alice wins set 1"));
    assert_eq!(session.game().current_set_number(), 2);

    let board = Scoreboard(session.game()).to_string();
    assert!(board.starts_with("Set 2 leg 2, first to 2 sets of 1 legs (40, double out)"));
    assert!(board.lines().any(|l| l.contains("Alice") && l.ends_with("sets 1  legs 0")));
}

#[test]
fn test_round_limit_draw_rolls_to_next_leg() {
    let config = pair().with_total_legs(2).with_max_rounds(Some(1));
    let mut session = ScoringSession::from_config(&config).unwrap();

    let turns = session.play_lines(["T20", "T20"]).unwrap();
    assert_eq!(turns[1].leg_outcome, Some(LegOutcome::Draw));
    assert_eq!(turns[1].leg_winner, None);
    assert_eq!(turns[1].next_leg, Some(2));
    assert!(turns[1].to_string().ends_with("Round limit reached: leg 1 drawn\nLeg 2 begins"));
    // Bob follows the drawn leg's opener.
    assert_eq!(session.next_thrower().map(|p| p.name().as_str()), Some("Bob"));
}

#[test]
fn test_double_in_session_scores_after_opening() {
    let config = pair().with_in_rule(InRule::Double);
    let mut session = ScoringSession::from_config(&config).unwrap();

    let turns = session.play_lines(["T20 T20 T20", "20 D20 20"]).unwrap();
    assert_eq!(turns[0].result.next_score(), 501);
    assert_eq!(turns[0].to_string(), "Alice: T20 T20 T20 scored 0, 501 left");
    assert_eq!(turns[1].result.next_score(), 441);
}
