//! Tests for the leg state machine.

use strictly_x01::{
    BustReason, InRule, Leg, LegError, LegInProgress, LegOutcome, LegRules, OutRule, PlayerId,
    PlayerProfile, Visit, VisitOutcome,
};

fn roster(ids: &[&str]) -> Vec<PlayerProfile> {
    ids.iter()
        .map(|id| PlayerProfile::new(*id, id.to_uppercase()))
        .collect()
}

fn visit(notation: &str) -> Visit {
    notation.parse().expect("valid visit")
}

fn in_progress(leg: Leg) -> LegInProgress {
    match leg {
        Leg::InProgress(leg) => leg,
        Leg::Finished(_) => panic!("Leg shouldn't be finished"),
    }
}

#[test]
fn test_leg_lifecycle() {
    let leg = LegInProgress::new(501, &roster(&["a"]), None).expect("valid leg");
    assert_eq!(leg.sheet().score_of(&PlayerId::from("a")), Some(501));

    let (leg, result) = leg.play_visit(&visit("T20 T20 D20")).expect("visit played");
    assert!(!result.is_bust());
    assert_eq!(result.next_score(), 341);

    let leg = in_progress(leg);
    assert_eq!(leg.sheet().score_of(&PlayerId::from("a")), Some(341));
    assert_eq!(leg.sheet().active_index(), 0);
}

#[test]
fn test_reaching_zero_on_single_busts() {
    let leg = LegInProgress::new(60, &roster(&["a", "b"]), None).unwrap();
    let (leg, result) = leg.play_visit(&visit("20 20 20")).unwrap();

    assert_eq!(
        result.outcome(),
        VisitOutcome::Bust {
            dart_index: 2,
            reason: BustReason::InvalidFinish
        }
    );
    let leg = in_progress(leg);
    assert_eq!(leg.sheet().score_of(&PlayerId::from("a")), Some(60));
    assert_eq!(leg.sheet().active_index(), 1);
}

#[test]
fn test_leaving_one_busts_from_any_dart() {
    for (start, notation, index) in [(3, "2", 0), (23, "10 10 2", 2), (41, "20 20", 1)] {
        let leg = LegInProgress::new(start, &roster(&["a"]), None).unwrap();
        let (leg, result) = leg.play_visit(&visit(notation)).unwrap();

        assert_eq!(
            result.outcome(),
            VisitOutcome::Bust {
                dart_index: index,
                reason: BustReason::LeftOne
            },
            "{notation} from {start}"
        );
        assert_eq!(leg.sheet().score_of(&PlayerId::from("a")), Some(start));
    }
}

#[test]
fn test_finished_leg_ignores_further_visits() {
    let leg = LegInProgress::new(40, &roster(&["a", "b"]), None).unwrap();
    let (leg, report) = Leg::from(leg).play_visit(&visit("D20")).unwrap();
    assert!(report.leg_ended);
    assert_eq!(report.winner, Some(PlayerId::from("a")));
    assert_eq!(report.thrower, Some(PlayerId::from("a")));

    let snapshot = leg.clone();
    let (leg, report) = leg.play_visit(&visit("T20")).unwrap();

    assert_eq!(leg, snapshot);
    assert!(report.leg_ended);
    assert_eq!(report.winner, Some(PlayerId::from("a")));
    assert_eq!(report.thrower, None);
    assert_eq!(report.visit_result, None);
    assert_eq!(leg.sheet().score_of(&PlayerId::from("b")), Some(40));
}

#[test]
fn test_turn_rotation_follows_visit_count() {
    let players = roster(&["a", "b", "c"]);
    for n in 0..10 {
        let visits = vec![visit("1 1 1"); n];
        let leg = LegInProgress::new(501, &players, None).unwrap();
        let leg = in_progress(leg.replay(&visits).unwrap());
        assert_eq!(leg.sheet().active_index(), n % 3, "after {n} visits");
    }
}

#[test]
fn test_replay_stops_at_checkout() {
    let visits = [visit("T20 T20 Bull"), visit("T20"), visit("T20")];
    let leg = LegInProgress::new(170, &roster(&["a", "b"]), None).unwrap();

    let leg = leg.replay(&visits).unwrap();
    assert!(leg.is_finished());
    assert_eq!(leg.winner(), Some(&PlayerId::from("a")));
    assert_eq!(leg.sheet().history().len(), 1);
    assert_eq!(leg.sheet().score_of(&PlayerId::from("b")), Some(170));
}

#[test]
fn test_winner_recorded_and_history_kept() {
    let visits = [visit("T20 T20 T20"), visit("T19 T19 T19"), visit("T20 T20 D20")];
    let leg = LegInProgress::new(340, &roster(&["a", "b"]), None).unwrap();

    match leg.replay(&visits).unwrap() {
        Leg::Finished(finished) => {
            assert_eq!(finished.winner(), Some(&PlayerId::from("a")));
            assert_eq!(finished.outcome(), &LegOutcome::Checkout(PlayerId::from("a")));
            assert_eq!(finished.sheet().history().len(), 3);
            assert_eq!(finished.sheet().score_of(&PlayerId::from("b")), Some(340 - 171));
            assert_eq!(
                finished
                    .winning_visit()
                    .and_then(|r| r.result().checkout_dart_index()),
                Some(2)
            );
        }
        Leg::InProgress(_) => panic!("Leg should be finished"),
    }
}

#[test]
fn test_leg_serializes() {
    let leg = LegInProgress::new(301, &roster(&["a", "b"]), None).unwrap();
    let (leg, _) = leg.play_visit(&visit("T20 5 1")).unwrap();

    let json = serde_json::to_string(&leg).expect("serialize");
    let back: Leg = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, leg);
}

fn rules(in_rule: InRule, max_rounds: Option<u32>) -> LegRules {
    LegRules::new(in_rule, OutRule::Double, max_rounds)
}

fn start(score: u32, rules: LegRules, ids: &[&str]) -> LegInProgress {
    LegInProgress::with_rules(score, rules, &roster(ids), None).expect("valid leg")
}

#[test]
fn test_double_in_leg_waits_for_a_double() {
    let leg = start(501, rules(InRule::Double, None), &["a", "b"]);

    let (leg, result) = leg.play_visit(&visit("T20 T20 T20")).unwrap();
    assert_eq!(result.scored(), 0);
    assert_eq!(result.opened_at(), None);

    let leg = in_progress(leg);
    let (leg, result) = leg.play_visit(&visit("5 D16 T20")).unwrap();
    assert_eq!(result.opened_at(), Some(1));
    assert_eq!(result.next_score(), 501 - 32 - 60);

    let leg = in_progress(leg);
    let (leg, _) = leg.play_visit(&visit("T20 T20 T20")).unwrap();
    assert_eq!(leg.sheet().score_of(&PlayerId::from("a")), Some(501));
    assert_eq!(leg.sheet().score_of(&PlayerId::from("b")), Some(409));
}

#[test]
fn test_round_limit_goes_to_lowest_score() {
    let leg = start(501, rules(InRule::Straight, Some(2)), &["a", "b"]);
    let visits = [visit("T20"), visit("T19"), visit("20"), visit("T20 T20")];

    let leg = leg.replay(&visits).unwrap();
    assert!(leg.is_finished());
    assert_eq!(leg.outcome(), Some(&LegOutcome::RoundLimit(PlayerId::from("b"))));
    assert_eq!(leg.winner(), Some(&PlayerId::from("b")));
    assert_eq!(leg.sheet().history().len(), 4);
}

#[test]
fn test_round_limit_with_level_scores_is_a_draw() {
    let leg = start(501, rules(InRule::Straight, Some(1)), &["a", "b"]);
    let (leg, _) = Leg::from(leg).play_visit(&visit("T20")).unwrap();
    assert!(!leg.is_finished());

    let (leg, report) = leg.play_visit(&visit("T20")).unwrap();
    assert!(report.leg_ended);
    assert_eq!(report.winner, None);
    assert_eq!(report.outcome, Some(LegOutcome::Draw));
    assert_eq!(leg.winner(), None);

    match leg {
        Leg::Finished(finished) => assert!(finished.winning_visit().is_none()),
        Leg::InProgress(_) => panic!("Leg should be finished"),
    }
}

#[test]
fn test_checkout_beats_round_limit() {
    let leg = start(40, rules(InRule::Straight, Some(1)), &["a", "b"]);
    let (leg, _) = Leg::from(leg).play_visit(&visit("20")).unwrap();
    let (leg, _) = leg.play_visit(&visit("D20")).unwrap();
    assert_eq!(leg.outcome(), Some(&LegOutcome::Checkout(PlayerId::from("b"))));
}

#[test]
fn test_zero_round_limit_rejected() {
    let result =
        LegInProgress::with_rules(501, rules(InRule::Straight, Some(0)), &roster(&["a"]), None);
    assert_eq!(result.unwrap_err(), LegError::ZeroRoundLimit);
}
