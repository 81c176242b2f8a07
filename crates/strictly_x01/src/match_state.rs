//! Match state machine.
//!
//! A match strings legs together. It owns exactly one leg at a time plus the
//! tallies; finished legs are not kept. The leg knows nothing about the
//! tallies: the match watches for a leg finishing and credits the winner
//! itself.
//!
//! Three formats are supported: a fixed number of legs played out in full,
//! first to N legs, and first to N sets where each set goes to the first
//! player to win a given number of legs.

use crate::leg::{Leg, LegError, LegInProgress, LegOutcome, LegRules};
use crate::player::{PlayerId, PlayerProfile};
use crate::rules::{InRule, OutRule, VisitResult};
use crate::visit::Visit;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Conventional X01 starting scores.
pub const STANDARD_STARTING_SCORES: [u32; 4] = [301, 501, 701, 1001];

/// How a match is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum MatchFormat {
    /// Every one of `total_legs` legs is played.
    #[default]
    Fixed,
    /// The first player to win `legs_to_win` legs takes the match.
    Legs {
        /// Legs needed to win.
        legs_to_win: u32,
    },
    /// The first player to win `sets_to_win` sets takes the match.
    Sets {
        /// Sets needed to win.
        sets_to_win: u32,
        /// Legs needed to win a set.
        legs_per_set: u32,
    },
}

impl MatchFormat {
    fn has_zero_target(self) -> bool {
        match self {
            MatchFormat::Fixed => false,
            MatchFormat::Legs { legs_to_win } => legs_to_win == 0,
            MatchFormat::Sets {
                sets_to_win,
                legs_per_set,
            } => sets_to_win == 0 || legs_per_set == 0,
        }
    }
}

/// Parameters fixed for the life of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_new::new, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Score each leg counts down from.
    starting_score: u32,
    /// Number of legs to play out under [`MatchFormat::Fixed`].
    total_legs: u32,
    /// Rule the finishing dart must meet.
    #[serde(default)]
    out_rule: OutRule,
    /// Rule the first scoring dart must meet.
    #[new(default)]
    #[serde(default)]
    in_rule: InRule,
    /// How the match is decided.
    #[new(default)]
    #[serde(default)]
    format: MatchFormat,
    /// Visits each player gets per leg before it is decided on score.
    #[new(default)]
    #[serde(default)]
    max_rounds: Option<u32>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            starting_score: 501,
            total_legs: 3,
            out_rule: OutRule::Double,
            in_rule: InRule::Straight,
            format: MatchFormat::Fixed,
            max_rounds: None,
        }
    }
}

impl MatchSettings {
    /// Sets the in rule.
    pub fn with_in_rule(mut self, in_rule: InRule) -> Self {
        self.in_rule = in_rule;
        self
    }

    /// Sets the match format.
    pub fn with_format(mut self, format: MatchFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the per-leg round limit.
    pub fn with_max_rounds(mut self, max_rounds: Option<u32>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Rules every leg of the match is played under.
    pub fn leg_rules(&self) -> LegRules {
        LegRules::new(self.in_rule, self.out_rule, self.max_rounds)
    }
}

/// Error that can occur when driving a match.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MatchError {
    /// A match must have at least one leg.
    #[display("A match needs at least one leg")]
    NoLegs,

    /// A first-to format needs a target of at least one.
    #[display("Match format {:?} has a zero target", _0)]
    InvalidFormat(MatchFormat),

    /// The id is not on the match roster.
    #[display("Player {} is not in this match", _0)]
    UnknownPlayer(PlayerId),

    /// The match is decided; no further legs are played.
    #[display("All {} legs have been played", _0)]
    NoLegsRemaining(u32),

    /// The current leg has no winner yet.
    #[display("Leg {} is still in progress", _0)]
    LegInProgress(u32),

    /// The leg rejected the operation.
    #[display("Leg error: {}", _0)]
    Leg(LegError),
}

impl std::error::Error for MatchError {}

impl From<LegError> for MatchError {
    fn from(err: LegError) -> Self {
        MatchError::Leg(err)
    }
}

/// What happened when a visit was submitted to a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchVisitReport {
    /// Who threw, or `None` if the leg was already over.
    pub thrower: Option<PlayerId>,
    /// Resolution of the visit, `None` if it was not played.
    pub visit_result: Option<VisitResult>,
    /// True when the current leg is finished.
    pub leg_ended: bool,
    /// Winner of the current leg, once there is one.
    pub winner: Option<PlayerId>,
    /// How the current leg ended, once it has.
    pub outcome: Option<LegOutcome>,
    /// Leg the visit was submitted to.
    pub leg_number: u32,
    /// Set the visit was submitted to (always 1 outside the sets format).
    pub set_number: u32,
    /// Set when this visit won a set.
    pub set_winner: Option<PlayerId>,
    /// True once the match is decided.
    pub match_complete: bool,
}

/// Legs and sets won, per player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Tally {
    legs_won: BTreeMap<PlayerId, u32>,
    #[serde(default)]
    set_legs: BTreeMap<PlayerId, u32>,
    #[serde(default)]
    sets_won: BTreeMap<PlayerId, u32>,
}

impl Tally {
    fn zeroed(roster: &[PlayerProfile]) -> Self {
        let zeros: BTreeMap<PlayerId, u32> = roster.iter().map(|p| (p.id().clone(), 0)).collect();
        Self {
            legs_won: zeros.clone(),
            set_legs: zeros.clone(),
            sets_won: zeros,
        }
    }

    fn get(table: &BTreeMap<PlayerId, u32>, id: &PlayerId) -> u32 {
        table.get(id).copied().unwrap_or(0)
    }
}

fn first_set() -> u32 {
    1
}

/// A match in progress: settings, roster, tallies and the current leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    settings: MatchSettings,
    roster: Vec<PlayerProfile>,
    current_leg_number: u32,
    #[serde(default = "first_set")]
    current_set_number: u32,
    tally: Tally,
    /// Tally as it stood before the current leg was credited.
    #[serde(default)]
    before_credit: Option<Tally>,
    /// The current leg closed a set; the next leg opens a new one.
    #[serde(default)]
    set_closed: bool,
    leg: Leg,
}

impl Match {
    /// Creates a double-out match and starts leg 1 in roster order.
    pub fn new(
        starting_score: u32,
        roster: Vec<PlayerProfile>,
        total_legs: u32,
    ) -> Result<Self, MatchError> {
        Self::with_settings(
            MatchSettings::new(starting_score, total_legs, OutRule::Double),
            roster,
        )
    }

    /// Creates a match from explicit settings.
    #[instrument(skip(roster), fields(players = roster.len()))]
    pub fn with_settings(
        settings: MatchSettings,
        roster: Vec<PlayerProfile>,
    ) -> Result<Self, MatchError> {
        if settings.format == MatchFormat::Fixed && settings.total_legs == 0 {
            return Err(MatchError::NoLegs);
        }
        if settings.format.has_zero_target() {
            return Err(MatchError::InvalidFormat(settings.format));
        }

        let leg = LegInProgress::with_rules(
            settings.starting_score,
            settings.leg_rules(),
            &roster,
            None,
        )?;

        info!(
            starting_score = settings.starting_score,
            total_legs = settings.total_legs,
            format = ?settings.format,
            in_rule = %settings.in_rule,
            out_rule = %settings.out_rule,
            "Match created"
        );
        Ok(Self {
            settings,
            tally: Tally::zeroed(&roster),
            roster,
            current_leg_number: 1,
            current_set_number: 1,
            before_credit: None,
            set_closed: false,
            leg: leg.into(),
        })
    }

    /// Match parameters.
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Players in their original order.
    pub fn roster(&self) -> &[PlayerProfile] {
        &self.roster
    }

    /// Looks up a roster entry.
    pub fn profile(&self, id: &PlayerId) -> Option<&PlayerProfile> {
        self.roster.iter().find(|p| p.id() == id)
    }

    /// Number of legs a fixed-format match plays out.
    pub fn total_legs(&self) -> u32 {
        self.settings.total_legs
    }

    /// Most legs the match can run to, if its format bounds it.
    ///
    /// First-to formats have no bound: drawn legs at the round limit do
    /// not bring anyone closer to the target.
    pub fn leg_limit(&self) -> Option<u32> {
        match self.settings.format {
            MatchFormat::Fixed => Some(self.settings.total_legs),
            _ => None,
        }
    }

    /// 1-based number of the current leg.
    pub fn current_leg_number(&self) -> u32 {
        self.current_leg_number
    }

    /// 1-based number of the current set.
    pub fn current_set_number(&self) -> u32 {
        self.current_set_number
    }

    /// Legs won by a player over the whole match (0 for unknown ids).
    pub fn legs_won(&self, id: &PlayerId) -> u32 {
        Tally::get(&self.tally.legs_won, id)
    }

    /// Legs won by a player in the current set.
    pub fn set_legs_won(&self, id: &PlayerId) -> u32 {
        Tally::get(&self.tally.set_legs, id)
    }

    /// Sets won by a player.
    pub fn sets_won(&self, id: &PlayerId) -> u32 {
        Tally::get(&self.tally.sets_won, id)
    }

    /// The whole legs-won tally.
    pub fn legs_won_table(&self) -> &BTreeMap<PlayerId, u32> {
        &self.tally.legs_won
    }

    /// The current leg.
    pub fn leg(&self) -> &Leg {
        &self.leg
    }

    /// Whether the match is decided.
    pub fn is_complete(&self) -> bool {
        match self.settings.format {
            MatchFormat::Fixed => {
                self.current_leg_number >= self.settings.total_legs && self.leg.is_finished()
            }
            MatchFormat::Legs { legs_to_win } => {
                self.tally.legs_won.values().any(|&n| n >= legs_to_win)
            }
            MatchFormat::Sets { sets_to_win, .. } => {
                self.tally.sets_won.values().any(|&n| n >= sets_to_win)
            }
        }
    }

    /// Players with the most sets won, then the most legs won. Empty until
    /// someone wins a leg.
    pub fn leaders(&self) -> Vec<&PlayerProfile> {
        let standing = |p: &PlayerProfile| (self.sets_won(p.id()), self.legs_won(p.id()));
        let best = self.roster.iter().map(standing).max().unwrap_or((0, 0));
        if best == (0, 0) {
            return Vec::new();
        }
        self.roster.iter().filter(|p| standing(*p) == best).collect()
    }

    /// The match winner, once the match is complete and not tied.
    pub fn winner(&self) -> Option<&PlayerProfile> {
        if !self.is_complete() {
            return None;
        }
        match self.leaders().as_slice() {
            [winner] => Some(*winner),
            _ => None,
        }
    }

    /// Plays a visit on the current leg, crediting the winner if it ends.
    #[instrument(skip(self, visit), fields(leg = self.current_leg_number, visit = %visit))]
    pub fn play_visit(mut self, visit: &Visit) -> Result<(Self, MatchVisitReport), MatchError> {
        let (leg, report) = self.leg.play_visit(visit)?;
        self.leg = leg;

        let set_number = self.current_set_number;
        let just_finished = report.leg_ended && report.visit_result.is_some();
        let mut set_winner = None;
        if just_finished && let Some(winner) = &report.winner {
            if self.credit_leg(winner) {
                set_winner = Some(winner.clone());
            }
        }

        let summary = MatchVisitReport {
            thrower: report.thrower,
            visit_result: report.visit_result,
            leg_ended: report.leg_ended,
            winner: report.winner,
            outcome: report.outcome,
            leg_number: self.current_leg_number,
            set_number,
            set_winner,
            match_complete: self.is_complete(),
        };
        Ok((self, summary))
    }

    /// Credits one leg to `winner`.
    #[instrument(skip(self), fields(leg = self.current_leg_number))]
    pub fn record_leg_win(mut self, winner: &PlayerId) -> Result<Self, MatchError> {
        if self.profile(winner).is_none() {
            return Err(MatchError::UnknownPlayer(winner.clone()));
        }
        self.credit_leg(winner);
        Ok(self)
    }

    /// Adds the leg to the tallies. Returns true if it also won a set.
    fn credit_leg(&mut self, winner: &PlayerId) -> bool {
        self.before_credit = Some(self.tally.clone());

        let legs = self.tally.legs_won.entry(winner.clone()).or_insert(0);
        *legs += 1;
        info!(winner = %winner, legs_won = *legs, "Leg credited");

        let MatchFormat::Sets { legs_per_set, .. } = self.settings.format else {
            return false;
        };
        let in_set = self.tally.set_legs.entry(winner.clone()).or_insert(0);
        *in_set += 1;
        if *in_set < legs_per_set {
            return false;
        }

        self.tally.set_legs.values_mut().for_each(|n| *n = 0);
        let sets = self.tally.sets_won.entry(winner.clone()).or_insert(0);
        *sets += 1;
        self.set_closed = true;
        info!(winner = %winner, set = self.current_set_number, sets_won = *sets, "Set won");
        true
    }

    /// Checks whether [`Self::next_leg`] would succeed.
    pub fn can_start_next_leg(&self) -> Result<(), MatchError> {
        if !self.leg.is_finished() {
            return Err(MatchError::LegInProgress(self.current_leg_number));
        }
        if self.is_complete() {
            return Err(MatchError::NoLegsRemaining(self.current_leg_number));
        }
        Ok(())
    }

    /// Player who would open the next leg.
    ///
    /// With `rotate_first` this is whoever follows the winner in the
    /// finished leg's order (the follower of the opener after a drawn
    /// leg); otherwise the finished leg's opener again.
    pub fn next_starter(&self, rotate_first: bool) -> Option<&PlayerId> {
        let order = self.leg.sheet().order();
        if order.is_empty() {
            return None;
        }
        let index = if rotate_first {
            let anchor = self
                .leg
                .winner()
                .and_then(|winner| order.iter().position(|id| id == winner))
                .unwrap_or(0);
            (anchor + 1) % order.len()
        } else {
            0
        };
        order.get(index)
    }

    /// Replaces the finished leg with a fresh one.
    #[instrument(skip(self), fields(leg = self.current_leg_number))]
    pub fn next_leg(mut self, rotate_first: bool) -> Result<Self, MatchError> {
        self.can_start_next_leg()?;

        let starter = self.next_starter(rotate_first).cloned();
        let leg = LegInProgress::with_rules(
            self.settings.starting_score,
            self.settings.leg_rules(),
            &self.roster,
            starter.as_ref(),
        )?;

        self.current_leg_number += 1;
        if let Some(limit) = self.leg_limit() {
            self.current_leg_number = self.current_leg_number.min(limit);
        }
        if self.set_closed {
            self.current_set_number += 1;
            self.set_closed = false;
        }
        self.before_credit = None;
        self.leg = leg.into();
        debug!(
            leg = self.current_leg_number,
            set = self.current_set_number,
            starter = ?starter,
            "Next leg started"
        );
        Ok(self)
    }

    /// Restarts the current leg from scratch in roster order.
    ///
    /// A leg that had already been won is voided: the tallies go back to
    /// where they stood before it was credited, set included.
    #[instrument(skip(self), fields(leg = self.current_leg_number))]
    pub fn replay_leg(mut self) -> Result<Self, MatchError> {
        if self.leg.is_finished()
            && let Some(tally) = self.before_credit.take()
        {
            warn!(winner = ?self.leg.winner(), "Won leg voided for replay");
            self.tally = tally;
            self.set_closed = false;
        }

        let leg = LegInProgress::with_rules(
            self.settings.starting_score,
            self.settings.leg_rules(),
            &self.roster,
            None,
        )?;
        self.leg = leg.into();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<PlayerProfile> {
        vec![PlayerProfile::new("a", "Alice"), PlayerProfile::new("b", "Bob")]
    }

    fn visit(notation: &str) -> Visit {
        notation.parse().unwrap()
    }

    #[test]
    fn test_new_match() {
        let game = Match::new(501, roster(), 3).unwrap();
        assert_eq!(game.current_leg_number(), 1);
        assert_eq!(game.total_legs(), 3);
        assert_eq!(game.legs_won(&PlayerId::from("a")), 0);
        assert_eq!(game.leg().sheet().order()[0], PlayerId::from("a"));
        assert!(!game.is_complete());
        assert!(game.leaders().is_empty());
    }

    #[test]
    fn test_rejects_zero_legs() {
        assert_eq!(Match::new(501, roster(), 0), Err(MatchError::NoLegs));
    }

    #[test]
    fn test_rejects_empty_roster() {
        assert_eq!(
            Match::new(501, Vec::new(), 3),
            Err(MatchError::Leg(LegError::EmptyRoster))
        );
    }

    #[test]
    fn test_record_leg_win_rejects_stranger() {
        let game = Match::new(501, roster(), 3).unwrap();
        assert_eq!(
            game.record_leg_win(&PlayerId::from("zed")),
            Err(MatchError::UnknownPlayer(PlayerId::from("zed")))
        );
    }

    #[test]
    fn test_next_leg_requires_finished_leg() {
        let game = Match::new(501, roster(), 3).unwrap();
        assert_eq!(game.next_leg(true), Err(MatchError::LegInProgress(1)));
    }

    #[test]
    fn test_replay_voids_won_leg() {
        let game = Match::new(40, roster(), 3).unwrap();
        let (game, report) = game.play_visit(&visit("D20")).unwrap();
        assert!(report.leg_ended);
        assert_eq!(game.legs_won(&PlayerId::from("a")), 1);

        let game = game.replay_leg().unwrap();
        assert_eq!(game.legs_won(&PlayerId::from("a")), 0);
        assert_eq!(game.current_leg_number(), 1);
        assert!(!game.leg().is_finished());
        assert_eq!(game.leg().sheet().score_of(&PlayerId::from("a")), Some(40));
    }

    #[test]
    fn test_replay_restarts_in_roster_order() {
        let game = Match::new(40, roster(), 3).unwrap();
        let (game, _) = game.play_visit(&visit("D20")).unwrap();
        let game = game.next_leg(true).unwrap();
        assert_eq!(game.leg().sheet().order()[0], PlayerId::from("b"));

        let (game, _) = game.play_visit(&visit("D20")).unwrap();
        assert_eq!(game.legs_won(&PlayerId::from("b")), 1);

        let game = game.replay_leg().unwrap();
        assert_eq!(game.leg().sheet().order()[0], PlayerId::from("a"));
        assert_eq!(game.legs_won(&PlayerId::from("b")), 0);
        assert_eq!(game.legs_won(&PlayerId::from("a")), 1);
        assert_eq!(game.current_leg_number(), 2);
    }

    #[test]
    fn test_replay_of_unfinished_leg_keeps_tally() {
        let game = Match::new(40, roster(), 3).unwrap();
        let (game, _) = game.play_visit(&visit("D20")).unwrap();
        let game = game.next_leg(true).unwrap();
        let (game, _) = game.play_visit(&visit("20")).unwrap();

        let game = game.replay_leg().unwrap();
        assert_eq!(game.legs_won(&PlayerId::from("a")), 1);
        assert_eq!(game.leg().sheet().score_of(&PlayerId::from("b")), Some(40));
    }

    #[test]
    fn test_rejects_zero_targets() {
        let zero_legs = MatchSettings::default().with_format(MatchFormat::Legs { legs_to_win: 0 });
        assert_eq!(
            Match::with_settings(zero_legs, roster()),
            Err(MatchError::InvalidFormat(MatchFormat::Legs { legs_to_win: 0 }))
        );

        let zero_set = MatchSettings::default().with_format(MatchFormat::Sets {
            sets_to_win: 2,
            legs_per_set: 0,
        });
        assert!(matches!(
            Match::with_settings(zero_set, roster()),
            Err(MatchError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_settings_default() {
        let settings = MatchSettings::default();
        assert_eq!(*settings.starting_score(), 501);
        assert_eq!(*settings.total_legs(), 3);
        assert_eq!(*settings.out_rule(), OutRule::Double);
        assert_eq!(*settings.in_rule(), InRule::Straight);
        assert_eq!(*settings.format(), MatchFormat::Fixed);
        assert_eq!(*settings.max_rounds(), None);
        assert!(STANDARD_STARTING_SCORES.contains(settings.starting_score()));
    }
}
