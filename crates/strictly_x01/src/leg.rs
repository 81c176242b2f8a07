//! Leg state machine.
//!
//! A leg is one countdown from the starting score to zero. Each phase is
//! its own type: only [`LegInProgress`] can take a visit, and a
//! [`LegFinished`] always carries a [`LegOutcome`]. [`Leg`] wraps both
//! phases for storage and for callers that need a single type.
//!
//! A leg normally ends on a checkout. With a round limit it can also end
//! once every player has thrown that many visits: the lowest remaining
//! score takes the leg, and a shared lowest score is a draw.

use crate::checkout::CheckoutTable;
use crate::contracts::{Contract, VisitContract};
use crate::player::{PlayerId, PlayerProfile, PlayerState};
use crate::rules::{InRule, OutRule, VisitResult, apply_visit_rules};
use crate::visit::Visit;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Shared leg data
// ─────────────────────────────────────────────────────────────

/// A visit as it was played in a leg.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Who threw.
    player: PlayerId,
    /// The darts as submitted.
    visit: Visit,
    /// How the visit resolved.
    result: VisitResult,
}

/// Rules a leg is played under.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Getters, derive_new::new, Serialize, Deserialize,
)]
pub struct LegRules {
    /// Rule the first scoring dart must meet.
    #[serde(default)]
    in_rule: InRule,
    /// Rule the finishing dart must meet.
    #[serde(default)]
    out_rule: OutRule,
    /// Visits each player gets before the leg is decided on score.
    #[serde(default)]
    max_rounds: Option<u32>,
}

impl LegRules {
    /// Straight-in rules with the given out rule and no round limit.
    pub fn out(out_rule: OutRule) -> Self {
        Self {
            out_rule,
            ..Self::default()
        }
    }
}

/// Everything a leg tracks, in either phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoresheet {
    pub(crate) starting_score: u32,
    #[serde(default)]
    pub(crate) in_rule: InRule,
    pub(crate) out_rule: OutRule,
    #[serde(default)]
    pub(crate) max_rounds: Option<u32>,
    pub(crate) order: Vec<PlayerId>,
    pub(crate) active_index: usize,
    pub(crate) players: BTreeMap<PlayerId, PlayerState>,
    pub(crate) history: Vec<VisitRecord>,
}

impl Scoresheet {
    /// Score every player started the leg on.
    pub fn starting_score(&self) -> u32 {
        self.starting_score
    }

    /// Rule the first scoring dart must satisfy.
    pub fn in_rule(&self) -> InRule {
        self.in_rule
    }

    /// Rule the finishing dart must satisfy.
    pub fn out_rule(&self) -> OutRule {
        self.out_rule
    }

    /// Round limit, if any.
    pub fn max_rounds(&self) -> Option<u32> {
        self.max_rounds
    }

    /// The rules this leg is played under.
    pub fn rules(&self) -> LegRules {
        LegRules::new(self.in_rule, self.out_rule, self.max_rounds)
    }

    /// Rounds in which every player has thrown.
    pub fn rounds_completed(&self) -> usize {
        match self.order.len() {
            0 => 0,
            n => self.history.len() / n,
        }
    }

    /// Throwing order for this leg.
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// Index into [`Self::order`] of the player to throw (or who won).
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Id of the player at the active index.
    pub fn active_player_id(&self) -> Option<&PlayerId> {
        self.order.get(self.active_index)
    }

    /// Looks up a player's leg state.
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Remaining score of a player.
    pub fn score_of(&self, id: &PlayerId) -> Option<u32> {
        self.players.get(id).map(|p| *p.score())
    }

    /// Players in throwing order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    /// Every visit played so far, oldest first.
    pub fn history(&self) -> &[VisitRecord] {
        &self.history
    }
}

/// Error that can occur when building or advancing a leg.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum LegError {
    /// A leg needs at least one player.
    #[display("A leg needs at least one player")]
    EmptyRoster,

    /// The same id appears twice on the roster.
    #[display("Player {} appears more than once on the roster", _0)]
    DuplicatePlayer(PlayerId),

    /// No score below 2 can be finished under any out rule worth playing.
    #[display("Starting score {} is too low", _0)]
    StartingScoreTooLow(u32),

    /// A round limit of zero would end the leg before anyone throws.
    #[display("A round limit must be at least 1")]
    ZeroRoundLimit,

    /// The active index does not point at a player.
    #[display("Active index {} is out of range for {} players", index, players)]
    ActiveIndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Players in the order.
        players: usize,
    },

    /// An id in the throwing order has no leg state.
    #[display("Player {} has no score in this leg", _0)]
    UnknownPlayer(PlayerId),

    /// A postcondition failed after a visit.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for LegError {}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// Leg still being played - can accept visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegInProgress {
    pub(crate) sheet: Scoresheet,
}

impl LegInProgress {
    /// Starts a double-out leg.
    ///
    /// If `first_to_throw` names a roster member, the order is rotated so
    /// that player leads; otherwise roster order is kept.
    pub fn new(
        starting_score: u32,
        roster: &[PlayerProfile],
        first_to_throw: Option<&PlayerId>,
    ) -> Result<Self, LegError> {
        Self::with_out_rule(starting_score, OutRule::Double, roster, first_to_throw)
    }

    /// Starts a straight-in leg with an explicit out rule.
    pub fn with_out_rule(
        starting_score: u32,
        out_rule: OutRule,
        roster: &[PlayerProfile],
        first_to_throw: Option<&PlayerId>,
    ) -> Result<Self, LegError> {
        Self::with_rules(starting_score, LegRules::out(out_rule), roster, first_to_throw)
    }

    /// Starts a leg under explicit rules.
    #[instrument(skip(roster), fields(players = roster.len()))]
    pub fn with_rules(
        starting_score: u32,
        rules: LegRules,
        roster: &[PlayerProfile],
        first_to_throw: Option<&PlayerId>,
    ) -> Result<Self, LegError> {
        if roster.is_empty() {
            return Err(LegError::EmptyRoster);
        }
        if starting_score < 2 {
            return Err(LegError::StartingScoreTooLow(starting_score));
        }
        if rules.max_rounds == Some(0) {
            return Err(LegError::ZeroRoundLimit);
        }

        let mut seen = HashSet::new();
        for profile in roster {
            if !seen.insert(profile.id()) {
                return Err(LegError::DuplicatePlayer(profile.id().clone()));
            }
        }

        let mut order: Vec<PlayerId> = roster.iter().map(|p| p.id().clone()).collect();
        if let Some(first) = first_to_throw {
            match order.iter().position(|id| id == first) {
                Some(pos) => order.rotate_left(pos),
                None => warn!(first = %first, "First thrower not on roster, keeping roster order"),
            }
        }

        let opened = rules.in_rule.starts_open();
        let players = roster
            .iter()
            .map(|p| (p.id().clone(), PlayerState::new(p.clone(), starting_score, opened)))
            .collect();

        debug!(
            ?order,
            starting_score,
            in_rule = %rules.in_rule,
            out_rule = %rules.out_rule,
            max_rounds = ?rules.max_rounds,
            "Leg created"
        );
        Ok(Self {
            sheet: Scoresheet {
                starting_score,
                in_rule: rules.in_rule,
                out_rule: rules.out_rule,
                max_rounds: rules.max_rounds,
                order,
                active_index: 0,
                players,
                history: Vec::new(),
            },
        })
    }

    /// Plays one visit for the active player, consuming the leg.
    ///
    /// Returns the next phase along with how the visit resolved. On a
    /// checkout the active index stays on the winner. When the visit
    /// completes the last allowed round, the leg is decided on score.
    ///
    /// Contract enforcement:
    /// - Preconditions checked always
    /// - Postconditions checked in debug builds only
    #[instrument(skip(self, visit), fields(visit = %visit, active_index = self.sheet.active_index))]
    pub fn play_visit(self, visit: &Visit) -> Result<(Leg, VisitResult), LegError> {
        #[cfg(debug_assertions)]
        let before = self.sheet.clone();

        VisitContract::pre(&self.sheet, visit)?;

        let mut sheet = self.sheet;
        let player_id = sheet.order[sheet.active_index].clone();
        let player = sheet
            .players
            .get_mut(&player_id)
            .ok_or_else(|| LegError::UnknownPlayer(player_id.clone()))?;

        let result = apply_visit_rules(
            *player.score(),
            visit.darts(),
            sheet.in_rule,
            sheet.out_rule,
            *player.opened(),
        );
        player.set_score(result.next_score());
        if result.opened_at().is_some() {
            player.open();
        }
        debug!(player = %player_id, remaining = result.next_score(), outcome = ?result.outcome(), "Visit applied");

        sheet.history.push(VisitRecord {
            player: player_id.clone(),
            visit: visit.clone(),
            result,
        });

        if result.is_finished() {
            info!(winner = %player_id, visits = sheet.history.len(), "Leg won");
            return Ok((
                Leg::Finished(LegFinished {
                    sheet,
                    outcome: LegOutcome::Checkout(player_id),
                }),
                result,
            ));
        }

        sheet.active_index = (sheet.active_index + 1) % sheet.order.len();

        #[cfg(debug_assertions)]
        VisitContract::post(&before, &sheet)?;

        if let Some(limit) = sheet.max_rounds
            && sheet.active_index == 0
            && sheet.rounds_completed() >= limit as usize
        {
            let outcome = decide_on_score(&sheet);
            info!(rounds = limit, ?outcome, "Round limit reached");
            return Ok((Leg::Finished(LegFinished { sheet, outcome }), result));
        }

        Ok((Leg::InProgress(LegInProgress { sheet }), result))
    }

    /// Plays a sequence of visits, stopping early if the leg is won.
    #[instrument(skip(self, visits), fields(visits = visits.len()))]
    pub fn replay(self, visits: &[Visit]) -> Result<Leg, LegError> {
        let mut leg = self;

        for visit in visits {
            match leg.play_visit(visit)? {
                (Leg::InProgress(next), _) => leg = next,
                (finished @ Leg::Finished(_), _) => return Ok(finished),
            }
        }

        Ok(Leg::InProgress(leg))
    }

    /// The player due to throw.
    pub fn active_player(&self) -> Option<&PlayerState> {
        self.sheet
            .active_player_id()
            .and_then(|id| self.sheet.player(id))
    }

    /// Suggested finish for the active player's remaining score.
    pub fn checkout_hint<'t>(&self, table: &'t CheckoutTable) -> Option<&'t str> {
        self.active_player()
            .and_then(|player| table.suggest(*player.score()))
    }

    /// Returns the leg data.
    pub fn sheet(&self) -> &Scoresheet {
        &self.sheet
    }
}

// ─────────────────────────────────────────────────────────────
//  Finished Phase
// ─────────────────────────────────────────────────────────────

/// How a leg ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegOutcome {
    /// The player checked out.
    Checkout(PlayerId),
    /// The round limit was reached and the player had the lowest score.
    RoundLimit(PlayerId),
    /// The round limit was reached with the lowest score shared.
    Draw,
}

impl LegOutcome {
    /// The leg winner, if there is one.
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            LegOutcome::Checkout(id) | LegOutcome::RoundLimit(id) => Some(id),
            LegOutcome::Draw => None,
        }
    }
}

/// Lowest remaining score takes the leg; a tie for lowest is a draw.
fn decide_on_score(sheet: &Scoresheet) -> LegOutcome {
    let Some(best) = sheet.players().map(|p| *p.score()).min() else {
        return LegOutcome::Draw;
    };
    let mut leaders = sheet.players().filter(|p| *p.score() == best);
    match (leaders.next(), leaders.next()) {
        (Some(leader), None) => LegOutcome::RoundLimit(leader.id().clone()),
        _ => LegOutcome::Draw,
    }
}

/// Leg finished - the outcome is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegFinished {
    sheet: Scoresheet,
    outcome: LegOutcome,
}

impl LegFinished {
    /// How the leg ended.
    pub fn outcome(&self) -> &LegOutcome {
        &self.outcome
    }

    /// Player who won the leg, `None` for a draw.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.outcome.winner()
    }

    /// The checkout visit, if the leg was won on a checkout.
    pub fn winning_visit(&self) -> Option<&VisitRecord> {
        match self.outcome {
            LegOutcome::Checkout(_) => self.sheet.history.last(),
            _ => None,
        }
    }

    /// Returns the leg data.
    pub fn sheet(&self) -> &Scoresheet {
        &self.sheet
    }
}

// ─────────────────────────────────────────────────────────────
//  Wrapper
// ─────────────────────────────────────────────────────────────

/// What happened when a visit was submitted to a [`Leg`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegReport {
    /// Who threw, or `None` if the leg was already over.
    pub thrower: Option<PlayerId>,
    /// True when the leg is finished after this call.
    pub leg_ended: bool,
    /// The leg's winner, once there is one.
    pub winner: Option<PlayerId>,
    /// How the leg ended, once it has.
    pub outcome: Option<LegOutcome>,
    /// Resolution of the submitted visit, `None` if it was not played.
    pub visit_result: Option<VisitResult>,
}

/// A leg in either phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Leg {
    /// Still being played.
    InProgress(LegInProgress),
    /// Over, on a checkout or at the round limit.
    Finished(LegFinished),
}

impl Leg {
    /// Submits a visit to whichever phase the leg is in.
    ///
    /// A finished leg is left untouched and reports its existing outcome.
    #[instrument(skip(self, visit))]
    pub fn play_visit(self, visit: &Visit) -> Result<(Leg, LegReport), LegError> {
        match self {
            Leg::InProgress(leg) => {
                let thrower = leg.sheet.active_player_id().cloned();
                let (next, result) = leg.play_visit(visit)?;
                let report = LegReport {
                    thrower,
                    leg_ended: next.is_finished(),
                    winner: next.winner().cloned(),
                    outcome: next.outcome().cloned(),
                    visit_result: Some(result),
                };
                Ok((next, report))
            }
            Leg::Finished(leg) => {
                warn!(outcome = ?leg.outcome, "Visit submitted to a finished leg, ignoring");
                let report = LegReport {
                    thrower: None,
                    leg_ended: true,
                    winner: leg.winner().cloned(),
                    outcome: Some(leg.outcome.clone()),
                    visit_result: None,
                };
                Ok((Leg::Finished(leg), report))
            }
        }
    }

    /// Returns the leg data for either phase.
    pub fn sheet(&self) -> &Scoresheet {
        match self {
            Leg::InProgress(leg) => &leg.sheet,
            Leg::Finished(leg) => &leg.sheet,
        }
    }

    /// Whether the leg is over.
    pub fn is_finished(&self) -> bool {
        matches!(self, Leg::Finished(_))
    }

    /// How the leg ended, if it has.
    pub fn outcome(&self) -> Option<&LegOutcome> {
        match self {
            Leg::InProgress(_) => None,
            Leg::Finished(leg) => Some(&leg.outcome),
        }
    }

    /// Winner of the leg, if finished and not drawn.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.outcome().and_then(LegOutcome::winner)
    }
}

impl From<LegInProgress> for Leg {
    fn from(leg: LegInProgress) -> Self {
        Leg::InProgress(leg)
    }
}

impl From<LegFinished> for Leg {
    fn from(leg: LegFinished) -> Self {
        Leg::Finished(leg)
    }
}
