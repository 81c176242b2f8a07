//! Line-oriented scoring session over a match.

use crate::config::{ConfigError, DartsConfig};
use strictly_x01::{
    CheckoutTable, LegOutcome, Match, MatchError, PlayerId, PlayerProfile, Visit, VisitError,
    VisitResult,
};
use tracing::{debug, info, instrument, warn};

/// Error raised while scoring.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum SessionError {
    /// The configuration could not start a match.
    #[display("{}", _0)]
    Config(ConfigError),

    /// The line was not a valid visit.
    #[display("Could not read visit: {}", _0)]
    Parse(VisitError),

    /// The match rejected the visit.
    #[display("{}", _0)]
    Match(MatchError),

    /// Every leg has been played.
    #[display("The match is over")]
    MatchOver,
}

impl std::error::Error for SessionError {}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        SessionError::Config(err)
    }
}

impl From<VisitError> for SessionError {
    fn from(err: VisitError) -> Self {
        SessionError::Parse(err)
    }
}

impl From<MatchError> for SessionError {
    fn from(err: MatchError) -> Self {
        SessionError::Match(err)
    }
}

/// One scored turn, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    /// Who threw.
    pub thrower: PlayerProfile,
    /// The darts as entered.
    pub visit: Visit,
    /// How the visit resolved.
    pub result: VisitResult,
    /// Leg the visit was played in.
    pub leg_number: u32,
    /// Set when this visit won the leg.
    pub leg_winner: Option<PlayerProfile>,
    /// How the leg ended, if this visit ended it.
    pub leg_outcome: Option<LegOutcome>,
    /// Set the visit was played in.
    pub set_number: u32,
    /// Set when this visit won a set.
    pub set_winner: Option<PlayerProfile>,
    /// Set when a new leg was started after this visit.
    pub next_leg: Option<u32>,
    /// Whether the match is decided.
    pub match_complete: bool,
}

/// Drives a [`Match`] from text input, one visit per line.
///
/// Finished legs roll straight into the next one until the match is
/// complete.
#[derive(Debug, Clone)]
pub struct ScoringSession {
    game: Match,
    rotate_first: bool,
    checkouts: CheckoutTable,
}

impl ScoringSession {
    /// Wraps an existing match.
    pub fn new(game: Match, rotate_first: bool, checkouts: CheckoutTable) -> Self {
        Self {
            game,
            rotate_first,
            checkouts,
        }
    }

    /// Validates the config and starts leg 1.
    #[instrument(skip(config))]
    pub fn from_config(config: &DartsConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let game = Match::with_settings(config.match_settings(), config.roster())?;
        info!(players = game.roster().len(), "Session started");
        Ok(Self::new(
            game,
            *config.rotate_first(),
            CheckoutTable::standard(),
        ))
    }

    /// Current match state.
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Whether the player after the leg winner opens the next leg.
    pub fn rotate_first(&self) -> bool {
        self.rotate_first
    }

    /// Whether the match is decided.
    pub fn is_over(&self) -> bool {
        self.game.is_complete()
    }

    /// Profile of the player due to throw, if the leg is live.
    pub fn next_thrower(&self) -> Option<&PlayerProfile> {
        if self.game.leg().is_finished() {
            return None;
        }
        let id = self.game.leg().sheet().active_player_id()?;
        self.game.profile(id)
    }

    /// Suggested finish for the player due to throw.
    pub fn checkout_hint(&self) -> Option<&str> {
        let thrower = self.next_thrower()?;
        let remaining = self.game.leg().sheet().score_of(thrower.id())?;
        self.checkouts.suggest(remaining)
    }

    /// Scores one line of input.
    ///
    /// Blank lines and `#` comments yield `Ok(None)`. On error the match is
    /// left exactly as it was.
    #[instrument(skip(self))]
    pub fn submit_line(&mut self, line: &str) -> Result<Option<TurnSummary>, SessionError> {
        let text = line.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self.game.is_complete() {
            warn!("Visit submitted after the match ended");
            return Err(SessionError::MatchOver);
        }

        let visit: Visit = text.parse()?;
        self.submit(visit).map(Some)
    }

    /// Scores a parsed visit.
    #[instrument(skip(self, visit), fields(visit = %visit))]
    pub fn submit(&mut self, visit: Visit) -> Result<TurnSummary, SessionError> {
        if self.game.is_complete() {
            return Err(SessionError::MatchOver);
        }

        let (game, report) = self.game.clone().play_visit(&visit)?;
        let (Some(thrower), Some(result)) = (report.thrower.clone(), report.visit_result) else {
            // A live leg always reports its thrower and result.
            return Err(SessionError::MatchOver);
        };

        let thrower = lookup(&game, &thrower)?;
        let leg_winner = match &report.winner {
            Some(id) => Some(lookup(&game, id)?),
            None => None,
        };
        let set_winner = match &report.set_winner {
            Some(id) => Some(lookup(&game, id)?),
            None => None,
        };
        let leg_outcome = if report.leg_ended {
            report.outcome.clone()
        } else {
            None
        };

        let mut next_leg = None;
        let game = if report.leg_ended && !report.match_complete {
            let game = game.next_leg(self.rotate_first)?;
            debug!(leg = game.current_leg_number(), "Next leg started");
            next_leg = Some(game.current_leg_number());
            game
        } else {
            game
        };

        if report.match_complete {
            info!(leg = report.leg_number, "Match complete");
        }
        self.game = game;

        Ok(TurnSummary {
            thrower,
            visit,
            result,
            leg_number: report.leg_number,
            leg_winner,
            leg_outcome,
            set_number: report.set_number,
            set_winner,
            next_leg,
            match_complete: report.match_complete,
        })
    }

    /// Scores every line in order, stopping at the first error.
    pub fn play_lines<'a, I>(&mut self, lines: I) -> Result<Vec<TurnSummary>, SessionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut turns = Vec::new();
        for line in lines {
            if let Some(turn) = self.submit_line(line)? {
                turns.push(turn);
            }
        }
        Ok(turns)
    }
}

fn lookup(game: &Match, id: &PlayerId) -> Result<PlayerProfile, SessionError> {
    game.profile(id)
        .cloned()
        .ok_or_else(|| SessionError::Match(MatchError::UnknownPlayer(id.clone())))
}
