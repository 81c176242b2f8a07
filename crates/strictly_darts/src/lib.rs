//! Strictly Darts - terminal scorekeeping on top of `strictly_x01`.
//!
//! Loads a [`DartsConfig`], drives a [`ScoringSession`] one line at a time
//! and renders results with [`Scoreboard`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod scoreboard;
mod session;

pub use config::{ConfigError, DartsConfig, PlayerEntry};
pub use scoreboard::Scoreboard;
pub use session::{ScoringSession, SessionError, TurnSummary};
