//! Player identity and per-leg score.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Unique identifier for a player on the roster.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A roster entry: who is throwing, independent of any leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, derive_new::new, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Unique id.
    #[new(into)]
    id: PlayerId,
    /// Display name.
    #[new(into)]
    name: String,
}

/// A player's standing within one leg.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PlayerState {
    /// Who this is.
    profile: PlayerProfile,
    /// Points still required to finish.
    score: u32,
    /// Whether the player has met the leg's in rule.
    #[serde(default = "opened_by_default")]
    opened: bool,
}

fn opened_by_default() -> bool {
    true
}

impl PlayerState {
    /// Starts a player on the leg's starting score.
    pub(crate) fn new(profile: PlayerProfile, starting_score: u32, opened: bool) -> Self {
        Self {
            profile,
            score: starting_score,
            opened,
        }
    }

    /// Player id shortcut.
    pub fn id(&self) -> &PlayerId {
        self.profile.id()
    }

    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub(crate) fn open(&mut self) {
        self.opened = true;
    }
}
