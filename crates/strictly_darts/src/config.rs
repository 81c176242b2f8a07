//! Match configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use strictly_x01::{InRule, MatchFormat, MatchSettings, OutRule, PlayerProfile};
use tracing::{debug, info, instrument};

/// Configuration for a scoring session.
///
/// ```toml
/// starting_score = 501
/// total_legs = 3
/// in_rule = "straight"
/// out_rule = "double"
/// max_rounds = 20
/// rotate_first = true
///
/// [format]
/// mode = "sets"
/// sets_to_win = 2
/// legs_per_set = 3
///
/// [[players]]
/// name = "Alice"
///
/// [[players]]
/// id = "bob"
/// name = "Bob"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct DartsConfig {
    /// Score each leg counts down from.
    #[serde(default = "default_starting_score")]
    starting_score: u32,

    /// Number of legs to play under the fixed format.
    #[serde(default = "default_total_legs")]
    total_legs: u32,

    /// How the match is decided.
    #[serde(default)]
    format: MatchFormat,

    /// Rule the first scoring dart must meet.
    #[serde(default)]
    in_rule: InRule,

    /// Rule the finishing dart must meet.
    #[serde(default)]
    out_rule: OutRule,

    /// Visits per player before a leg is decided on score.
    #[serde(default)]
    max_rounds: Option<u32>,

    /// Whether the player after the leg winner opens the next leg.
    #[serde(default = "default_rotate_first")]
    rotate_first: bool,

    /// Roster in throwing order.
    #[serde(default)]
    players: Vec<PlayerEntry>,
}

/// A roster entry in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PlayerEntry {
    /// Optional stable id; derived from the name when absent.
    #[serde(default)]
    id: Option<String>,

    /// Display name.
    name: String,
}

impl PlayerEntry {
    /// Creates an entry whose id is derived from the name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Id used in the match: the explicit id, or the name lowercased with
    /// whitespace runs replaced by `-`.
    pub fn resolved_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => self
                .name
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join("-"),
        }
    }

    /// Converts the entry into a roster profile.
    pub fn profile(&self) -> PlayerProfile {
        PlayerProfile::new(self.resolved_id(), self.name.clone())
    }
}

#[instrument]
fn default_starting_score() -> u32 {
    501
}

#[instrument]
fn default_total_legs() -> u32 {
    3
}

#[instrument]
fn default_rotate_first() -> bool {
    true
}

impl Default for DartsConfig {
    fn default() -> Self {
        Self {
            starting_score: default_starting_score(),
            total_legs: default_total_legs(),
            format: MatchFormat::default(),
            in_rule: InRule::default(),
            out_rule: OutRule::default(),
            max_rounds: None,
            rotate_first: default_rotate_first(),
            players: Vec::new(),
        }
    }
}

impl DartsConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml_str(&content)?;
        info!(players = config.players.len(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Overrides the starting score.
    pub fn with_starting_score(mut self, starting_score: u32) -> Self {
        self.starting_score = starting_score;
        self
    }

    /// Overrides the number of legs.
    pub fn with_total_legs(mut self, total_legs: u32) -> Self {
        self.total_legs = total_legs;
        self
    }

    /// Overrides the out rule.
    pub fn with_out_rule(mut self, out_rule: OutRule) -> Self {
        self.out_rule = out_rule;
        self
    }

    /// Overrides the match format.
    pub fn with_format(mut self, format: MatchFormat) -> Self {
        self.format = format;
        self
    }

    /// Overrides the in rule.
    pub fn with_in_rule(mut self, in_rule: InRule) -> Self {
        self.in_rule = in_rule;
        self
    }

    /// Overrides the per-leg round limit.
    pub fn with_max_rounds(mut self, max_rounds: Option<u32>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Overrides starter rotation.
    pub fn with_rotate_first(mut self, rotate_first: bool) -> Self {
        self.rotate_first = rotate_first;
        self
    }

    /// Replaces the roster with players named on the command line.
    pub fn with_player_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.players = names.into_iter().map(PlayerEntry::named).collect();
        self
    }

    /// Checks the configuration describes a playable match.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_score < 2 {
            return Err(ConfigError::new(format!(
                "starting_score must be at least 2, got {}",
                self.starting_score
            )));
        }
        match self.format {
            MatchFormat::Fixed if self.total_legs == 0 => {
                return Err(ConfigError::new("total_legs must be at least 1"));
            }
            MatchFormat::Legs { legs_to_win: 0 } => {
                return Err(ConfigError::new("legs_to_win must be at least 1"));
            }
            MatchFormat::Sets { sets_to_win: 0, .. } => {
                return Err(ConfigError::new("sets_to_win must be at least 1"));
            }
            MatchFormat::Sets { legs_per_set: 0, .. } => {
                return Err(ConfigError::new("legs_per_set must be at least 1"));
            }
            _ => {}
        }
        if self.max_rounds == Some(0) {
            return Err(ConfigError::new("max_rounds must be at least 1"));
        }
        if self.players.is_empty() {
            return Err(ConfigError::new("at least one player is required"));
        }

        let mut seen = HashSet::new();
        for entry in &self.players {
            let id = entry.resolved_id();
            if id.is_empty() {
                return Err(ConfigError::new("player names must not be blank"));
            }
            if !seen.insert(id.clone()) {
                return Err(ConfigError::new(format!("duplicate player id {:?}", id)));
            }
        }
        Ok(())
    }

    /// Match parameters for the core.
    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings::new(self.starting_score, self.total_legs, self.out_rule)
            .with_in_rule(self.in_rule)
            .with_format(self.format)
            .with_max_rounds(self.max_rounds)
    }

    /// Roster profiles in throwing order.
    pub fn roster(&self) -> Vec<PlayerProfile> {
        self.players.iter().map(PlayerEntry::profile).collect()
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
