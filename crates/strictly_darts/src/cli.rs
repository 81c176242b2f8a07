//! Command-line interface for strictly_darts.

use clap::{Parser, Subcommand};
use strictly_x01::{InRule, OutRule};

/// Strictly Darts - X01 scorekeeper
#[derive(Parser, Debug)]
#[command(name = "strictly_darts")]
#[command(about = "Score X01 darts matches from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a match, one visit per line (e.g. `T20 T20 D20`)
    Play {
        /// Path to match configuration file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Read visits from this file instead of stdin
        #[arg(long)]
        visits: Option<std::path::PathBuf>,

        /// Override the starting score
        #[arg(long)]
        starting_score: Option<u32>,

        /// Override the number of legs
        #[arg(long)]
        legs: Option<u32>,

        /// Override the in rule (straight, double, master)
        #[arg(long)]
        in_rule: Option<InRule>,

        /// Override the out rule (double, straight, master)
        #[arg(long)]
        out_rule: Option<OutRule>,

        /// Play first to this many legs instead of a fixed number
        #[arg(long, conflicts_with = "sets")]
        first_to: Option<u32>,

        /// Play first to this many sets
        #[arg(long)]
        sets: Option<u32>,

        /// Legs needed to win a set (with --sets, default 3)
        #[arg(long, requires = "sets")]
        legs_per_set: Option<u32>,

        /// Decide a leg on score after this many visits per player
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Player names in throwing order (replaces the configured roster)
        #[arg(short, long = "player")]
        players: Vec<String>,

        /// Keep the same opener every leg
        #[arg(long)]
        no_rotate: bool,
    },

    /// Print the suggested finish for a remaining score
    Checkout {
        /// Remaining score
        score: u32,
    },
}
