//! Strictly Darts - Unified CLI
//!
//! Scores X01 matches read from a file or typed at the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use strictly_darts::{DartsConfig, Scoreboard, ScoringSession, SessionError};
use strictly_x01::{CheckoutTable, InRule, MAX_CHECKOUT, MIN_CHECKOUT, MatchFormat, OutRule};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Legs per set when `--sets` is given without `--legs-per-set`.
const DEFAULT_LEGS_PER_SET: u32 = 3;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            visits,
            starting_score,
            legs,
            in_rule,
            out_rule,
            first_to,
            sets,
            legs_per_set,
            max_rounds,
            players,
            no_rotate,
        } => {
            let format = match (sets, first_to) {
                (Some(sets_to_win), _) => Some(MatchFormat::Sets {
                    sets_to_win,
                    legs_per_set: legs_per_set.unwrap_or(DEFAULT_LEGS_PER_SET),
                }),
                (None, Some(legs_to_win)) => Some(MatchFormat::Legs { legs_to_win }),
                (None, None) => None,
            };
            let overrides = Overrides {
                starting_score,
                legs,
                in_rule,
                out_rule,
                format,
                max_rounds,
                players,
                no_rotate,
            };
            run_play(config.as_deref(), visits, overrides)
        }
        Command::Checkout { score } => run_checkout(score),
    }
}

/// Logs go to stderr so stdout carries only the scoreboard.
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Command-line settings that win over the config file.
#[derive(Debug, Default)]
struct Overrides {
    starting_score: Option<u32>,
    legs: Option<u32>,
    in_rule: Option<InRule>,
    out_rule: Option<OutRule>,
    format: Option<MatchFormat>,
    max_rounds: Option<u32>,
    players: Vec<String>,
    no_rotate: bool,
}

#[instrument(skip(overrides))]
fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<DartsConfig> {
    let mut config = match path {
        Some(path) => DartsConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            info!("No config file given, using defaults");
            DartsConfig::default()
        }
    };

    if let Some(score) = overrides.starting_score {
        config = config.with_starting_score(score);
    }
    if let Some(legs) = overrides.legs {
        config = config.with_total_legs(legs);
    }
    if let Some(rule) = overrides.in_rule {
        config = config.with_in_rule(rule);
    }
    if let Some(rule) = overrides.out_rule {
        config = config.with_out_rule(rule);
    }
    if let Some(format) = overrides.format {
        config = config.with_format(format);
    }
    if overrides.max_rounds.is_some() {
        config = config.with_max_rounds(overrides.max_rounds);
    }
    if overrides.no_rotate {
        config = config.with_rotate_first(false);
    }
    if !overrides.players.is_empty() {
        config = config.with_player_names(overrides.players);
    } else if config.players().is_empty() {
        info!("No players configured, using two anonymous players");
        config = config.with_player_names(["Player 1", "Player 2"]);
    }

    debug!(?config, "Effective configuration");
    Ok(config)
}

/// Run a scoring session until the match ends or input runs out
#[instrument(skip(overrides))]
fn run_play(config: Option<&Path>, visits: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = load_config(config, overrides)?;
    let mut session = ScoringSession::from_config(&config)?;

    let input: Box<dyn BufRead> = match &visits {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };

    print!("{}", Scoreboard(session.game()));
    print_prompt(&session);

    for line in input.lines() {
        let line = line.context("reading visits")?;
        match session.submit_line(&line) {
            Ok(Some(turn)) => {
                println!("{}", turn);
                if turn.next_leg.is_some() || turn.match_complete {
                    print!("{}", Scoreboard(session.game()));
                }
                if turn.match_complete {
                    break;
                }
                print_prompt(&session);
            }
            Ok(None) => {}
            Err(SessionError::Parse(e)) => {
                warn!(line = %line, error = %e, "Skipping unreadable visit");
                eprintln!("{} (skipped)", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if session.is_over() {
        match session.game().winner() {
            Some(winner) => println!("Winner: {}", winner.name()),
            None => {
                let leaders = session.game().leaders();
                let names: Vec<&str> = leaders.iter().map(|p| p.name().as_str()).collect();
                if names.is_empty() {
                    println!("No winner: every leg was drawn");
                } else {
                    println!("Tied: {}", names.join(", "));
                }
            }
        }
    } else {
        info!("Input ended before the match was decided");
    }
    Ok(())
}

fn print_prompt(session: &ScoringSession) {
    let Some(thrower) = session.next_thrower() else {
        return;
    };
    match session.checkout_hint() {
        Some(route) => println!("{} to throw (checkout: {})", thrower.name(), route),
        None => println!("{} to throw", thrower.name()),
    }
}

/// Print the suggested finish for a score
#[instrument]
fn run_checkout(score: u32) -> Result<()> {
    let table = CheckoutTable::standard();
    match table.suggest(score) {
        Some(route) => println!("{}: {}", score, route),
        None if (MIN_CHECKOUT..=MAX_CHECKOUT).contains(&score) => {
            println!("{}: no standard checkout", score)
        }
        None => println!(
            "{}: out of checkout range ({}-{})",
            score, MIN_CHECKOUT, MAX_CHECKOUT
        ),
    }
    Ok(())
}
