//! Command-line interface for tic-tac-toe.

use clap::Parser;
use log::LevelFilter;

use crate::session::SessionConfig;

/// Tic-Tac-Toe against a computer that picks open cells at random
#[derive(Parser, Debug)]
#[command(name = "tic-tac-toe")]
#[command(about = "Play Tic-Tac-Toe against a random opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Your token; asked for on start when omitted
    #[arg(long)]
    pub human_token: Option<char>,

    /// The computer's token; asked for on start when omitted
    #[arg(long)]
    pub computer_token: Option<char>,

    /// Seed for the computer's choices, for repeatable games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Accept a lowercase "y" at the replay prompt
    #[arg(long)]
    pub lenient_replay: bool,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            human_token: self.human_token,
            computer_token: self.computer_token,
            lenient_replay: self.lenient_replay,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}
