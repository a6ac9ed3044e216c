mod cli;
mod error;
mod game;
mod player;
mod session;

use std::io;

use clap::Parser;
use log::LevelFilter;

use cli::Cli;
use player::{Player, RandomPlayer};
use session::{Session, SessionConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    log(cli.log_level())?;

    let config = cli.session_config();
    match cli.seed {
        Some(seed) => {
            log::info!("seeding computer player with {}", seed);
            play(config, RandomPlayer::seeded(seed))
        }
        None => play(config, RandomPlayer::new()),
    }
}

/// Logs to stderr so stdout carries only the game.
fn log(level: LevelFilter) -> anyhow::Result<()> {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn play(config: SessionConfig, player: impl Player) -> anyhow::Result<()> {
    let session = Session::new(config, io::stdin().lock(), io::stdout(), player);
    let scoreboard = session.run()?;
    log::info!("played {} rounds", scoreboard.rounds());
    Ok(())
}
