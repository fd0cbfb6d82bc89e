mod clock;
mod config;
mod display;
mod error;
mod food;
mod game;
mod menu;
mod scoreboard;
mod session;
mod snake;
mod term;

use std::fs::File;
use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use clap::Parser;

use crate::config::GameConfig;
use crate::game::SnakeGame;

/// Positions are `(row, col)`, signed so a head stepping past an edge is still representable.
pub type Coords = (i32, i32);

#[derive(Parser, Debug)]
#[command(name = "snake", version, about = "Snake in the terminal")]
struct CliArgs {
    /// JSON file with gameplay, glyph, colour and key settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use this many rows instead of the terminal height
    #[arg(long)]
    rows: Option<u16>,

    /// Use this many columns instead of the terminal width
    #[arg(long)]
    cols: Option<u16>,

    /// Write log output here instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() {
    let args = CliArgs::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("snake: {:#}", e);
        exit(1);
    }

    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        eprintln!("snake: {:#}", e);
        exit(1);
    }
}

fn init_logging(args: &CliArgs) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    // The screen is in raw mode while playing, stderr output would land on the grid
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => GameConfig::default(),
    };

    let (rows, cols) = term::session_size(args.rows, args.cols)?;
    log::info!("starting on a {}x{} grid", rows, cols);

    let mut game = SnakeGame::new(config, rows, cols)?;

    // Leave the terminal usable no matter how the session ended
    let res = game.initialize().and_then(|()| game.run());
    game.restore()?;
    res
}
