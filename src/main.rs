//! Headless match-3 simulator (default binary).
//!
//! Plays a session by itself: each turn taps a special piece if one is on the
//! board, otherwise makes the first legal swap the hint finder reports.
//! Events can be streamed to stdout as JSON lines; logs go to stderr.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use match3_rules::core::{DelayPresenter, HeadlessPresenter};
use match3_rules::engine::Match3;
use match3_rules::types::{GameMode, Match3Config, Position};

#[derive(Parser, Debug)]
#[command(name = "match3-sim")]
#[command(about = "Run a headless match-3 session and report what happened")]
struct Cli {
    /// Grid rows (overrides MATCH3_ROWS)
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns (overrides MATCH3_COLUMNS)
    #[arg(long)]
    columns: Option<usize>,

    /// test, easy, normal or hard (overrides MATCH3_MODE)
    #[arg(long)]
    mode: Option<GameMode>,

    /// RNG seed (overrides MATCH3_SEED)
    #[arg(long)]
    seed: Option<u32>,

    /// Accept every swap
    #[arg(long)]
    free_moves: bool,

    /// Leave special pieces behind for long and crossing matches
    #[arg(long)]
    special_spawns: bool,

    /// Number of turns to play
    #[arg(long, default_value = "10")]
    moves: u32,

    /// Sleep this long per animation instead of finishing instantly
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print every event as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> Result<Match3Config> {
        let mut config = Match3Config::from_env().context("reading MATCH3_* environment")?;
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.free_moves |= self.free_moves;
        config.special_spawns |= self.special_spawns;
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// First special piece on the board, row-major
fn find_special(game: &Match3) -> Option<Position> {
    let policy = game.board().policy();
    game.grid()
        .positions()
        .find(|&pos| policy.is_special(game.grid().type_at(pos)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.config()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        rows = config.rows,
        columns = config.columns,
        mode = %config.mode,
        seed = config.seed,
        "match3-sim starting"
    );

    let mut game = match cli.delay_ms {
        Some(ms) => Match3::new(config, DelayPresenter::uniform(Duration::from_millis(ms)))?,
        None => Match3::new(config, HeadlessPresenter::new())?,
    };
    let mut events = game.subscribe();
    game.start_playing();

    for turn in 1..=cli.moves {
        if let Some(pos) = find_special(&game) {
            let tapped = game.action_tap(pos).await;
            info!(turn, %pos, tapped, "tap");
        } else if let Some((from, to)) = game.hint() {
            let outcome = game.action_move(from, to).await;
            info!(turn, %from, %to, ?outcome, "move");
        } else {
            info!(turn, "no moves left");
            break;
        }

        while let Ok(event) = events.try_recv() {
            if cli.json {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }
    game.stop_playing();

    let stats = game.stats();
    info!(
        score = stats.score,
        moves = stats.moves,
        invalid_moves = stats.invalid_moves,
        pops = stats.pops,
        special_pops = stats.special_pops,
        matches = stats.matches,
        best_combo = stats.best_combo,
        "session finished"
    );
    if !cli.json {
        println!("{}", game.grid());
    }
    Ok(())
}
