//! SRS Tetris runner (default binary).
//!
//! `run` drives the engine from placement decisions read on stdin (one JSON or
//! integer record per line) and prints a JSON observation after every
//! placement. `play` reads the keyboard through crossterm and prints an
//! observation after every freeze. Logs go to stderr so stdout stays JSON.

use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event};
use crossterm::terminal;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use srs_tetris::adapter::{decision_channel, spawn_line_reader, Controller, Observation};
use srs_tetris::adapter::DEFAULT_CHANNEL_CAPACITY;
use srs_tetris::core::GameState;
use srs_tetris::input::{FrameBuilder, KeyOutcome};
use srs_tetris::AppConfig;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay placement decisions from stdin.
    Run {
        #[arg(
            long,
            help = "Keep the clock running between decisions, one step per step_ms of wall time"
        )]
        realtime: bool,
    },
    /// Play from the keyboard.
    Play {},
}

#[derive(Debug, Parser)]
#[command(name = "srs-tetris", version, about)]
struct Cli {
    #[arg(short = 'c', long, global = true, help = "Path to a JSON config file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Fixed bag seed")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.engine.seed = Some(seed);
    }
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Run { realtime } => run(config, realtime),
        Commands::Play {} => play(config),
    }
}

/// Observation writer with a running sequence number.
struct Emitter<W: Write> {
    out: W,
    seq: u64,
    line_end: &'static str,
}

impl<W: Write> Emitter<W> {
    fn emit(&mut self, state: &GameState) -> Result<()> {
        self.seq += 1;
        let line = Observation::from_snapshot(&state.snapshot(), self.seq).to_line()?;
        write!(self.out, "{line}{}", self.line_end).context("write observation")?;
        self.out.flush().context("flush observation")
    }
}

fn clamp_ms(elapsed: Duration) -> u32 {
    u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX)
}

fn run(config: AppConfig, realtime: bool) -> Result<()> {
    let mut state = GameState::new(config.engine);
    let step = Duration::from_millis(u64::from(state.config().step_ms));

    let (tx, mut decisions) = decision_channel(DEFAULT_CHANNEL_CAPACITY);
    // Not joined: the reader may be parked on stdin when the run ends.
    let _reader = spawn_line_reader(BufReader::new(io::stdin()), tx);

    let mut controller = Controller::new(state.config());
    let mut emitter = Emitter {
        out: io::stdout().lock(),
        seq: 0,
        line_end: "\n",
    };
    emitter.emit(&state)?;
    info!(realtime, "run started");

    let mut last_step = Instant::now();
    while !state.run_state().is_over() {
        let outcome = if realtime {
            std::thread::sleep(step.saturating_sub(last_step.elapsed()));
            // Sub-millisecond remainders carry over to the next step.
            let elapsed_ms = clamp_ms(last_step.elapsed());
            last_step += Duration::from_millis(u64::from(elapsed_ms));
            controller.pump_with(&mut state, &mut decisions, elapsed_ms)?
        } else {
            if controller.is_idle() {
                // Lockstep: the clock only moves while a placement replays.
                let Some(decision) = decisions.blocking_recv() else {
                    break;
                };
                if let Err(err) = controller.begin(&decision, &state) {
                    debug!(code = err.code(), "decision not started");
                    continue;
                }
            }
            controller.pump(&mut state, &mut decisions)?
        };

        if outcome.finished {
            emitter.emit(&state)?;
        }
        if realtime && decisions.is_closed() && controller.is_idle() {
            break;
        }
    }

    emitter.emit(&state)?;
    info!(
        state = state.run_state().as_str(),
        score = state.score(),
        lines = state.lines(),
        pieces = state.pieces(),
        "run finished"
    );
    Ok(())
}

fn play(config: AppConfig) -> Result<()> {
    let keys = config.keys.compile();
    for name in keys.unknown_keys() {
        warn!(key = %name, "ignoring unknown key name");
    }

    terminal::enable_raw_mode().context("enable raw mode")?;
    let result = play_loop(GameState::new(config.engine), FrameBuilder::new(keys));
    // Always try to restore terminal state.
    let _ = terminal::disable_raw_mode();
    result
}

fn play_loop(mut state: GameState, mut input: FrameBuilder) -> Result<()> {
    let step = Duration::from_millis(u64::from(state.config().step_ms));
    let mut emitter = Emitter {
        out: io::stdout().lock(),
        seq: 0,
        line_end: "\r\n",
    };
    emitter.emit(&state)?;

    let mut last_step = Instant::now();
    let mut seen = (state.episode_id(), state.pieces());
    loop {
        let timeout = step.saturating_sub(last_step.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if input.handle_key_event(key) == KeyOutcome::Quit {
                    info!(score = state.score(), "quit");
                    return Ok(());
                }
            }
        }

        let elapsed = last_step.elapsed();
        if elapsed < step {
            continue;
        }
        last_step = Instant::now();

        let was_over = state.run_state().is_over();
        let frame = input.take_frame();
        state.step(&frame, clamp_ms(elapsed))?;

        let now = (state.episode_id(), state.pieces());
        if now.0 != seen.0 {
            input.reset();
        }
        if now != seen || was_over != state.run_state().is_over() {
            seen = now;
            emitter.emit(&state)?;
        }
    }
}
