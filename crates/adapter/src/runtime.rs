//! Adapter runtime integration.
//!
//! Bridges decoded decisions with the synchronous engine step loop. At most one
//! placement is in flight: its frames are replayed to completion before the
//! next decision is taken from the channel.

use tracing::debug;

use crate::channel::DecisionReceiver;
use crate::core::{EngineConfig, GameState};
use crate::engine::{translate, ReplayError, Replayer};
use crate::types::{Decision, InputFrame};

/// What one [`Controller::pump`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpOutcome {
    /// A new placement was started this step.
    pub started: bool,
    /// The in-flight placement replayed its last frame this step.
    pub finished: bool,
}

/// Drives the engine from placement decisions.
#[derive(Debug, Clone)]
pub struct Controller {
    replayer: Replayer,
    in_flight: bool,
    step_ms: u32,
    placements: u64,
}

impl Controller {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            replayer: Replayer::new(config.auto_repeat_ms, config.step_ms, config.board_width),
            in_flight: false,
            step_ms: config.step_ms.max(1),
            placements: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.in_flight
    }

    /// Placements fully replayed so far.
    pub fn placements(&self) -> u64 {
        self.placements
    }

    /// Translate `decision` against the current active piece and queue it.
    pub fn begin(&mut self, decision: &Decision, state: &GameState) -> Result<(), ReplayError> {
        if self.in_flight {
            return Err(ReplayError::Busy);
        }
        let Some(piece) = state.active() else {
            return Err(ReplayError::Empty);
        };

        let board = state.board();
        let events = translate(decision, &piece, board.width(), board.height());
        self.replayer.load(events)?;
        self.in_flight = true;
        debug!(
            rotation = decision.rotation,
            column = decision.target_column,
            drop = decision.drop_mode.as_str(),
            "placement started"
        );
        Ok(())
    }

    /// Abandon the in-flight placement.
    pub fn cancel(&mut self) {
        self.replayer.cancel();
        self.in_flight = false;
    }

    /// Advance the engine by one fixed `step_ms` step, starting the next
    /// queued placement first when idle. Steps with nothing to replay feed an
    /// empty frame so the clock and gravity keep running.
    pub fn pump(
        &mut self,
        state: &mut GameState,
        decisions: &mut DecisionReceiver,
    ) -> anyhow::Result<PumpOutcome> {
        self.pump_with(state, decisions, self.step_ms)
    }

    /// Same as [`Controller::pump`], charging `elapsed_ms` of wall time.
    pub fn pump_with(
        &mut self,
        state: &mut GameState,
        decisions: &mut DecisionReceiver,
        elapsed_ms: u32,
    ) -> anyhow::Result<PumpOutcome> {
        let mut outcome = PumpOutcome::default();
        if !self.in_flight && !state.run_state().is_over() {
            if let Some(decision) = decisions.try_recv() {
                match self.begin(&decision, state) {
                    Ok(()) => outcome.started = true,
                    Err(err) => debug!(code = err.code(), "decision not started"),
                }
            }
        }

        outcome.finished = self.step_with(state, elapsed_ms)?;
        Ok(outcome)
    }

    /// Feed one frame of the in-flight placement (or an idle frame).
    /// Returns true when that frame completed the placement.
    pub fn step(&mut self, state: &mut GameState) -> anyhow::Result<bool> {
        self.step_with(state, self.step_ms)
    }

    pub fn step_with(&mut self, state: &mut GameState, elapsed_ms: u32) -> anyhow::Result<bool> {
        let frame = self.replayer.next_frame().unwrap_or_default();
        state.step(&frame, elapsed_ms)?;

        if state.run_state().is_over() && self.in_flight {
            debug!(state = state.run_state().as_str(), "run ended mid-placement");
            self.cancel();
            return Ok(false);
        }

        if self.in_flight && self.replayer.is_idle() {
            self.in_flight = false;
            self.placements += 1;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Replay one decision to completion. Returns the number of steps taken.
pub fn run_placement(state: &mut GameState, decision: &Decision) -> anyhow::Result<u32> {
    let mut controller = Controller::new(state.config());
    controller.begin(decision, state)?;

    let mut steps = 0;
    while !controller.is_idle() {
        controller.step(state)?;
        steps += 1;
    }
    Ok(steps)
}

/// Frames a decision expands to, for callers that drive the engine themselves.
pub fn frames_for(decision: &Decision, state: &GameState) -> Vec<InputFrame> {
    let Some(piece) = state.active() else {
        return Vec::new();
    };
    let config = state.config();
    let mut replayer = Replayer::new(config.auto_repeat_ms, config.step_ms, config.board_width);
    let board = state.board();
    if replayer
        .load(translate(decision, &piece, board.width(), board.height()))
        .is_err()
    {
        return Vec::new();
    }
    replayer.collect()
}
