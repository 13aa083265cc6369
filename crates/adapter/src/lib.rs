//! Adapter module - external control of the engine through placement decisions
//!
//! An external controller (a scripted bot, a learned policy, a test harness)
//! produces declarative placement decisions. This crate decodes them, hands
//! them across threads, and replays each one through the engine's ordinary
//! input path.
//!
//! # Decision Records
//!
//! One record per line, JSON or plain integers:
//!
//! ```text
//! {"rotation":1,"target_column":4,"drop_mode":"hard","spin_count":0}
//! 1 4 0 0
//! ```
//!
//! - **rotation**: 0 none, 1 right, 2 right twice, 3 left, 4 hold (nothing else)
//! - **target_column**: piece origin column, clamped to the legal range
//! - **drop_mode**: `hard` (0), `soft` (1), `soft+spin-left` (2), `soft+spin-right` (3)
//! - **spin_count**: rotations applied after a soft drop, capped at 4
//!
//! Malformed records are dropped without affecting the run.
//!
//! # Observations
//!
//! [`Observation`] is the JSON state export: board rows, active piece, ghost
//! row, hold, preview, score, combo, back-to-back, timers and the last freeze.
//!
//! # Implementation
//!
//! - [`channel`]: tokio mpsc hand-off between a producer and the game loop
//! - [`runtime`]: [`Controller`], one placement in flight at a time
//! - [`protocol`]: record decoding and observation messages

pub mod channel;
pub mod protocol;
pub mod runtime;

pub use srs_tetris_core as core;
pub use srs_tetris_engine as engine;
pub use srs_tetris_types as types;

pub use channel::{
    decision_channel, spawn_line_reader, DecisionReceiver, DecisionSender,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use protocol::{decode_line, DecisionRecord, DropModeWire, Observation};
pub use runtime::{frames_for, run_placement, Controller, PumpOutcome};
