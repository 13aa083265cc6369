//! Automated control: placement decisions to primitive events to input frames.
//!
//! [`translate`] turns a declarative [`Decision`](srs_tetris_types::Decision)
//! into primitive [`ControlEvent`](srs_tetris_types::ControlEvent)s, and
//! [`Replayer`] feeds them to the engine as timed input frames, so an AI drives
//! the game through exactly the same path as a keyboard.

pub mod replay;
pub mod translate;

pub use replay::{ReplayError, Replayer};
pub use translate::translate;
