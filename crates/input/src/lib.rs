//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events through configurable [`KeyBindings`] and folds them into the
//! per-step [`InputFrame`](types::InputFrame) the engine consumes, including
//! terminals without key-release events.

pub mod handler;
pub mod map;

pub use srs_tetris_types as types;

pub use handler::{FrameBuilder, KeyOutcome};
pub use map::{parse_key, Binding, KeyBindings, KeyMap};
