//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules engine: board, pieces, bag, scoring and the
//! state machine that ties them together. It performs no I/O; callers feed it
//! [`InputFrame`](types::InputFrame)s and read back [`GameSnapshot`]s.
//!
//! # Module Structure
//!
//! - [`board`]: playfield grid with collision detection and line clearing
//! - [`config`]: engine tunables with environment overrides
//! - [`error`]: engine failures
//! - [`game_state`]: active piece, hold, gravity, auto-repeat, scoring and run lifecycle
//! - [`pieces`]: tetromino shapes and SRS rotation with offset-table kicks
//! - [`rng`]: 7-bag piece generation
//! - [`scoring`]: line values, T-spins, combos, back-to-back and perfect clears
//! - [`snapshot`]: read-only state export
//!
//! # Example
//!
//! ```
//! use srs_tetris_core::GameState;
//! use srs_tetris_core::types::{GameAction, InputFrame};
//!
//! let mut game = GameState::with_seed(12345);
//! game.step(&InputFrame::tap(GameAction::MoveRight), 1).unwrap();
//! game.step(&InputFrame::tap(GameAction::HardDrop), 1).unwrap();
//!
//! assert_eq!(game.pieces(), 1);
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use srs_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use game_state::{project_ghost, GameState};
pub use pieces::{get_shape, try_rotate, Kick, Piece};
pub use rng::PieceQueue;
pub use scoring::{calculate_score, classify_tspin, ScoreResult};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
