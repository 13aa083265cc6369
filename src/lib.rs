//! SRS Tetris (workspace facade crate).
//!
//! Re-exports the member crates under one roof as
//! `srs_tetris::{core, engine, input, adapter, types}` and adds the
//! application-level [`config::AppConfig`].

pub mod config;

pub use srs_tetris_adapter as adapter;
pub use srs_tetris_core as core;
pub use srs_tetris_engine as engine;
pub use srs_tetris_input as input;
pub use srs_tetris_types as types;

pub use config::AppConfig;
