//! Engine error type.
//!
//! Rotation and movement collisions are not errors; they are ordinary no-ops.
//! Everything here signals a broken internal invariant and is surfaced to the caller.

/// Internal invariant violations raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A single freeze removed more rows than a tetromino can complete.
    #[error("impossible line clear: {lines} rows removed by one freeze")]
    ImpossibleClear { lines: usize },

    /// An operation required an active piece while the run was live.
    #[error("no active piece while the run is live")]
    MissingPiece,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
