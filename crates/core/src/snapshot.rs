use crate::pieces::Piece;
use crate::types::{LockEvent, PieceKind, RunState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: u8,
    pub x: i8,
    pub y: i8,
}

impl From<Piece> for ActiveSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

/// Read-only export of the engine state for renderers and telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Row-major cell codes, `width * height` entries (0 empty, 1..=7 piece kind).
    pub board: Vec<u8>,
    pub width: u8,
    pub height: u8,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub hold: Option<PieceKind>,
    pub preview: Vec<PieceKind>,
    pub can_hold: bool,
    pub score: u32,
    pub back_to_back: bool,
    pub combo: i32,
    pub remaining_ms: u32,
    pub run_state: RunState,
    pub step: u64,
    pub lines: u32,
    pub pieces: u32,
    pub episode_id: u32,
    pub last_event: Option<LockEvent>,
}

impl GameSnapshot {
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.board[y * self.width as usize + x]
    }

    pub fn playable(&self) -> bool {
        !self.run_state.is_over()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: Vec::new(),
            width: 0,
            height: 0,
            active: None,
            ghost_y: None,
            hold: None,
            preview: Vec::new(),
            can_hold: true,
            score: 0,
            back_to_back: false,
            combo: -1,
            remaining_ms: 0,
            run_state: RunState::Running,
            step: 0,
            lines: 0,
            pieces: 0,
            episode_id: 0,
            last_event: None,
        }
    }
}
