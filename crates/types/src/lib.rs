//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, command translation, input mapping, export).
//!
//! # Board Dimensions
//!
//! Default playfield dimensions:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 22 rows (indexed 0-21, rows 0-1 are the hidden spawn zone)
//! - **Spawn position**: (3, 0) for every piece
//!
//! # Timing Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `AUTO_REPEAT_MS` | 300 | A direction held longer than this repeats every step |
//! | `GRAVITY_INTERVAL_STEPS` | 1000 | Steps between gravity descents |
//! | `TIME_BUDGET_MS` | 120000 | Length of one run |
//! | `STEP_MS` | 1 | Duration of one replayed frame |
//!
//! # Examples
//!
//! ```
//! use srs_tetris_types::{ControlEvent, GameAction, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.orientation_count(), 4);
//! assert_eq!(PieceKind::O.orientation_count(), 1);
//!
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//! assert_eq!(ControlEvent::from_str("long_move_left"), Some(ControlEvent::LongMoveLeft));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 22);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells, hidden rows included (22 rows)
pub const BOARD_HEIGHT: u8 = 22;

/// Rows at the top of the board that belong to the spawn zone.
///
/// Freezing any cell inside this band ends the run.
pub const HIDDEN_ROWS: u8 = 2;

/// Spawn column of a piece's 4x4 bounding box
pub const SPAWN_X: i8 = 3;

/// Spawn row of a piece's 4x4 bounding box
pub const SPAWN_Y: i8 = 0;

/// A direction held continuously for longer than this starts auto-repeating.
pub const AUTO_REPEAT_MS: u32 = 300;

/// Gravity fires once every this many engine steps.
pub const GRAVITY_INTERVAL_STEPS: u32 = 1000;

/// Total time budget of a run in milliseconds (two minutes).
pub const TIME_BUDGET_MS: u32 = 120_000;

/// Duration of one replayed input frame in milliseconds.
pub const STEP_MS: u32 = 1;

/// Number of upcoming pieces exposed in the preview queue.
pub const PREVIEW_DEPTH: usize = 5;

/// Largest accepted preview depth (two full bags).
pub const MAX_PREVIEW_DEPTH: usize = 14;

/// Pieces per bag.
pub const BAG_SIZE: usize = 7;

/// Number of kick tests tried per rotation.
pub const KICK_TESTS: usize = 5;

/// Kick test index that upgrades a would-be mini T-spin to a full one.
pub const FULL_TSPIN_KICK: u8 = 4;

/// Combo bonus by combo counter, clamped to the last entry.
pub const COMBO_TABLE: [u32; 8] = [0, 1, 1, 2, 2, 3, 3, 4];

/// Bonus for leaving the board completely empty after a clear.
pub const PERFECT_CLEAR_BONUS: u32 = 10;

/// Upper bound on post-drop spins honoured per placement.
pub const MAX_SPIN_COUNT: u8 = 4;


/// The seven tetromino piece kinds
///
/// Discriminant order matches the board cell codes exported to observers
/// (`I = 1` through `T = 7`; `0` is an empty cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    Z,
    T,
}

impl PieceKind {
    /// Every kind, in bag order before shuffling.
    pub const ALL: [PieceKind; BAG_SIZE] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use srs_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "t" => Some(PieceKind::T),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::T => "t",
        }
    }

    /// Non-zero cell code used in the exported occupancy grid.
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::Z => 6,
            PieceKind::T => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=7 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    /// Number of distinct orientations (1 for the symmetric O piece).
    pub fn orientation_count(&self) -> u8 {
        match self {
            PieceKind::O => 1,
            _ => 4,
        }
    }
}

/// Discrete actions the engine applies within a step.
///
/// Both the keyboard path and the replayed AI path end up as these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Descend one row; a blocked descent is a no-op
    SoftDrop,
    /// Drop to the lowest free row and freeze
    HardDrop,
    /// Rotate one orientation clockwise (right)
    RotateCw,
    /// Rotate one orientation counter-clockwise (left)
    RotateCcw,
    /// Swap the active piece with the held slot
    Hold,
    /// Reset the run to its initial state
    Restart,
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use srs_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotateCcw"), Some(GameAction::RotateCcw));
    /// assert_eq!(GameAction::from_str("pause"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Restart => "restart",
        }
    }
}

/// Primitive control vocabulary produced by the command translator.
///
/// Long moves are not single actions: they are replayed as a direction held
/// past the auto-repeat threshold, exactly like a human holding the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    RotateCw,
    RotateCcw,
    MoveLeft,
    MoveRight,
    LongMoveLeft,
    LongMoveRight,
    SoftDropStep,
    HardDrop,
    Hold,
    Restart,
}

impl ControlEvent {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rotate_cw" => Some(ControlEvent::RotateCw),
            "rotate_ccw" => Some(ControlEvent::RotateCcw),
            "move_left" => Some(ControlEvent::MoveLeft),
            "move_right" => Some(ControlEvent::MoveRight),
            "long_move_left" => Some(ControlEvent::LongMoveLeft),
            "long_move_right" => Some(ControlEvent::LongMoveRight),
            "soft_drop_step" => Some(ControlEvent::SoftDropStep),
            "hard_drop" => Some(ControlEvent::HardDrop),
            "hold" => Some(ControlEvent::Hold),
            "restart" => Some(ControlEvent::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlEvent::RotateCw => "rotate_cw",
            ControlEvent::RotateCcw => "rotate_ccw",
            ControlEvent::MoveLeft => "move_left",
            ControlEvent::MoveRight => "move_right",
            ControlEvent::LongMoveLeft => "long_move_left",
            ControlEvent::LongMoveRight => "long_move_right",
            ControlEvent::SoftDropStep => "soft_drop_step",
            ControlEvent::HardDrop => "hard_drop",
            ControlEvent::Hold => "hold",
            ControlEvent::Restart => "restart",
        }
    }

    /// The discrete action a tap of this event produces, if it is a tap.
    pub fn tap_action(&self) -> Option<GameAction> {
        match self {
            ControlEvent::RotateCw => Some(GameAction::RotateCw),
            ControlEvent::RotateCcw => Some(GameAction::RotateCcw),
            ControlEvent::MoveLeft => Some(GameAction::MoveLeft),
            ControlEvent::MoveRight => Some(GameAction::MoveRight),
            ControlEvent::SoftDropStep => Some(GameAction::SoftDrop),
            ControlEvent::HardDrop => Some(GameAction::HardDrop),
            ControlEvent::Hold => Some(GameAction::Hold),
            ControlEvent::Restart => Some(GameAction::Restart),
            ControlEvent::LongMoveLeft | ControlEvent::LongMoveRight => None,
        }
    }
}

/// A direction that auto-repeats while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Down, Direction::Left, Direction::Right];

    pub fn index(&self) -> usize {
        match self {
            Direction::Down => 0,
            Direction::Left => 1,
            Direction::Right => 2,
        }
    }

    /// The action applied once per step while this direction repeats.
    pub fn action(&self) -> GameAction {
        match self {
            Direction::Left => GameAction::MoveLeft,
            Direction::Right => GameAction::MoveRight,
            Direction::Down => GameAction::SoftDrop,
        }
    }
}

/// Set of directions held down during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HeldDirections {
    bits: u8,
}

impl HeldDirections {
    pub fn only(direction: Direction) -> Self {
        let mut held = Self::default();
        held.insert(direction);
        held
    }

    pub fn insert(&mut self, direction: Direction) {
        self.bits |= 1 << direction.index();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.bits &= !(1 << direction.index());
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.bits & (1 << direction.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// Everything the engine reads in one step: continuously held directions
/// plus edge-triggered discrete actions in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputFrame {
    pub held: HeldDirections,
    pub events: Vec<GameAction>,
}

impl InputFrame {
    pub fn tap(action: GameAction) -> Self {
        Self {
            held: HeldDirections::default(),
            events: vec![action],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty() && self.events.is_empty()
    }
}

/// How a placement finishes once the piece is in its target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropMode {
    /// Hard drop straight away
    Hard,
    /// Soft drop to the floor, then hard drop
    Soft,
    /// Soft drop, spin left `spin_count` times, hard drop
    SoftSpinLeft,
    /// Soft drop, spin right `spin_count` times, hard drop
    SoftSpinRight,
}

impl DropMode {
    /// Numeric wire code (0 hard, 1 soft, 2 soft+spin-left, 3 soft+spin-right).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(DropMode::Hard),
            1 => Some(DropMode::Soft),
            2 => Some(DropMode::SoftSpinLeft),
            3 => Some(DropMode::SoftSpinRight),
            _ => None,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hard" => Some(DropMode::Hard),
            "soft" => Some(DropMode::Soft),
            "soft+spin-left" | "soft_spin_left" => Some(DropMode::SoftSpinLeft),
            "soft+spin-right" | "soft_spin_right" => Some(DropMode::SoftSpinRight),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DropMode::Hard => "hard",
            DropMode::Soft => "soft",
            DropMode::SoftSpinLeft => "soft+spin-left",
            DropMode::SoftSpinRight => "soft+spin-right",
        }
    }
}

/// One declarative placement produced by an external controller.
///
/// `rotation` 0-3 selects {none, right, right x2, left}; 4 requests a hold
/// and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    pub rotation: u8,
    pub target_column: i8,
    pub drop_mode: DropMode,
    pub spin_count: u8,
}

impl Decision {
    pub const HOLD_ROTATION: u8 = 4;

    pub fn is_hold(&self) -> bool {
        self.rotation == Self::HOLD_ROTATION
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Running,
    GameOver,
    TimeUp,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::GameOver => "gameover",
            RunState::TimeUp => "timeup",
        }
    }

    pub fn is_over(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Tag of the last successful piece manipulation.
///
/// T-spin detection only considers freezes whose last tag is `Rotate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LastAction {
    Move,
    Rotate,
    Drop,
}

/// T-Spin detection result
///
/// - **None**: Not a T-spin
/// - **Mini**: one front corner and both back corners occupied
/// - **Full**: both front corners occupied, or a mini upgraded by the last kick test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TSpinKind {
    None,
    Mini,
    Full,
}

impl TSpinKind {
    /// Returns `None` for `TSpinKind::None`, `Some("mini")` or `Some("full")` otherwise.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }

    pub fn is_spin(&self) -> bool {
        !matches!(self, TSpinKind::None)
    }
}

/// Record of the most recent freeze, consumed by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub kind: PieceKind,
    pub lines_cleared: u32,
    pub tspin: TSpinKind,
    pub score_delta: u32,
    pub combo: i32,
    pub back_to_back: bool,
    pub perfect_clear: bool,
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled by a frozen piece of that kind
pub type Cell = Option<PieceKind>;
