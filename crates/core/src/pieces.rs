//! Pieces module - Tetromino shapes, the piece model and SRS kick resolution
//!
//! Shapes live in a 4x4 bounding box whose top-left corner is the piece origin.
//! Kicks use per-orientation offset tables: the candidate for test `i` of a
//! rotation A -> B is derived from `table[A][i]` and `table[B][i]`.
//! Reference: https://tetris.wiki/SRS

use crate::types::{PieceKind, KICK_TESTS, SPAWN_X, SPAWN_Y};

/// Offset of a single mino relative to piece origin, (column, row)
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece origin
pub type PieceShape = [MinoOffset; 4];

/// Per-orientation offsets, `KICK_TESTS` entries each, y pointing up.
pub type OffsetTable = [[(i8, i8); KICK_TESTS]; 4];

const I_SHAPES: [PieceShape; 4] = [
    [(0, 1), (1, 1), (2, 1), (3, 1)],
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(1, 0), (1, 1), (1, 2), (1, 3)],
];

const J_SHAPES: [PieceShape; 4] = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

const L_SHAPES: [PieceShape; 4] = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

const O_SHAPES: [PieceShape; 1] = [[(1, 0), (2, 0), (1, 1), (2, 1)]];

const S_SHAPES: [PieceShape; 4] = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
    [(1, 1), (2, 1), (0, 2), (1, 2)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

const Z_SHAPES: [PieceShape; 4] = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(2, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (1, 2), (2, 2)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

const T_SHAPES: [PieceShape; 4] = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (1, 2)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

/// All orientations of a piece kind, indexed by rotation.
pub fn shapes(kind: PieceKind) -> &'static [PieceShape] {
    match kind {
        PieceKind::I => &I_SHAPES,
        PieceKind::J => &J_SHAPES,
        PieceKind::L => &L_SHAPES,
        PieceKind::O => &O_SHAPES,
        PieceKind::S => &S_SHAPES,
        PieceKind::Z => &Z_SHAPES,
        PieceKind::T => &T_SHAPES,
    }
}

/// Get the shape (mino offsets) for a piece kind and rotation index
pub fn get_shape(kind: PieceKind, rotation: u8) -> PieceShape {
    let all = shapes(kind);
    all[rotation as usize % all.len()]
}

/// Offsets shared by J, L, S, T, Z (and O, which never leaves orientation 0)
const JLSTZ_OFFSETS: OffsetTable = [
    [(0, 0), (0, 0), (0, 0), (0, 0), (0, 0)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (0, 0), (0, 0), (0, 0), (0, 0)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// I piece offsets (different from JLSTZ)
const I_OFFSETS: OffsetTable = [
    [(0, 0), (-1, 0), (2, 0), (-1, 0), (2, 0)],
    [(-1, 0), (0, 0), (0, 0), (0, 1), (0, -2)],
    [(-1, 1), (1, 1), (-2, 1), (1, 0), (-2, 0)],
    [(0, 1), (0, 1), (0, 1), (0, -1), (0, 2)],
];

/// Get the offset table for a piece kind
pub fn offset_table(kind: PieceKind) -> &'static OffsetTable {
    match kind {
        PieceKind::I => &I_OFFSETS,
        _ => &JLSTZ_OFFSETS,
    }
}

/// Board-space (dx, dy) candidates for a rotation `from -> to`, in test order.
///
/// Rows grow downward on the board while the tables have y pointing up,
/// hence the reversed subtraction on the y axis.
pub fn kick_candidates(kind: PieceKind, from: u8, to: u8) -> [(i8, i8); KICK_TESTS] {
    let table = offset_table(kind);
    let a = &table[from as usize % 4];
    let b = &table[to as usize % 4];
    let mut out = [(0, 0); KICK_TESTS];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = (a[i].0 - b[i].0, b[i].1 - a[i].1);
    }
    out
}

/// A piece instance: kind, orientation and origin, plus its cached extent.
///
/// `leftmost` / `rightmost` are the smallest and largest column offsets of the
/// current orientation; they are refreshed on every rotate and move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: u8,
    pub x: i8,
    pub y: i8,
    leftmost: i8,
    rightmost: i8,
}

impl Piece {
    /// Create a new piece at spawn position in its default orientation
    pub fn new(kind: PieceKind) -> Self {
        Self::at(kind, 0, SPAWN_X, SPAWN_Y)
    }

    pub fn at(kind: PieceKind, rotation: u8, x: i8, y: i8) -> Self {
        let mut piece = Self {
            kind,
            rotation: rotation % kind.orientation_count(),
            x,
            y,
            leftmost: 0,
            rightmost: 0,
        };
        piece.refresh_extent();
        piece
    }

    fn refresh_extent(&mut self) {
        let shape = self.shape();
        self.leftmost = shape.iter().map(|&(dx, _)| dx).min().unwrap_or(0);
        self.rightmost = shape.iter().map(|&(dx, _)| dx).max().unwrap_or(0);
    }

    /// Get the shape (mino offsets) for current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute (column, row) of every mino.
    pub fn cells(&self) -> [(i8, i8); 4] {
        let mut out = self.shape();
        for cell in out.iter_mut() {
            *cell = (self.x + cell.0, self.y + cell.1);
        }
        out
    }

    /// Column offset of the leftmost mino inside the bounding box.
    pub fn leftmost_offset(&self) -> i8 {
        self.leftmost
    }

    /// Smallest origin column that keeps every mino on the board.
    pub fn min_column(&self) -> i8 {
        -self.leftmost
    }

    /// Largest origin column that keeps every mino on a board `width` wide.
    pub fn max_column(&self, width: u8) -> i8 {
        width as i8 - 1 - self.rightmost
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Orientation reached by one step in the given direction.
    pub fn next_rotation(&self, clockwise: bool) -> u8 {
        let count = self.kind.orientation_count();
        if clockwise {
            (self.rotation + 1) % count
        } else {
            (self.rotation + count - 1) % count
        }
    }

    /// The piece after one rotation step with kick test `test` applied.
    pub fn rotated_with_kick(&self, clockwise: bool, test: usize) -> Self {
        let to = self.next_rotation(clockwise);
        let (dx, dy) = kick_candidates(self.kind, self.rotation, to)[test % KICK_TESTS];
        let mut piece = Self {
            rotation: to,
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        };
        piece.refresh_extent();
        piece
    }
}

/// Successful rotation: the new piece and the kick test that placed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kick {
    pub piece: Piece,
    pub index: u8,
}

/// Try to rotate a piece with wall kicks
///
/// Candidates are tried in order; the first one for which `fits` holds wins.
/// Returns `None` when every test collides, leaving the caller's piece untouched.
pub fn try_rotate(piece: &Piece, clockwise: bool, fits: impl Fn(&Piece) -> bool) -> Option<Kick> {
    (0..KICK_TESTS).find_map(|test| {
        let candidate = piece.rotated_with_kick(clockwise, test);
        fits(&candidate).then_some(Kick {
            piece: candidate,
            index: test as u8,
        })
    })
}
