//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell can be empty or filled with a piece kind.
//! Uses a flat vector, row-major, sized once at construction; the row count never changes.
//! Coordinates: (x, y) where x grows left to right and y grows top to bottom.
//! Rows above the board (negative y) never collide.

use arrayvec::ArrayVec;

use crate::pieces::Piece;
use crate::types::{Cell, PieceKind};

/// Most rows a single tetromino can complete.
pub const MAX_CLEAR: usize = 4;

/// The game board using flat storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= self.width as i8 || y < 0 || y >= self.height as i8 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Whether a single cell blocks a mino: walls, floor and filled cells do,
    /// the open space above the board does not.
    pub fn is_blocked(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= self.width as i8 || y >= self.height as i8 {
            return true;
        }
        y >= 0 && self.is_occupied(x, y)
    }

    /// Collision test for a whole piece; stops at the first blocked mino.
    pub fn collides(&self, piece: &Piece) -> bool {
        piece.cells().iter().any(|&(x, y)| self.is_blocked(x, y))
    }

    pub fn fits(&self, piece: &Piece) -> bool {
        !self.collides(piece)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        let start = y * self.width as usize;
        let end = start + self.width as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Stamp a piece's minos into the grid.
    ///
    /// Minos above the board are discarded. Returns the topmost row the piece
    /// touched (possibly negative) so the caller can detect a top-out.
    pub fn lock_piece(&mut self, piece: &Piece) -> i8 {
        let mut top = i8::MAX;
        for (x, y) in piece.cells() {
            top = top.min(y);
            self.set(x, y, Some(piece.kind));
        }
        top
    }

    /// Remove full rows as one tetromino freeze would. Returns the removed row
    /// indices, bottom to top, or the number of full rows found when there are
    /// more than a tetromino can make. In that case the board is untouched.
    pub fn clear_full_rows(&mut self) -> Result<ArrayVec<usize, MAX_CLEAR>, usize> {
        let mut cleared_rows = ArrayVec::new();
        for y in (0..self.height as usize).rev() {
            if self.is_row_full(y) && cleared_rows.try_push(y).is_err() {
                let full = (0..self.height as usize).filter(|&y| self.is_row_full(y)).count();
                return Err(full);
            }
        }

        self.compact();
        Ok(cleared_rows)
    }

    /// Remove every full row, shifting the rest down and refilling the top with
    /// empty rows. Returns how many rows were removed.
    pub fn clear(&mut self) -> usize {
        self.compact()
    }

    fn compact(&mut self) -> usize {
        let width = self.width as usize;
        let mut write_y = self.height as usize;
        let mut removed = 0;

        // Scan from bottom to top
        for read_y in (0..self.height as usize).rev() {
            if self.is_row_full(read_y) {
                removed += 1;
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * width;
                    let dst_start = write_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, dst_start);
                }
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }
        removed
    }

    /// True when no cell is filled (perfect clear).
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Empty every cell
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Write the grid as row-major codes (0 empty, 1..=7 piece kind).
    pub fn write_u8_grid(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend(self.cells.iter().map(|cell| cell.map_or(0, |k| k.code())));
    }

    /// Fill a whole row, leaving the listed columns empty.
    pub fn fill_row_except(&mut self, y: i8, holes: &[i8], kind: PieceKind) {
        for x in 0..self.width as i8 {
            let cell = if holes.contains(&x) { None } else { Some(kind) };
            self.set(x, y, cell);
        }
    }

    /// Convert to 2D vector for testing/display
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.to_vec())
            .collect()
    }
}
