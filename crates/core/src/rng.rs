//! RNG module - 7-bag random piece generation
//!
//! Each bag contains one of each piece (I, J, L, O, S, Z, T), uniformly shuffled.
//! Bags are appended whole at the tail of a FIFO, so the preview window never
//! runs dry and bag boundaries are preserved.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::{PieceKind, BAG_SIZE};

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceQueue {
    queue: VecDeque<PieceKind>,
    /// Minimum number of pieces kept queued after every draw.
    lookahead: usize,
    rng: StdRng,
    bags_generated: u64,
}

impl PieceQueue {
    /// Create a new piece queue with the given seed, keeping at least
    /// `lookahead` pieces available for preview.
    pub fn new(seed: u64, lookahead: usize) -> Self {
        let mut queue = Self {
            queue: VecDeque::with_capacity(lookahead + 2 * BAG_SIZE),
            lookahead: lookahead.max(1),
            rng: StdRng::seed_from_u64(seed),
            bags_generated: 0,
        };
        queue.top_up();
        queue
    }

    /// Append one freshly shuffled bag at the tail
    fn push_bag(&mut self) {
        let mut bag = PieceKind::ALL;
        bag.shuffle(&mut self.rng);
        self.queue.extend(bag);
        self.bags_generated += 1;
    }

    fn top_up(&mut self) {
        while self.queue.len() < self.lookahead {
            self.push_bag();
        }
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> Option<PieceKind> {
        self.queue.front().copied()
    }

    /// The next `n` pieces in spawn order (at most the queued amount).
    pub fn preview(&self, n: usize) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied().take(n)
    }

    /// Draw the next piece from the queue
    pub fn draw(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.push_bag();
        }
        let piece = self.queue.pop_front().unwrap_or(PieceKind::ALL[0]);
        self.top_up();
        piece
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn bags_generated(&self) -> u64 {
        self.bags_generated
    }

    /// Derive a seed for the next run from this queue's stream.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}
