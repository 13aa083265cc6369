//! Game state module - the engine's single owned state machine
//!
//! This module ties together all core components: board, pieces, bag, and scoring.
//! It handles spawning, gravity, auto-repeat, piece manipulation, freezing,
//! line clears and the run lifecycle. All mutation goes through [`GameState::step`]
//! or [`GameState::apply_action`].

use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::pieces::{try_rotate, Piece};
use crate::rng::PieceQueue;
use crate::scoring::{calculate_score, classify_tspin};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::*;
use crate::Board;

/// Front corner pair of the T piece's 3x3 box, (dx, dy), per orientation.
const T_FRONT_CORNERS: [[(i8, i8); 2]; 4] = [
    [(0, 0), (2, 0)],
    [(2, 0), (2, 2)],
    [(2, 2), (0, 2)],
    [(0, 2), (0, 0)],
];

/// Back corner pair, opposite the pointing side.
const T_BACK_CORNERS: [[(i8, i8); 2]; 4] = [
    [(2, 2), (0, 2)],
    [(0, 2), (0, 0)],
    [(0, 0), (2, 0)],
    [(2, 0), (2, 2)],
];

/// Project a piece straight down to the lowest row it can occupy.
///
/// Pure: the returned value shares nothing with `piece`.
pub fn project_ghost(board: &Board, piece: &Piece) -> Piece {
    let mut ghost = *piece;
    while board.fits(&ghost.shifted(0, 1)) {
        ghost = ghost.shifted(0, 1);
    }
    ghost
}

/// Complete engine state
#[derive(Debug, Clone)]
pub struct GameState {
    config: EngineConfig,
    board: Board,
    active: Option<Piece>,
    ghost: Option<Piece>,
    hold: Option<Piece>,
    piece_queue: PieceQueue,
    can_hold: bool,
    score: u32,
    back_to_back: bool,
    /// Post-increment combo counter; -1 when no chain is active.
    combo: i32,
    last_action: Option<LastAction>,
    last_kick: Option<u8>,
    run_state: RunState,
    remaining_ms: u32,
    step: u64,
    /// Continuous hold time per direction, indexed by `Direction::index`.
    held_ms: [u32; 3],
    lines: u32,
    pieces: u32,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    last_event: Option<LockEvent>,
}

impl GameState {
    /// Create a running game and spawn its first piece.
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::seeded(config, seed)
    }

    /// Default ruleset with a fixed bag seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(EngineConfig::with_seed(seed))
    }

    fn seeded(config: EngineConfig, seed: u64) -> Self {
        let mut state = Self {
            board: Board::new(config.board_width, config.board_height),
            active: None,
            ghost: None,
            hold: None,
            piece_queue: PieceQueue::new(seed, config.preview_depth),
            can_hold: true,
            score: 0,
            back_to_back: false,
            combo: -1,
            last_action: None,
            last_kick: None,
            run_state: RunState::Running,
            remaining_ms: config.time_budget_ms,
            step: 0,
            held_ms: [0; 3],
            lines: 0,
            pieces: 0,
            episode_id: 0,
            last_event: None,
            config,
        };
        state.spawn_piece();
        state
    }

    /// Rebuild the run from its initial invariants.
    ///
    /// The next bag seed is derived from the current stream, so a seeded game
    /// restarts deterministically without replaying the same pieces.
    pub fn reset(&mut self) {
        let seed = self.piece_queue.next_seed();
        let episode_id = self.episode_id.wrapping_add(1);
        *self = Self::seeded(self.config.clone(), seed);
        self.episode_id = episode_id;
        info!(episode_id, "run restarted");
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Edit the grid directly (scenario setup); the ghost is re-projected afterwards.
    pub fn edit_board(&mut self, edit: impl FnOnce(&mut Board)) {
        edit(&mut self.board);
        self.refresh_ghost();
    }

    pub fn active(&self) -> Option<Piece> {
        self.active
    }

    pub fn ghost(&self) -> Option<Piece> {
        self.ghost
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold.map(|p| p.kind)
    }

    pub fn preview(&self) -> Vec<PieceKind> {
        self.piece_queue.preview(self.config.preview_depth).collect()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn combo(&self) -> i32 {
        self.combo
    }

    pub fn last_action(&self) -> Option<LastAction> {
        self.last_action
    }

    pub fn last_kick(&self) -> Option<u8> {
        self.last_kick
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn pieces(&self) -> u32 {
        self.pieces
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn last_event(&self) -> Option<LockEvent> {
        self.last_event
    }

    /// Take and clear the last freeze event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.board);
        out.width = self.board.width();
        out.height = self.board.height();
        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = self.ghost.map(|g| g.y);
        out.hold = self.hold_piece();
        out.preview.clear();
        out.preview
            .extend(self.piece_queue.preview(self.config.preview_depth));
        out.can_hold = self.can_hold;
        out.score = self.score;
        out.back_to_back = self.back_to_back;
        out.combo = self.combo;
        out.remaining_ms = self.remaining_ms;
        out.run_state = self.run_state;
        out.step = self.step;
        out.lines = self.lines;
        out.pieces = self.pieces;
        out.episode_id = self.episode_id;
        out.last_event = self.last_event;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Advance the engine by one step.
    ///
    /// Order within a step: gravity, auto-repeat of held directions, discrete
    /// events in arrival order, then the time budget. Once the run is over only
    /// a restart event is honoured.
    pub fn step(&mut self, frame: &InputFrame, elapsed_ms: u32) -> EngineResult<()> {
        if self.run_state.is_over() {
            if frame.events.contains(&GameAction::Restart) {
                self.reset();
            }
            return Ok(());
        }

        self.step = self.step.wrapping_add(1);
        if self.step % u64::from(self.config.gravity_interval_steps) == 0 {
            self.soft_drop()?;
        }

        for direction in Direction::ALL {
            let slot = direction.index();
            if frame.held.contains(direction) {
                self.held_ms[slot] = self.held_ms[slot].saturating_add(elapsed_ms);
                if self.held_ms[slot] > self.config.auto_repeat_ms {
                    self.apply_action(direction.action())?;
                }
            } else {
                self.held_ms[slot] = 0;
            }
        }

        for &action in &frame.events {
            if action == GameAction::Restart {
                self.reset();
                return Ok(());
            }
            if self.run_state.is_over() {
                break;
            }
            self.apply_action(action)?;
        }

        if !self.run_state.is_over() {
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
            if self.remaining_ms == 0 {
                self.run_state = RunState::TimeUp;
                info!(score = self.score, lines = self.lines, "time up");
            }
        }

        Ok(())
    }

    /// Apply a single discrete action.
    ///
    /// Returns whether the action changed anything; blocked moves and rotations
    /// are ordinary no-ops.
    pub fn apply_action(&mut self, action: GameAction) -> EngineResult<bool> {
        if action == GameAction::Restart {
            self.reset();
            return Ok(true);
        }
        if self.run_state.is_over() {
            return Ok(false);
        }

        match action {
            GameAction::MoveLeft => self.try_move(-1),
            GameAction::MoveRight => self.try_move(1),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => self.hard_drop().map(|_| true),
            GameAction::RotateCw => self.rotate(true),
            GameAction::RotateCcw => self.rotate(false),
            GameAction::Hold => self.hold(),
            GameAction::Restart => Ok(false),
        }
    }

    fn active_piece(&self) -> EngineResult<Piece> {
        self.active.ok_or(EngineError::MissingPiece)
    }

    fn refresh_ghost(&mut self) {
        self.ghost = self.active.map(|p| project_ghost(&self.board, &p));
    }

    /// Spawn a new piece from the queue
    fn spawn_piece(&mut self) {
        let kind = self.piece_queue.draw();
        self.activate(Piece::new(kind));
    }

    /// Make `piece` the active piece; a colliding placement is a block-out.
    fn activate(&mut self, piece: Piece) {
        self.last_action = None;
        self.last_kick = None;
        if self.board.collides(&piece) {
            self.run_state = RunState::GameOver;
            info!(kind = piece.kind.as_str(), score = self.score, "block out");
        }
        self.active = Some(piece);
        self.refresh_ghost();
        trace!(kind = piece.kind.as_str(), "piece active");
    }

    /// Shift the active piece one column; a collision leaves everything untouched.
    fn try_move(&mut self, dx: i8) -> EngineResult<bool> {
        let moved = self.active_piece()?.shifted(dx, 0);
        if self.board.collides(&moved) {
            return Ok(false);
        }
        self.active = Some(moved);
        self.last_action = Some(LastAction::Move);
        self.refresh_ghost();
        Ok(true)
    }

    /// Descend one row. A blocked descent keeps the last-action tag so a
    /// rotation into place stays eligible for T-spin detection.
    fn soft_drop(&mut self) -> EngineResult<bool> {
        let lowered = self.active_piece()?.shifted(0, 1);
        if self.board.collides(&lowered) {
            return Ok(false);
        }
        self.active = Some(lowered);
        self.last_action = Some(LastAction::Drop);
        Ok(true)
    }

    fn rotate(&mut self, clockwise: bool) -> EngineResult<bool> {
        let piece = self.active_piece()?;
        let board = &self.board;
        let Some(kick) = try_rotate(&piece, clockwise, |p| board.fits(p)) else {
            return Ok(false);
        };

        self.active = Some(kick.piece);
        self.last_kick = Some(kick.index);
        self.last_action = Some(LastAction::Rotate);
        self.refresh_ghost();
        Ok(true)
    }

    /// Drop to the lowest free row and freeze. Returns the rows travelled.
    fn hard_drop(&mut self) -> EngineResult<u32> {
        let mut piece = self.active_piece()?;
        if piece.y < 0 {
            let lowered = piece.shifted(0, -piece.y);
            if self.board.fits(&lowered) {
                piece = lowered;
            }
        }

        let mut rows = 0;
        while self.board.fits(&piece.shifted(0, 1)) {
            piece = piece.shifted(0, 1);
            rows += 1;
        }

        self.active = Some(piece);
        self.freeze()?;
        Ok(rows)
    }

    /// Swap the active piece with the hold slot, once per piece lifetime.
    fn hold(&mut self) -> EngineResult<bool> {
        if !self.can_hold {
            return Ok(false);
        }

        let current = self.active.take().ok_or(EngineError::MissingPiece)?;
        let previous = self.hold.replace(Piece::new(current.kind));
        self.can_hold = false;
        trace!(held = current.kind.as_str(), "hold");

        match previous {
            Some(piece) => self.activate(piece),
            None => self.spawn_piece(),
        }
        Ok(true)
    }

    /// Count occupied front and back corners around a T piece. Every
    /// out-of-bounds corner counts as occupied, including rows above the board.
    fn t_corners(&self, piece: &Piece) -> (usize, usize) {
        let r = piece.rotation as usize % 4;
        let occupied = |pair: &[(i8, i8); 2]| {
            pair.iter()
                .map(|&(dx, dy)| (piece.x + dx, piece.y + dy))
                .filter(|&(x, y)| y < 0 || self.board.is_blocked(x, y))
                .count()
        };
        (occupied(&T_FRONT_CORNERS[r]), occupied(&T_BACK_CORNERS[r]))
    }

    /// Stamp the active piece, clear lines, score, and spawn the next piece.
    fn freeze(&mut self) -> EngineResult<()> {
        let piece = self.active.take().ok_or(EngineError::MissingPiece)?;
        self.ghost = None;

        let top = self.board.lock_piece(&piece);
        if top < self.config.hidden_rows as i8 {
            self.run_state = RunState::GameOver;
            info!(score = self.score, lines = self.lines, "game over");
        }

        let corners = (piece.kind == PieceKind::T && self.last_action == Some(LastAction::Rotate))
            .then(|| self.t_corners(&piece));

        let cleared = self
            .board
            .clear_full_rows()
            .map_err(|lines| EngineError::ImpossibleClear { lines })?;
        let lines = cleared.len();

        let tspin = corners.map_or(TSpinKind::None, |(front, back)| {
            classify_tspin(front, back, self.last_kick)
        });

        let mut score_delta = 0;
        let mut perfect_clear = false;
        if lines == 0 {
            self.combo = -1;
        } else {
            self.combo += 1;
            perfect_clear = self.board.is_empty();
            let result =
                calculate_score(lines, tspin, self.combo, self.back_to_back, perfect_clear)?;
            self.back_to_back = result.qualifies_for_b2b;
            self.score += result.total;
            self.lines += lines as u32;
            score_delta = result.total;
            debug!(
                lines,
                tspin = tspin.as_str().unwrap_or("none"),
                combo = self.combo,
                b2b = result.b2b_applied,
                perfect_clear,
                points = result.total,
                "lines cleared"
            );
        }

        self.pieces += 1;
        self.can_hold = true;
        self.last_event = Some(LockEvent {
            kind: piece.kind,
            lines_cleared: lines as u32,
            tspin,
            score_delta,
            combo: self.combo,
            back_to_back: self.back_to_back,
            perfect_clear,
        });
        trace!(kind = piece.kind.as_str(), x = piece.x, y = piece.y, "frozen");

        if !self.run_state.is_over() {
            self.spawn_piece();
        }
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_seed(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_all_except(state: &mut GameState, keep: &[(i8, i8)]) {
        state.edit_board(|board| {
            for y in 0..board.height() as i8 {
                for x in 0..board.width() as i8 {
                    if !keep.contains(&(x, y)) {
                        board.set(x, y, Some(PieceKind::Z));
                    }
                }
            }
        });
    }

    fn drop_piece(state: &mut GameState, piece: Piece) -> LockEvent {
        state.active = Some(piece);
        state.last_action = None;
        state.apply_action(GameAction::HardDrop).unwrap();
        state.take_last_event().expect("freeze event")
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::with_seed(12345);

        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, -1);
        assert!(!state.back_to_back);
        assert!(state.can_hold);
        assert!(state.hold.is_none());
        assert_eq!(state.remaining_ms, TIME_BUDGET_MS);
        assert_eq!(state.preview().len(), PREVIEW_DEPTH);

        let active = state.active.unwrap();
        assert_eq!((active.x, active.y, active.rotation), (3, 0, 0));
        assert!(state.ghost.unwrap().y > active.y);
    }

    #[test]
    fn test_next_piece_comes_from_preview_head() {
        let mut state = GameState::with_seed(7);
        let next = state.preview()[0];
        state.apply_action(GameAction::HardDrop).unwrap();
        assert_eq!(state.active.unwrap().kind, next);
        assert_eq!(state.pieces, 1);
    }

    #[test]
    fn test_failed_move_keeps_last_action() {
        let mut state = GameState::with_seed(3);
        assert!(state.rotate(true).unwrap());
        for _ in 0..10 {
            state.try_move(-1).unwrap();
        }
        assert_eq!(state.last_action, Some(LastAction::Move));

        state.last_action = Some(LastAction::Rotate);
        assert!(!state.try_move(-1).unwrap());
        assert_eq!(state.last_action, Some(LastAction::Rotate));
    }

    #[test]
    fn test_blocked_soft_drop_keeps_rotate_tag() {
        let mut state = GameState::with_seed(3);
        state.active = Some(Piece::at(PieceKind::T, 1, 3, 19));
        assert!(state.rotate(true).unwrap());
        assert_eq!(state.last_action, Some(LastAction::Rotate));

        assert!(!state.soft_drop().unwrap());
        assert_eq!(state.last_action, Some(LastAction::Rotate));
    }

    #[test]
    fn test_rotation_fully_blocked_is_a_noop() {
        let mut state = GameState::with_seed(5);
        let piece = Piece::at(PieceKind::T, 0, 3, 10);
        state.active = Some(piece);
        state.last_kick = Some(2);
        fill_all_except(&mut state, &piece.cells());

        assert!(!state.rotate(true).unwrap());
        assert!(!state.rotate(false).unwrap());
        assert_eq!(state.active, Some(piece));
        assert_eq!(state.last_kick, Some(2));
    }

    #[test]
    fn test_full_rotation_cycle_restores_piece() {
        for kind in PieceKind::ALL {
            let mut state = GameState::with_seed(1);
            let piece = Piece::at(kind, 0, 3, 8);
            state.active = Some(piece);
            for _ in 0..kind.orientation_count() {
                assert!(state.rotate(true).unwrap());
            }
            assert_eq!(state.active, Some(piece), "{:?}", kind);
        }
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut state = GameState::with_seed(11);
        let first = state.active.unwrap().kind;
        let next = state.preview()[0];

        assert!(state.hold().unwrap());
        assert_eq!(state.hold_piece(), Some(first));
        assert_eq!(state.active.unwrap().kind, next);
        assert!(!state.can_hold);

        let before = state.active;
        assert!(!state.hold().unwrap());
        assert_eq!(state.active, before);
        assert_eq!(state.hold_piece(), Some(first));

        state.apply_action(GameAction::HardDrop).unwrap();
        assert!(state.can_hold);
        let current = state.active.unwrap().kind;
        assert!(state.hold().unwrap());
        assert_eq!(state.active, Some(Piece::new(first)));
        assert_eq!(state.hold_piece(), Some(current));
    }

    #[test]
    fn test_hold_stores_fresh_piece_and_clears_tag() {
        let mut state = GameState::with_seed(11);
        let kind = state.active.unwrap().kind;
        state.try_move(1).unwrap();
        state.rotate(true).unwrap();
        assert!(state.hold().unwrap());

        assert_eq!(state.hold, Some(Piece::new(kind)));
        assert_eq!(state.last_action, None);
        assert!(state.ghost.is_some());
    }

    #[test]
    fn test_tspin_double_with_rotation() {
        let mut state = GameState::with_seed(2);
        state.edit_board(|board| {
            board.fill_row_except(21, &[4], PieceKind::J);
            board.fill_row_except(20, &[3, 4, 5], PieceKind::J);
            board.set(0, 19, Some(PieceKind::J));
        });
        state.active = Some(Piece::at(PieceKind::T, 1, 3, 19));
        assert!(state.apply_action(GameAction::RotateCw).unwrap());
        assert_eq!(state.last_kick, Some(0));

        state.apply_action(GameAction::HardDrop).unwrap();
        let event = state.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 2);
        assert_eq!(event.tspin, TSpinKind::Full);
        assert_eq!(event.score_delta, 4);
        assert!(state.back_to_back);
    }

    #[test]
    fn test_tspin_requires_rotation_as_last_action() {
        let mut state = GameState::with_seed(2);
        state.edit_board(|board| {
            board.fill_row_except(21, &[4], PieceKind::J);
            board.fill_row_except(20, &[3, 4, 5], PieceKind::J);
            board.set(0, 19, Some(PieceKind::J));
        });
        let event = drop_piece(&mut state, Piece::at(PieceKind::T, 2, 3, 19));
        assert_eq!(event.tspin, TSpinKind::None);
        assert_eq!(event.score_delta, 1);
        assert!(!state.back_to_back);
    }

    fn mini_slot(state: &mut GameState) {
        state.edit_board(|board| {
            board.fill_row_except(21, &[3, 4, 5], PieceKind::L);
            board.set(3, 20, Some(PieceKind::L));
        });
        state.active = Some(Piece::at(PieceKind::T, 0, 3, 20));
        state.last_action = Some(LastAction::Rotate);
    }

    #[test]
    fn test_mini_tspin_single() {
        let mut state = GameState::with_seed(2);
        mini_slot(&mut state);
        state.last_kick = Some(1);
        state.apply_action(GameAction::HardDrop).unwrap();

        let event = state.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 1);
        assert_eq!(event.tspin, TSpinKind::Mini);
        assert_eq!(event.score_delta, 1);
        assert!(state.back_to_back);
    }

    #[test]
    fn test_fifth_kick_upgrades_mini_to_full() {
        let mut state = GameState::with_seed(2);
        mini_slot(&mut state);
        state.last_kick = Some(FULL_TSPIN_KICK);
        state.apply_action(GameAction::HardDrop).unwrap();

        let event = state.take_last_event().unwrap();
        assert_eq!(event.tspin, TSpinKind::Full);
        assert_eq!(event.score_delta, 2);
    }

    #[test]
    fn test_back_to_back_tetris_survives_non_clearing_freeze() {
        let mut state = GameState::with_seed(4);
        let well = |board: &mut Board| {
            for y in 18..22 {
                board.fill_row_except(y, &[0], PieceKind::S);
            }
            board.set(5, 17, Some(PieceKind::S));
        };

        state.edit_board(well);
        let first = drop_piece(&mut state, Piece::at(PieceKind::I, 1, -2, 0));
        assert_eq!(first.lines_cleared, 4);
        assert_eq!(first.score_delta, 4);
        assert!(state.back_to_back);

        let filler = drop_piece(&mut state, Piece::at(PieceKind::O, 0, 6, 0));
        assert_eq!(filler.lines_cleared, 0);
        assert_eq!(state.combo, -1);
        assert!(state.back_to_back);

        state.edit_board(well);
        let second = drop_piece(&mut state, Piece::at(PieceKind::I, 1, -2, 0));
        assert_eq!(second.lines_cleared, 4);
        assert_eq!(second.score_delta, 6);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_combo_chain_bonuses() {
        let mut state = GameState::with_seed(8);
        state.edit_board(|board| {
            for y in 12..22 {
                board.fill_row_except(y, &[3, 4, 5, 6], PieceKind::O);
            }
            board.set(0, 11, Some(PieceKind::O));
        });

        let mut bonuses = Vec::new();
        for _ in 0..10 {
            let event = drop_piece(&mut state, Piece::at(PieceKind::I, 0, 3, 0));
            assert_eq!(event.lines_cleared, 1);
            bonuses.push(event.score_delta);
        }
        assert_eq!(bonuses, vec![0, 1, 1, 2, 2, 3, 3, 4, 4, 4]);
        assert_eq!(state.combo, 9);

        drop_piece(&mut state, Piece::at(PieceKind::O, 0, 6, 0));
        assert_eq!(state.combo, -1);
    }

    #[test]
    fn test_perfect_clear_bonus() {
        let mut state = GameState::with_seed(8);
        state.edit_board(|board| board.fill_row_except(21, &[3, 4, 5, 6], PieceKind::O));

        let event = drop_piece(&mut state, Piece::at(PieceKind::I, 0, 3, 0));
        assert!(event.perfect_clear);
        assert_eq!(event.score_delta, 10);
        assert!(state.board.is_empty());
    }

    #[test]
    fn test_freeze_in_hidden_rows_is_game_over() {
        let mut state = GameState::with_seed(6);
        state.edit_board(|board| {
            for y in 2..22 {
                board.fill_row_except(y, &[9], PieceKind::T);
            }
        });
        drop_piece(&mut state, Piece::at(PieceKind::O, 0, 3, 0));
        assert_eq!(state.run_state, RunState::GameOver);

        let before = state.score;
        state.step(&InputFrame::tap(GameAction::MoveLeft), 16).unwrap();
        assert_eq!(state.score, before);

        state.step(&InputFrame::tap(GameAction::Restart), 16).unwrap();
        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(state.episode_id, 1);
        assert!(state.board.is_empty());
    }

    #[test]
    fn test_blocked_spawn_is_game_over() {
        let mut state = GameState::with_seed(6);
        state.edit_board(|board| {
            for y in 0..4 {
                board.fill_row_except(y, &[9], PieceKind::T);
            }
        });
        state.spawn_piece();
        assert_eq!(state.run_state, RunState::GameOver);
    }

    #[test]
    fn test_corners_above_board_count_as_occupied() {
        let state = GameState::with_seed(6);
        // Front corners of a spawn-facing T sit on its top row.
        let high = Piece::at(PieceKind::T, 0, 3, -1);
        assert_eq!(state.t_corners(&high), (2, 0));

        let low = Piece::at(PieceKind::T, 0, 3, 5);
        assert_eq!(state.t_corners(&low), (0, 0));
    }

    #[test]
    fn test_impossible_clear_surfaces_error() {
        let mut state = GameState::with_seed(6);
        state.edit_board(|board| {
            for y in 17..22 {
                board.fill_row_except(y, &[], PieceKind::T);
            }
        });
        state.active = Some(Piece::at(PieceKind::O, 0, 3, 0));
        assert_eq!(
            state.apply_action(GameAction::HardDrop),
            Err(EngineError::ImpossibleClear { lines: 5 })
        );
    }

    #[test]
    fn test_time_budget_expires() {
        let config = EngineConfig {
            time_budget_ms: 10,
            ..EngineConfig::with_seed(1)
        };
        let mut state = GameState::new(config);
        let idle = InputFrame::default();
        state.step(&idle, 4).unwrap();
        state.step(&idle, 4).unwrap();
        assert_eq!(state.run_state, RunState::Running);
        state.step(&idle, 4).unwrap();
        assert_eq!(state.run_state, RunState::TimeUp);
        assert_eq!(state.remaining_ms, 0);
    }

    #[test]
    fn test_gravity_on_step_cadence() {
        let config = EngineConfig {
            gravity_interval_steps: 3,
            ..EngineConfig::with_seed(1)
        };
        let mut state = GameState::new(config);
        let y0 = state.active.unwrap().y;
        let idle = InputFrame::default();
        state.step(&idle, 1).unwrap();
        state.step(&idle, 1).unwrap();
        assert_eq!(state.active.unwrap().y, y0);
        state.step(&idle, 1).unwrap();
        assert_eq!(state.active.unwrap().y, y0 + 1);
        assert_eq!(state.last_action, Some(LastAction::Drop));
    }

    #[test]
    fn test_auto_repeat_after_threshold() {
        let mut state = GameState::with_seed(1);
        let x0 = state.active.unwrap().x;
        let held = InputFrame {
            held: HeldDirections::only(Direction::Left),
            events: Vec::new(),
        };

        for _ in 0..3 {
            state.step(&held, 100).unwrap();
        }
        assert_eq!(state.active.unwrap().x, x0, "300ms is not past the threshold");

        state.step(&held, 100).unwrap();
        assert_eq!(state.active.unwrap().x, x0 - 1);
        state.step(&held, 100).unwrap();
        assert_eq!(state.active.unwrap().x, x0 - 2);

        // Releasing resets the hold timer.
        state.step(&InputFrame::default(), 100).unwrap();
        state.step(&held, 100).unwrap();
        assert_eq!(state.active.unwrap().x, x0 - 2);
    }

    #[test]
    fn test_ghost_follows_moves() {
        let mut state = GameState::with_seed(1);
        state.edit_board(|board| {
            for x in 0..10 {
                board.set(x, 15, Some(PieceKind::I));
            }
            board.set(0, 15, None);
            board.set(1, 15, None);
            board.set(2, 15, None);
        });
        let near = state.ghost.unwrap();
        assert_eq!(near, project_ghost(&state.board, &state.active.unwrap()));
        while state.try_move(-1).unwrap() {}
        let piece = state.active.unwrap();
        assert_eq!(state.ghost.unwrap(), project_ghost(&state.board, &piece));
        assert_eq!(state.ghost.unwrap().x, piece.x);
    }

    #[test]
    fn test_restart_reinitializes() {
        let mut state = GameState::with_seed(12345);
        state.apply_action(GameAction::Hold).unwrap();
        state.apply_action(GameAction::HardDrop).unwrap();
        assert!(state.apply_action(GameAction::Restart).unwrap());

        assert_eq!(state.episode_id, 1);
        assert_eq!(state.pieces, 0);
        assert_eq!(state.score, 0);
        assert!(state.hold.is_none());
        assert!(state.can_hold);
        assert!(state.board.is_empty());
        assert_eq!(state.remaining_ms, TIME_BUDGET_MS);
    }

    #[test]
    fn test_snapshot_exports_state() {
        let mut state = GameState::with_seed(21);
        state.apply_action(GameAction::HardDrop).unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.board.len(), 10 * 22);
        assert_eq!(snap.board.iter().filter(|&&c| c != 0).count(), 4);
        assert_eq!(snap.preview, state.preview());
        assert_eq!(snap.pieces, 1);
        assert_eq!(snap.run_state, RunState::Running);
        assert!(snap.last_event.is_some());
    }
}
