use std::collections::VecDeque;

use tracing::debug;

use srs_tetris_types::{ControlEvent, Direction, GameAction, HeldDirections, InputFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayError {
    /// A placement is still being replayed.
    Busy,
    /// The sequence contained nothing to replay.
    Empty,
}

impl ReplayError {
    pub fn code(self) -> &'static str {
        match self {
            ReplayError::Busy => "busy",
            ReplayError::Empty => "empty",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ReplayError::Busy => "a placement is already in flight",
            ReplayError::Empty => "placement produced no events",
        }
    }
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ReplayError {}

/// A direction currently being held for a long move.
#[derive(Debug, Clone, Copy)]
struct LongHold {
    direction: Direction,
    frames_left: u32,
}

/// Replays one placement's control events as timed input frames.
///
/// Taps become single-frame discrete events. A long move presses the direction
/// once and then keeps it held long enough for auto-repeat to carry the piece
/// across the whole board.
#[derive(Debug, Clone)]
pub struct Replayer {
    pending: VecDeque<ControlEvent>,
    long_hold: Option<LongHold>,
    /// Frames a long move stays held, including the initial press.
    long_hold_frames: u32,
}

impl Replayer {
    /// `step_ms` is the duration of one frame as seen by the engine.
    pub fn new(auto_repeat_ms: u32, step_ms: u32, board_width: u8) -> Self {
        let step_ms = step_ms.max(1);
        Self {
            pending: VecDeque::new(),
            long_hold: None,
            long_hold_frames: auto_repeat_ms / step_ms + 1 + u32::from(board_width),
        }
    }

    pub fn long_hold_frames(&self) -> u32 {
        self.long_hold_frames
    }

    /// True when no placement is in flight.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.long_hold.is_none()
    }

    /// Queue a placement. Refused while a previous one is still replaying.
    pub fn load(&mut self, events: Vec<ControlEvent>) -> Result<(), ReplayError> {
        if !self.is_idle() {
            return Err(ReplayError::Busy);
        }
        if events.is_empty() {
            return Err(ReplayError::Empty);
        }
        debug!(events = events.len(), "placement loaded");
        self.pending.extend(events);
        Ok(())
    }

    /// Drop whatever is left of the current placement.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!(remaining = self.pending.len(), "placement cancelled");
        }
        self.pending.clear();
        self.long_hold = None;
    }

    /// The next frame to feed the engine, or `None` once the placement is done.
    pub fn next_frame(&mut self) -> Option<InputFrame> {
        if let Some(hold) = self.long_hold.as_mut() {
            hold.frames_left -= 1;
            let frame = InputFrame {
                held: HeldDirections::only(hold.direction),
                events: Vec::new(),
            };
            if hold.frames_left == 0 {
                self.long_hold = None;
            }
            return Some(frame);
        }

        let event = self.pending.pop_front()?;
        let (direction, press) = match event {
            ControlEvent::LongMoveLeft => (Direction::Left, GameAction::MoveLeft),
            ControlEvent::LongMoveRight => (Direction::Right, GameAction::MoveRight),
            other => {
                let action = other.tap_action().unwrap_or(GameAction::SoftDrop);
                return Some(InputFrame::tap(action));
            }
        };

        if self.long_hold_frames > 1 {
            self.long_hold = Some(LongHold {
                direction,
                frames_left: self.long_hold_frames - 1,
            });
        }
        Some(InputFrame {
            held: HeldDirections::only(direction),
            events: vec![press],
        })
    }
}

impl Iterator for Replayer {
    type Item = InputFrame;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}
