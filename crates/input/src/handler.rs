//! Key events to per-step input frames.
//!
//! Supports terminals that do not emit key release events by using a timeout.
//! Auto-repeat itself is the engine's job: the builder only reports which
//! directions are held and which discrete actions were pressed.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::{KeyEvent, KeyEventKind};

use crate::map::KeyMap;
use crate::types::{Direction, GameAction, HeldDirections, InputFrame};

// In terminals without key-release events, a timeout keeps a single tap from
// turning into a sustained "held" state. It has to outlast the keyboard's own
// repeat delay, which refreshes the press while the key is down.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 600;

/// Outcome of feeding one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    Quit,
}

/// Accumulates key events between engine steps.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    keys: KeyMap,
    held: HeldDirections,
    last_press: [Instant; 3],
    pending: ArrayVec<GameAction, 32>,
    key_release_timeout_ms: u32,
}

impl FrameBuilder {
    pub fn new(keys: KeyMap) -> Self {
        Self {
            keys,
            held: HeldDirections::default(),
            last_press: [Instant::now(); 3],
            pending: ArrayVec::new(),
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> KeyOutcome {
        if self.keys.is_quit(key) {
            return KeyOutcome::Quit;
        }
        match key.kind {
            KeyEventKind::Release => self.handle_release(key),
            KeyEventKind::Press | KeyEventKind::Repeat => self.handle_press(key),
        }
    }

    fn handle_press(&mut self, key: KeyEvent) -> KeyOutcome {
        let Some(action) = self.keys.action_for(key) else {
            return KeyOutcome::Ignored;
        };

        if let Some(direction) = self.keys.direction_for(key.code) {
            self.last_press[direction.index()] = Instant::now();
            // Keyboard auto-repeat of a held key is not a new press.
            if self.held.contains(direction) {
                return KeyOutcome::Handled;
            }
            self.held.insert(direction);
        }

        // Overflow between two steps is dropped.
        let _ = self.pending.try_push(action);
        KeyOutcome::Handled
    }

    fn handle_release(&mut self, key: KeyEvent) -> KeyOutcome {
        match self.keys.direction_for(key.code) {
            Some(direction) => {
                self.held.remove(direction);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        }
    }

    /// Drain everything gathered since the previous frame.
    pub fn take_frame(&mut self) -> InputFrame {
        let timeout = Duration::from_millis(u64::from(self.key_release_timeout_ms));
        for direction in Direction::ALL {
            if self.held.contains(direction)
                && self.last_press[direction.index()].elapsed() > timeout
            {
                self.held.remove(direction);
            }
        }

        InputFrame {
            held: self.held,
            events: self.pending.drain(..).collect(),
        }
    }

    pub fn reset(&mut self) {
        self.held = HeldDirections::default();
        self.pending.clear();
        self.last_press = [Instant::now(); 3];
    }
}
