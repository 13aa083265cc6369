//! Key bindings from terminal events to game actions.
//!
//! Bindings are configured by key name (`"left"`, `"space"`, `"z"`, ...) so they
//! can live in a JSON config file. [`KeyBindings::compile`] resolves the names
//! into a [`KeyMap`] used on the hot path.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::types::{Direction, GameAction};

/// Configurable key set, one list of key names per action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub move_left: Vec<String>,
    pub move_right: Vec<String>,
    pub soft_drop: Vec<String>,
    pub hard_drop: Vec<String>,
    pub rotate_cw: Vec<String>,
    pub rotate_ccw: Vec<String>,
    pub hold: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: names(&["left"]),
            move_right: names(&["right"]),
            soft_drop: names(&["down"]),
            hard_drop: names(&["space"]),
            rotate_cw: names(&["up", "x"]),
            rotate_ccw: names(&["z"]),
            hold: names(&["c"]),
            restart: names(&["esc"]),
            quit: names(&["q"]),
        }
    }
}

/// Parse a key name. Single characters are case-insensitive.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let lower = name.trim().to_lowercase();
    let code = match lower.as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Action(GameAction),
    Quit,
}

/// Resolved key bindings.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    entries: Vec<(KeyCode, Binding)>,
    unknown: Vec<String>,
}

impl KeyBindings {
    /// Resolve key names. Unparsable names are skipped and reported by
    /// [`KeyMap::unknown_keys`]; the first binding of a key wins.
    pub fn compile(&self) -> KeyMap {
        let groups: [(&[String], Binding); 9] = [
            (&self.move_left, Binding::Action(GameAction::MoveLeft)),
            (&self.move_right, Binding::Action(GameAction::MoveRight)),
            (&self.soft_drop, Binding::Action(GameAction::SoftDrop)),
            (&self.hard_drop, Binding::Action(GameAction::HardDrop)),
            (&self.rotate_cw, Binding::Action(GameAction::RotateCw)),
            (&self.rotate_ccw, Binding::Action(GameAction::RotateCcw)),
            (&self.hold, Binding::Action(GameAction::Hold)),
            (&self.restart, Binding::Action(GameAction::Restart)),
            (&self.quit, Binding::Quit),
        ];

        let mut map = KeyMap::default();
        for (names, binding) in groups {
            for name in names {
                match parse_key(name) {
                    Some(code) if map.lookup(code).is_none() => {
                        map.entries.push((normalize(code), binding))
                    }
                    Some(_) => {}
                    None => map.unknown.push(name.clone()),
                }
            }
        }
        map
    }
}

impl KeyMap {
    fn lookup(&self, code: KeyCode) -> Option<Binding> {
        let code = normalize(code);
        self.entries
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, binding)| binding)
    }

    /// Names from the configuration that did not resolve to a key.
    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown
    }

    /// Map a key event to a game action.
    pub fn action_for(&self, key: KeyEvent) -> Option<GameAction> {
        match self.lookup(key.code)? {
            Binding::Action(action) => Some(action),
            Binding::Quit => None,
        }
    }

    /// The auto-repeating direction a key controls, if any.
    pub fn direction_for(&self, code: KeyCode) -> Option<Direction> {
        match self.lookup(code)? {
            Binding::Action(GameAction::MoveLeft) => Some(Direction::Left),
            Binding::Action(GameAction::MoveRight) => Some(Direction::Right),
            Binding::Action(GameAction::SoftDrop) => Some(Direction::Down),
            _ => None,
        }
    }

    /// Check if key should quit the session. Ctrl-C always quits.
    pub fn is_quit(&self, key: KeyEvent) -> bool {
        (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
            || self.lookup(key.code) == Some(Binding::Quit)
    }
}
