//! Protocol module - decision records in, observations out
//!
//! Decisions arrive one per line, either as JSON
//! (`{"rotation":1,"target_column":4,"drop_mode":"soft+spin-left","spin_count":1}`)
//! or as whitespace-separated integers `r x d t` (`r x d m t` is also accepted,
//! with the long-move hint `m` ignored since the translator derives it).
//! Lines that fail to decode are dropped: the channel is best-effort.
//!
//! Observations go out as one JSON object per line.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::GameSnapshot;
use crate::types::{Decision, DropMode, LockEvent, MAX_SPIN_COUNT};

// ============== Controller -> Game ==============

/// Drop mode as sent on the wire: a numeric code or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DropModeWire {
    Code(i64),
    Name(String),
}

impl DropModeWire {
    pub fn resolve(&self) -> Option<DropMode> {
        match self {
            DropModeWire::Code(code) => DropMode::from_code(*code),
            DropModeWire::Name(name) => DropMode::from_str(name),
        }
    }
}

/// Raw decision record, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub rotation: i64,
    #[serde(alias = "x", alias = "column")]
    pub target_column: i64,
    #[serde(alias = "drop")]
    pub drop_mode: DropModeWire,
    #[serde(default, alias = "post_drop_spin_count", alias = "spins")]
    pub spin_count: i64,
}

impl DecisionRecord {
    /// Validate into a decision.
    ///
    /// An out-of-range rotation or an unknown drop mode drops the record; the
    /// column and spin count are clamped instead.
    pub fn into_decision(self) -> Option<Decision> {
        let rotation = u8::try_from(self.rotation)
            .ok()
            .filter(|&r| r <= Decision::HOLD_ROTATION)?;
        let drop_mode = self.drop_mode.resolve()?;
        let target_column = self.target_column.clamp(i8::MIN as i64, i8::MAX as i64) as i8;
        let spin_count = self.spin_count.clamp(0, MAX_SPIN_COUNT as i64) as u8;

        Some(Decision {
            rotation,
            target_column,
            drop_mode,
            spin_count,
        })
    }
}

/// Parse the plain integer form, `r x d t` or `r x d m t`.
fn parse_plain(line: &str) -> Option<DecisionRecord> {
    let fields: Vec<i64> = line
        .split_whitespace()
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;

    let (rotation, target_column, drop, spin_count) = match fields.as_slice() {
        &[r, x, d, t] => (r, x, d, t),
        &[r, x, d, _m, t] => (r, x, d, t),
        _ => return None,
    };
    Some(DecisionRecord {
        rotation,
        target_column,
        drop_mode: DropModeWire::Code(drop),
        spin_count,
    })
}

/// Decode one line into a decision. Blank and malformed lines yield `None`.
pub fn decode_line(line: &str) -> Option<Decision> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let record = if line.starts_with('{') {
        match serde_json::from_str::<DecisionRecord>(line) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(%err, line, "dropping malformed decision");
                None
            }
        }
    } else {
        let parsed = parse_plain(line);
        if parsed.is_none() {
            debug!(line, "dropping malformed decision");
        }
        parsed
    }?;

    let decision = record.clone().into_decision();
    if decision.is_none() {
        debug!(?record, "dropping out-of-range decision");
    }
    decision
}

// ============== Game -> Observers ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPayload {
    pub width: u8,
    pub height: u8,
    /// Row-major rows of cell codes (0 empty, 1..=7 piece kind).
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePayload {
    pub kind: String,
    pub rotation: u8,
    pub x: i8,
    pub y: i8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEventPayload {
    pub kind: String,
    pub lines_cleared: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tspin: Option<String>,
    pub score_delta: u32,
    pub combo: i32,
    pub back_to_back: bool,
    pub perfect_clear: bool,
}

impl From<LockEvent> for LastEventPayload {
    fn from(ev: LockEvent) -> Self {
        Self {
            kind: ev.kind.as_str().to_string(),
            lines_cleared: ev.lines_cleared,
            tspin: ev.tspin.as_str().map(str::to_string),
            score_delta: ev.score_delta,
            combo: ev.combo,
            back_to_back: ev.back_to_back,
            perfect_clear: ev.perfect_clear,
        }
    }
}

/// State export message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub episode_id: u32,
    pub step: u64,
    pub state: String,
    pub playable: bool,
    pub board: BoardPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActivePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ghost_y: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold: Option<String>,
    pub can_hold: bool,
    pub preview: Vec<String>,
    pub score: u32,
    pub back_to_back: bool,
    pub combo: i32,
    pub lines: u32,
    pub pieces: u32,
    pub remaining_ms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEventPayload>,
}

impl Observation {
    pub fn from_snapshot(snapshot: &GameSnapshot, seq: u64) -> Self {
        let width = snapshot.width.max(1) as usize;
        Self {
            msg_type: ObservationType::Observation,
            seq,
            episode_id: snapshot.episode_id,
            step: snapshot.step,
            state: snapshot.run_state.as_str().to_string(),
            playable: snapshot.playable(),
            board: BoardPayload {
                width: snapshot.width,
                height: snapshot.height,
                cells: snapshot.board.chunks(width).map(<[u8]>::to_vec).collect(),
            },
            active: snapshot.active.map(|a| ActivePayload {
                kind: a.kind.as_str().to_string(),
                rotation: a.rotation,
                x: a.x,
                y: a.y,
            }),
            ghost_y: snapshot.ghost_y,
            hold: snapshot.hold.map(|k| k.as_str().to_string()),
            can_hold: snapshot.can_hold,
            preview: snapshot
                .preview
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            score: snapshot.score,
            back_to_back: snapshot.back_to_back,
            combo: snapshot.combo,
            lines: snapshot.lines,
            pieces: snapshot.pieces,
            remaining_ms: snapshot.remaining_ms,
            last_event: snapshot.last_event.map(LastEventPayload::from),
        }
    }

    pub fn to_line(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("serialize observation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_with_named_drop_mode() {
        let d = decode_line(
            r#"{"rotation":1,"target_column":4,"drop_mode":"soft+spin-left","spin_count":2}"#,
        )
        .unwrap();
        assert_eq!(d.rotation, 1);
        assert_eq!(d.target_column, 4);
        assert_eq!(d.drop_mode, DropMode::SoftSpinLeft);
        assert_eq!(d.spin_count, 2);
    }

    #[test]
    fn test_decode_json_with_numeric_drop_mode_and_aliases() {
        let d = decode_line(r#"{"rotation":0,"x":7,"drop":3,"post_drop_spin_count":1}"#).unwrap();
        assert_eq!(d.target_column, 7);
        assert_eq!(d.drop_mode, DropMode::SoftSpinRight);
        assert_eq!(d.spin_count, 1);
    }

    #[test]
    fn test_decode_plain_forms() {
        let four = decode_line("2 5 1 0").unwrap();
        assert_eq!(four.rotation, 2);
        assert_eq!(four.drop_mode, DropMode::Soft);

        let five = decode_line("3 0 2 1 3").unwrap();
        assert_eq!(five.drop_mode, DropMode::SoftSpinLeft);
        assert_eq!(five.spin_count, 3);
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        assert_eq!(decode_line(""), None);
        assert_eq!(decode_line("   "), None);
        assert_eq!(decode_line("1 2"), None);
        assert_eq!(decode_line("a b c d"), None);
        assert_eq!(decode_line("{not json"), None);
        assert_eq!(decode_line(r#"{"rotation":1}"#), None);
    }

    #[test]
    fn test_out_of_range_fields() {
        // Rotation past hold and unknown drop modes are dropped.
        assert_eq!(decode_line("5 3 0 0"), None);
        assert_eq!(decode_line("-1 3 0 0"), None);
        assert_eq!(decode_line("0 3 9 0"), None);
        assert_eq!(
            decode_line(r#"{"rotation":0,"target_column":3,"drop_mode":"sideways"}"#),
            None
        );

        // Columns and spins are clamped.
        let d = decode_line("0 1000 2 -4").unwrap();
        assert_eq!(d.target_column, i8::MAX);
        assert_eq!(d.spin_count, 0);
        let d = decode_line("0 3 3 99").unwrap();
        assert_eq!(d.spin_count, MAX_SPIN_COUNT);
    }

    #[test]
    fn test_hold_decision() {
        let d = decode_line("4 0 0 0").unwrap();
        assert!(d.is_hold());
    }

    #[test]
    fn test_observation_shape() {
        let snapshot = GameSnapshot {
            board: vec![0; 40],
            width: 4,
            height: 10,
            preview: vec![crate::types::PieceKind::T],
            ..GameSnapshot::default()
        };
        let obs = Observation::from_snapshot(&snapshot, 7);
        let value: serde_json::Value = serde_json::from_str(&obs.to_line().unwrap()).unwrap();

        assert_eq!(value["type"], "observation");
        assert_eq!(value["seq"], 7);
        assert_eq!(value["state"], "running");
        assert_eq!(value["board"]["cells"].as_array().unwrap().len(), 10);
        assert_eq!(value["preview"][0], "t");
        assert!(value.get("active").is_none());
        assert!(value.get("last_event").is_none());
    }
}
