use tracing::trace;

use srs_tetris_core::Piece;
use srs_tetris_types::{ControlEvent, Decision, DropMode, MAX_SPIN_COUNT};

/// Rotation taps for a decision's rotation step (0-3).
fn rotation_events(rotation: u8) -> &'static [ControlEvent] {
    match rotation {
        1 => &[ControlEvent::RotateCw],
        2 => &[ControlEvent::RotateCw, ControlEvent::RotateCw],
        3 => &[ControlEvent::RotateCcw],
        _ => &[],
    }
}

/// The piece the rotation taps are expected to produce, assuming no kick.
fn predicted_piece(piece: &Piece, rotation: u8) -> Piece {
    rotation_events(rotation)
        .iter()
        .fold(*piece, |p, event| {
            p.rotated_with_kick(*event == ControlEvent::RotateCw, 0)
        })
}

/// Horizontal travel from `from` to `target` within `[min, max]`.
///
/// An extreme column is reached with a long hold; one column in from an
/// extreme is a long hold plus a single opposite tap; anything else is taps.
fn travel_events(from: i8, target: i8, min: i8, max: i8, out: &mut Vec<ControlEvent>) {
    if target == from {
        return;
    }

    if target == min {
        out.push(ControlEvent::LongMoveLeft);
    } else if target == max {
        out.push(ControlEvent::LongMoveRight);
    } else if target == min + 1 && target < from {
        out.push(ControlEvent::LongMoveLeft);
        out.push(ControlEvent::MoveRight);
    } else if target == max - 1 && target > from {
        out.push(ControlEvent::LongMoveRight);
        out.push(ControlEvent::MoveLeft);
    } else {
        let (event, count) = if target < from {
            (ControlEvent::MoveLeft, from - target)
        } else {
            (ControlEvent::MoveRight, target - from)
        };
        out.extend(std::iter::repeat(event).take(count as usize));
    }
}

/// Convert one placement decision into primitive control events.
///
/// `piece` is the active piece the decision applies to; `width` / `height` are
/// the board dimensions. A hold decision produces a lone `Hold`. The target
/// column is clamped into the legal range of the rotated piece.
pub fn translate(decision: &Decision, piece: &Piece, width: u8, height: u8) -> Vec<ControlEvent> {
    if decision.is_hold() {
        return vec![ControlEvent::Hold];
    }

    let mut events = Vec::new();
    events.extend_from_slice(rotation_events(decision.rotation));

    let rotated = predicted_piece(piece, decision.rotation);
    let min = rotated.min_column();
    let max = rotated.max_column(width);
    let target = decision.target_column.clamp(min, max);
    travel_events(rotated.x, target, min, max, &mut events);

    if decision.drop_mode != DropMode::Hard {
        events.extend(std::iter::repeat(ControlEvent::SoftDropStep).take(height as usize));
        let spin = match decision.drop_mode {
            DropMode::SoftSpinLeft => Some(ControlEvent::RotateCcw),
            DropMode::SoftSpinRight => Some(ControlEvent::RotateCw),
            DropMode::Hard | DropMode::Soft => None,
        };
        if let Some(spin) = spin {
            let count = decision.spin_count.min(MAX_SPIN_COUNT) as usize;
            events.extend(std::iter::repeat(spin).take(count));
        }
    }
    events.push(ControlEvent::HardDrop);

    trace!(
        kind = piece.kind.as_str(),
        rotation = decision.rotation,
        target,
        drop = decision.drop_mode.as_str(),
        events = events.len(),
        "decision translated"
    );
    events
}
