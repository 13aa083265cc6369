//! Scoring module - line values, T-spin classification, back-to-back, combo, perfect clear
//!
//! Point values are small integers:
//!
//! | Clear | Plain | T-spin | T-spin (b2b) | Plain (b2b) |
//! |-------|-------|--------|--------------|-------------|
//! | 1 line | 0 | mini 1 / full 2 | mini 2 / full 3 | 0 |
//! | 2 lines | 1 | 4 | 6 | 1 |
//! | 3 lines | 2 | 6 | 9 | 2 |
//! | 4 lines | 4 | - | - | 6 |
//!
//! The combo bonus and the perfect-clear bonus are added on top.

use crate::error::{EngineError, EngineResult};
use crate::types::{TSpinKind, COMBO_TABLE, FULL_TSPIN_KICK, PERFECT_CLEAR_BONUS};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Table points for the clear (back-to-back tier already applied).
    pub line_clear_score: u32,
    /// Combo bonus added on top of `line_clear_score`.
    pub combo_bonus: u32,
    pub perfect_clear_bonus: u32,
    pub total: u32,
    /// Whether this clear keeps back-to-back alive for the next one.
    pub qualifies_for_b2b: bool,
    /// Whether the back-to-back tier was used for this clear.
    pub b2b_applied: bool,
}

/// Classify a T piece freeze from its corner occupancy.
///
/// `front` / `back` count occupied corners on the pointing side and the flat
/// side. Only meaningful when the freezing action was a rotation.
pub fn classify_tspin(front: usize, back: usize, last_kick: Option<u8>) -> TSpinKind {
    match (front, back) {
        (2, _) => TSpinKind::Full,
        (1, 2) if last_kick == Some(FULL_TSPIN_KICK) => TSpinKind::Full,
        (1, 2) => TSpinKind::Mini,
        _ => TSpinKind::None,
    }
}

/// Table points for a clear of `lines` rows.
///
/// Any T-spin on two or three lines scores the T-spin value; only single-line
/// T-spins distinguish mini from full.
pub fn line_clear_score(lines: usize, tspin: TSpinKind, b2b: bool) -> EngineResult<u32> {
    let pick = |plain: u32, boosted: u32| if b2b { boosted } else { plain };
    let points = match (lines, tspin) {
        (0, _) => 0,
        (1, TSpinKind::None) => 0,
        (1, TSpinKind::Mini) => pick(1, 2),
        (1, TSpinKind::Full) => pick(2, 3),
        (2, TSpinKind::None) => 1,
        (2, _) => pick(4, 6),
        (3, TSpinKind::None) => 2,
        (3, _) => pick(6, 9),
        (4, _) => pick(4, 6),
        (lines, _) => return Err(EngineError::ImpossibleClear { lines }),
    };
    Ok(points)
}

/// Calculate combo bonus.
///
/// `combo` is the post-increment counter:
/// - `-1`: no combo chain
/// - `0`: first clear in chain (no bonus)
/// - `1+`: table lookup, clamped to the last entry
pub fn combo_bonus(combo: i32) -> u32 {
    if combo < 0 {
        return 0;
    }
    let idx = (combo as usize).min(COMBO_TABLE.len() - 1);
    COMBO_TABLE[idx]
}

/// Check if this clear keeps back-to-back alive
/// B2B applies to: any T-spin with lines, or a 4-line clear
pub fn qualifies_for_b2b(tspin: TSpinKind, lines: usize) -> bool {
    lines > 0 && (lines == 4 || tspin.is_spin())
}

/// Calculate complete score for a line clear.
pub fn calculate_score(
    lines: usize,
    tspin: TSpinKind,
    combo: i32,
    previous_b2b: bool,
    perfect_clear: bool,
) -> EngineResult<ScoreResult> {
    let qualifies = qualifies_for_b2b(tspin, lines);
    let b2b_applied = qualifies && previous_b2b;

    let line_clear_score = line_clear_score(lines, tspin, previous_b2b)?;
    let combo_bonus = combo_bonus(combo);
    let perfect_clear_bonus = if perfect_clear { PERFECT_CLEAR_BONUS } else { 0 };

    Ok(ScoreResult {
        line_clear_score,
        combo_bonus,
        perfect_clear_bonus,
        total: line_clear_score + combo_bonus + perfect_clear_bonus,
        qualifies_for_b2b: qualifies,
        b2b_applied,
    })
}
