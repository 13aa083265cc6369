//! Integration tests: engine, translator and replay working together

use srs_tetris::adapter::{frames_for, run_placement};
use srs_tetris::core::{EngineConfig, GameState};
use srs_tetris::types::{
    Decision, DropMode, GameAction, InputFrame, PieceKind, RunState, PREVIEW_DEPTH,
};

fn decision(rotation: u8, target_column: i8, drop_mode: DropMode) -> Decision {
    Decision {
        rotation,
        target_column,
        drop_mode,
        spin_count: 0,
    }
}

/// Replay every frame of `decision` except the terminal hard drop.
fn replay_until_hard_drop(state: &mut GameState, decision: &Decision) -> Vec<InputFrame> {
    let frames = frames_for(decision, state);
    let step_ms = state.config().step_ms;
    let mut rest = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        if frame.events.contains(&GameAction::HardDrop) {
            rest.extend_from_slice(&frames[i..]);
            break;
        }
        state.step(frame, step_ms).unwrap();
    }
    rest
}

#[test]
fn test_game_lifecycle() {
    let state = GameState::with_seed(12345);
    assert_eq!(state.run_state(), RunState::Running);
    assert!(state.active().is_some());
    assert!(state.ghost().is_some());
    assert_eq!(state.preview().len(), PREVIEW_DEPTH);
    assert_eq!(state.combo(), -1);
}

#[test]
fn test_max_column_decision_rests_at_max_column() {
    for seed in 0..10 {
        for rotation in 0..4 {
            let mut state = GameState::with_seed(seed);
            let kind = state.active().unwrap().kind;
            let d = decision(rotation, i8::MAX, DropMode::Hard);
            let rest = replay_until_hard_drop(&mut state, &d);
            assert_eq!(rest.len(), 1);

            let piece = state.active().unwrap();
            assert_eq!(
                piece.x,
                piece.max_column(10),
                "{:?} rotation {} seed {}",
                kind,
                rotation,
                seed
            );
        }
    }
}

#[test]
fn test_extreme_and_near_extreme_columns() {
    for seed in 0..7 {
        let probe = GameState::with_seed(seed);
        let piece = probe.active().unwrap();
        let (min, max) = (piece.min_column(), piece.max_column(10));

        for target in [min, min + 1, max - 1, max, 4] {
            let mut state = probe.clone();
            replay_until_hard_drop(&mut state, &decision(0, target, DropMode::Hard));
            assert_eq!(state.active().unwrap().x, target, "{:?}", piece.kind);
        }
    }
}

#[test]
fn test_automated_matches_manual_play() {
    let seed = 77;
    let mut automated = GameState::with_seed(seed);
    let mut manual = GameState::with_seed(seed);

    for target in [0, 2, 5, 7, 3] {
        let d = decision(1, target, DropMode::Hard);
        run_placement(&mut automated, &d).unwrap();

        manual.apply_action(GameAction::RotateCw).unwrap();
        let piece = manual.active().unwrap();
        let target = target.clamp(piece.min_column(), piece.max_column(10));
        let step = if target < piece.x { GameAction::MoveLeft } else { GameAction::MoveRight };
        while manual.active().unwrap().x != target {
            assert!(manual.apply_action(step).unwrap());
        }
        manual.apply_action(GameAction::HardDrop).unwrap();
    }

    assert_eq!(automated.board(), manual.board());
    assert_eq!(automated.score(), manual.score());
    assert_eq!(automated.pieces(), 5);
}

#[test]
fn test_soft_drop_reaches_floor_before_spins() {
    let mut state = GameState::with_seed(3);
    let d = Decision {
        rotation: 0,
        target_column: 4,
        drop_mode: DropMode::SoftSpinRight,
        spin_count: 1,
    };
    let frames = frames_for(&d, &state);
    let spin_at = frames
        .iter()
        .position(|f| f.events.contains(&GameAction::RotateCw))
        .unwrap();

    for frame in &frames[..spin_at] {
        state.step(frame, 1).unwrap();
    }
    let piece = state.active().unwrap();
    assert_eq!(Some(piece), state.ghost());

    for frame in &frames[spin_at..] {
        state.step(frame, 1).unwrap();
    }
    assert_eq!(state.pieces(), 1);
}

#[test]
fn test_seeded_runs_are_deterministic() {
    let decisions = [
        decision(0, 0, DropMode::Hard),
        decision(2, 6, DropMode::Soft),
        decision(4, 0, DropMode::Hard),
        decision(3, 9, DropMode::Hard),
        decision(1, 4, DropMode::SoftSpinLeft),
    ];
    let play = || {
        let mut state = GameState::with_seed(2024);
        for d in &decisions {
            run_placement(&mut state, d).unwrap();
        }
        state.snapshot()
    };
    assert_eq!(play(), play());
}

#[test]
fn test_restart_after_time_up() {
    let config = EngineConfig {
        time_budget_ms: 50,
        ..EngineConfig::with_seed(1)
    };
    let mut state = GameState::new(config);
    state.step(&InputFrame::default(), 60).unwrap();
    assert_eq!(state.run_state(), RunState::TimeUp);

    // Anything but restart is ignored.
    let before = state.snapshot();
    state
        .step(&InputFrame::tap(GameAction::HardDrop), 1)
        .unwrap();
    assert_eq!(state.snapshot(), before);

    state.step(&InputFrame::tap(GameAction::Restart), 1).unwrap();
    assert_eq!(state.run_state(), RunState::Running);
    assert_eq!(state.remaining_ms(), 50);
    assert_eq!(state.episode_id(), 1);
}

#[test]
fn test_hold_swap_through_decisions() {
    let mut state = GameState::with_seed(31);
    let first = state.active().unwrap().kind;
    let second = state.preview()[0];

    run_placement(&mut state, &decision(4, 0, DropMode::Hard)).unwrap();
    assert_eq!(state.hold_piece(), Some(first));
    assert_eq!(state.active().unwrap().kind, second);

    // Second hold before a freeze does nothing.
    run_placement(&mut state, &decision(4, 0, DropMode::Hard)).unwrap();
    assert_eq!(state.active().unwrap().kind, second);

    run_placement(&mut state, &decision(0, 0, DropMode::Hard)).unwrap();
    run_placement(&mut state, &decision(4, 0, DropMode::Hard)).unwrap();
    assert_eq!(state.active().unwrap().kind, first);
}

#[test]
fn test_stacking_tops_out() {
    let mut state = GameState::with_seed(5);
    let mut placed = 0;
    while state.run_state() == RunState::Running && placed < 200 {
        run_placement(&mut state, &decision(0, 3, DropMode::Hard)).unwrap();
        placed += 1;
    }
    assert_eq!(state.run_state(), RunState::GameOver);
    assert!(placed > 4);

    // The board keeps every frozen mino of the last episode.
    let filled = state.board().cells().iter().filter(|c| c.is_some()).count();
    assert!(filled > 0);
    assert!(PieceKind::ALL.iter().any(|k| state.board().cells().contains(&Some(*k))));
}
