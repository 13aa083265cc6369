//! Engine configuration.
//!
//! Every field has a default matching the reference ruleset; values are read
//! from `TETRIS_*` environment variables and sanitized before use.

use serde::{Deserialize, Serialize};

use crate::types::{
    AUTO_REPEAT_MS, BOARD_HEIGHT, BOARD_WIDTH, GRAVITY_INTERVAL_STEPS, HIDDEN_ROWS,
    MAX_PREVIEW_DEPTH, PREVIEW_DEPTH, STEP_MS, TIME_BUDGET_MS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_width: u8,
    pub board_height: u8,
    pub hidden_rows: u8,
    pub auto_repeat_ms: u32,
    pub gravity_interval_steps: u32,
    pub time_budget_ms: u32,
    pub preview_depth: usize,
    /// Fixed bag seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    /// Duration of one replayed frame.
    pub step_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            hidden_rows: HIDDEN_ROWS,
            auto_repeat_ms: AUTO_REPEAT_MS,
            gravity_interval_steps: GRAVITY_INTERVAL_STEPS,
            time_budget_ms: TIME_BUDGET_MS,
            preview_depth: PREVIEW_DEPTH,
            seed: None,
            step_ms: STEP_MS,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Override fields present in the environment; unparsable values are ignored.
    pub fn apply_env(mut self) -> Self {
        use std::env;

        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            env::var(key).ok().and_then(|s| s.trim().parse().ok())
        }

        if let Some(v) = parsed("TETRIS_BOARD_WIDTH") {
            self.board_width = v;
        }
        if let Some(v) = parsed("TETRIS_BOARD_HEIGHT") {
            self.board_height = v;
        }
        if let Some(v) = parsed("TETRIS_HIDDEN_ROWS") {
            self.hidden_rows = v;
        }
        if let Some(v) = parsed("TETRIS_AUTO_REPEAT_MS") {
            self.auto_repeat_ms = v;
        }
        if let Some(v) = parsed("TETRIS_GRAVITY_STEPS") {
            self.gravity_interval_steps = v;
        }
        if let Some(v) = parsed("TETRIS_TIME_BUDGET_MS") {
            self.time_budget_ms = v;
        }
        if let Some(v) = parsed("TETRIS_PREVIEW_DEPTH") {
            self.preview_depth = v;
        }
        if let Some(v) = parsed("TETRIS_SEED") {
            self.seed = Some(v);
        }
        if let Some(v) = parsed("TETRIS_STEP_MS") {
            self.step_ms = v;
        }
        self
    }

    /// Clamp every field into a range the engine can run with.
    pub fn sanitized(mut self) -> Self {
        self.board_width = self.board_width.clamp(4, 64);
        self.hidden_rows = self.hidden_rows.min(8);
        self.board_height = self
            .board_height
            .clamp(self.hidden_rows.saturating_add(4), 100);
        self.gravity_interval_steps = self.gravity_interval_steps.max(1);
        self.preview_depth = self.preview_depth.clamp(1, MAX_PREVIEW_DEPTH);
        self.step_ms = self.step_ms.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_ruleset() {
        let config = EngineConfig::default();
        assert_eq!(config.board_width, 10);
        assert_eq!(config.board_height, 22);
        assert_eq!(config.auto_repeat_ms, 300);
        assert_eq!(config.time_budget_ms, 120_000);
        assert_eq!(config.preview_depth, 5);
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_sanitize_clamps_degenerate_values() {
        let config = EngineConfig {
            board_width: 1,
            board_height: 3,
            gravity_interval_steps: 0,
            preview_depth: 99,
            step_ms: 0,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(config.board_width, 4);
        assert_eq!(config.board_height, 6);
        assert_eq!(config.gravity_interval_steps, 1);
        assert_eq!(config.preview_depth, MAX_PREVIEW_DEPTH);
        assert_eq!(config.step_ms, 1);
    }

    #[test]
    fn test_env_overrides_hidden_rows() {
        std::env::set_var("TETRIS_HIDDEN_ROWS", "3");
        let config = EngineConfig::from_env();
        std::env::remove_var("TETRIS_HIDDEN_ROWS");

        assert_eq!(config.hidden_rows, 3);
        assert_eq!(config.board_width, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"board_width": 12, "seed": 5}"#).unwrap();
        assert_eq!(config.board_width, 12);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.board_height, BOARD_HEIGHT);
    }
}
