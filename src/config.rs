//! Application configuration: engine tunables plus key bindings.
//!
//! Sources, lowest priority first: built-in defaults, an optional JSON file,
//! `TETRIS_*` environment variables. The result is always sanitized.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::EngineConfig;
use crate::input::KeyBindings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub keys: KeyBindings,
}

impl AppConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("parse config JSON")
    }

    /// Load from `path` (if any), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let base = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read config {}", path.display()))?;
                Self::from_json(&text).with_context(|| format!("in {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    pub fn with_env(mut self) -> Self {
        self.engine = self.engine.apply_env().sanitized();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_nested_sections() {
        let config = AppConfig::from_json(
            r#"{"engine": {"preview_depth": 3, "seed": 9}, "keys": {"hold": ["tab"]}}"#,
        )
        .unwrap();
        assert_eq!(config.engine.preview_depth, 3);
        assert_eq!(config.engine.seed, Some(9));
        assert_eq!(config.keys.hold, vec!["tab".to_string()]);
        assert_eq!(config.keys.move_left, KeyBindings::default().move_left);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(AppConfig::from_json("{\"engine\": 3}").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/srs-tetris.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("read config"));
    }
}
