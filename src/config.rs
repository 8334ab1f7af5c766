//! Search configuration
//!
//! Configuration can be built in code with the `with_*` setters or read
//! from a JSON document; missing fields take their defaults.
//!
//! # Example
//!
//! ```
//! use pigs::SearchConfig;
//!
//! let config = SearchConfig::from_json_str(r#"{ "max_depth": 8, "multi_pv": 1 }"#).unwrap();
//! assert_eq!(config.max_depth, 8);
//! assert_eq!(config.time_limit_ms, 0);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest number of reported lines
pub const MAX_MULTI_PV: usize = 10;
/// Deepest iteration the engine will run
pub const MAX_DEPTH: u32 = 100;

/// Engine search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Last iterative-deepening depth
    pub max_depth: u32,
    /// Wall-clock budget in milliseconds, 0 = unbounded
    pub time_limit_ms: u64,
    /// Number of reported lines
    pub multi_pv: usize,
    /// Transposition table slots (rounded up to a power of two)
    pub tt_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            time_limit_ms: 0,
            multi_pv: 3,
            tt_capacity: 1 << 20,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.max_depth > MAX_DEPTH {
            return Err(ConfigError::DepthTooLarge { max: MAX_DEPTH });
        }
        if self.multi_pv == 0 {
            return Err(ConfigError::ZeroLines);
        }
        if self.multi_pv > MAX_MULTI_PV {
            return Err(ConfigError::TooManyLines { max: MAX_MULTI_PV });
        }
        Ok(())
    }

    /// Time budget, `None` when unbounded
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    #[must_use]
    pub fn with_multi_pv(mut self, lines: usize) -> Self {
        self.multi_pv = lines;
        self
    }

    #[must_use]
    pub fn with_tt_capacity(mut self, slots: usize) -> Self {
        self.tt_capacity = slots;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.time_limit_ms, 0);
        assert_eq!(config.multi_pv, 3);
        assert_eq!(config.tt_capacity, 1 << 20);
        assert!(config.validate().is_ok());
        assert_eq!(config.time_limit(), None);
    }

    #[test]
    fn test_builder() {
        let config = SearchConfig::default()
            .with_max_depth(6)
            .with_time_limit_ms(250)
            .with_multi_pv(1)
            .with_tt_capacity(4096);
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.time_limit(), Some(Duration::from_millis(250)));
        assert_eq!(config.multi_pv, 1);
        assert_eq!(config.tt_capacity, 4096);
    }

    #[test]
    fn test_validate_bounds() {
        let base = SearchConfig::default();
        assert!(matches!(base.clone().with_max_depth(0).validate(), Err(ConfigError::ZeroDepth)));
        assert!(matches!(
            base.clone().with_max_depth(MAX_DEPTH + 1).validate(),
            Err(ConfigError::DepthTooLarge { .. })
        ));
        assert!(matches!(base.clone().with_multi_pv(0).validate(), Err(ConfigError::ZeroLines)));
        assert!(matches!(
            base.clone().with_multi_pv(MAX_MULTI_PV + 1).validate(),
            Err(ConfigError::TooManyLines { max: MAX_MULTI_PV })
        ));
        assert!(base.with_multi_pv(MAX_MULTI_PV).validate().is_ok());
    }

    #[test]
    fn test_json_partial() {
        let config = SearchConfig::from_json_str(r#"{ "time_limit_ms": 1500 }"#).unwrap();
        assert_eq!(config.time_limit_ms, 1500);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.multi_pv, 3);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SearchConfig::default().with_max_depth(12).with_multi_pv(5);
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(SearchConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(SearchConfig::from_json_str("{ not json"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            SearchConfig::from_json_str(r#"{ "multi_pv": 0 }"#),
            Err(ConfigError::ZeroLines)
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SearchConfig::load("/nonexistent/pigs-config.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
