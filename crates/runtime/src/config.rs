//! Runtime configuration, loadable from RON.
use std::path::Path;

use serde::{Deserialize, Serialize};

use creature_core::GameConfig;

use crate::api::{Result, RuntimeError};

/// Runtime configuration shared across the orchestrator and workers.
///
/// ```ron
/// (
///     game_config: (think_interval: 500),
///     tick_millis: 50,
///     game_seed: 7,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Wall-clock period of one automatic clock advance, in milliseconds.
    /// Each advance moves the simulation clock by the same amount of ticks.
    /// `0` leaves the clock to explicit [`crate::RuntimeHandle::advance`] calls.
    pub tick_millis: u64,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    pub game_seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            tick_millis: 0,
            command_buffer_size: 32,
            event_buffer_size: 256,
            game_seed: 0,
        }
    }
}

impl RuntimeConfig {
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)
            .map_err(|e| {
                RuntimeError::InvalidConfig(format!("failed to parse runtime config: {e}"))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.game_config.default_step_duration == 0 {
            return Err(RuntimeError::InvalidConfig(
                "default_step_duration must be at least one tick".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads and parses a RON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_ron_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config =
            RuntimeConfig::from_ron_str("(game_seed: 42, game_config: (think_interval: 250))")
            .expect("valid config");
        assert_eq!(config.game_seed, 42);
        assert_eq!(config.game_config.think_interval, 250);
        assert_eq!(config.game_config.armor_divisor, GameConfig::DEFAULT_ARMOR_DIVISOR);
        assert_eq!(config.command_buffer_size, 32);
    }

    #[test]
    fn malformed_config_is_rejected() {
        let error = RuntimeConfig::from_ron_str("(game_seed: \"seven\")").unwrap_err();
        assert!(matches!(error, RuntimeError::InvalidConfig(_)));
    }

    #[test]
    fn zero_step_duration_is_rejected() {
        let error = RuntimeConfig::from_ron_str("(game_config: (default_step_duration: 0))")
            .unwrap_err();
        assert!(matches!(error, RuntimeError::InvalidConfig(_)));

        let mut config = RuntimeConfig::default();
        config.game_config.default_step_duration = 0;
        assert!(config.validate().is_err());
    }
}
