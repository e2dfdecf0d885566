//! Tunable rule constants.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RulesConfig {
    pub panic_hp_cost: i32,
    /// True damage dealt by panic-overload before the intellect modifier.
    pub panic_damage: i32,
    pub commit_to_hit_bonus: i32,
    pub commit_advantage_damage: i32,
    pub commit_backlash: i32,
    pub guard_base_reduction: i32,
    pub guard_commit_bonus: i32,
    pub counter_die: u32,
    pub keen_edge_chance: u32,
    pub keen_edge_die: u32,
    pub ward_reduction: i32,
    pub boss_phases: u8,
    pub opponent_delay_ms: u64,
    pub log_capacity: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            panic_hp_cost: 3,
            panic_damage: 8,
            commit_to_hit_bonus: 2,
            commit_advantage_damage: 1,
            commit_backlash: 1,
            guard_base_reduction: 2,
            guard_commit_bonus: 1,
            counter_die: 4,
            keen_edge_chance: 25,
            keen_edge_die: 4,
            ward_reduction: 3,
            boss_phases: 3,
            opponent_delay_ms: 600,
            log_capacity: 40,
        }
    }
}

impl RulesConfig {
    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| EngineError::Yaml {
            what: "rules config".to_string(),
            source,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| EngineError::Json {
            what: "rules config".to_string(),
            source,
        })
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }
}
