//! Engine configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Every tunable of the proximity engine. Missing JSON fields take the
/// defaults from `constants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Username of the local player; own missiles and landmines are ignored.
    pub username: String,
    pub near_margin_m: f64,
    /// Radius used for loot and landmines.
    pub fixed_entity_radius_m: f64,
    pub poll_interval_ms: u64,
    pub missile_initial_delay_ms: u64,
    pub landmine_initial_delay_ms: u64,
    pub damage_tick_interval_ms: u64,
    pub missile_damage_per_tick: i32,
    pub landmine_damage_per_tick: i32,
    pub max_health: i32,
    pub loot_health_restore: i32,
    pub loot_currency_baseline: u32,
    pub loot_currency_bonus: u32,
    /// RNG seed for loot rolls. Same seed = same rewards.
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            near_margin_m: NEAR_MARGIN_M,
            fixed_entity_radius_m: FIXED_ENTITY_RADIUS_M,
            poll_interval_ms: POLL_INTERVAL_MS,
            missile_initial_delay_ms: MISSILE_INITIAL_DELAY_MS,
            landmine_initial_delay_ms: LANDMINE_INITIAL_DELAY_MS,
            damage_tick_interval_ms: DAMAGE_TICK_INTERVAL_MS,
            missile_damage_per_tick: MISSILE_DAMAGE_PER_TICK,
            landmine_damage_per_tick: LANDMINE_DAMAGE_PER_TICK,
            max_health: MAX_HEALTH,
            loot_health_restore: LOOT_HEALTH_RESTORE,
            loot_currency_baseline: LOOT_CURRENCY_BASELINE,
            loot_currency_bonus: LOOT_CURRENCY_BONUS,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values that would make classification or scheduling meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near_margin_m.is_finite() && self.near_margin_m >= 0.0) {
            return Err(invalid("near_margin_m", self.near_margin_m));
        }
        if !(self.fixed_entity_radius_m.is_finite() && self.fixed_entity_radius_m > 0.0) {
            return Err(invalid("fixed_entity_radius_m", self.fixed_entity_radius_m));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", 0));
        }
        if self.damage_tick_interval_ms == 0 {
            return Err(invalid("damage_tick_interval_ms", 0));
        }
        if self.max_health <= 0 {
            return Err(invalid("max_health", self.max_health));
        }
        if self.missile_damage_per_tick < 0 {
            return Err(invalid("missile_damage_per_tick", self.missile_damage_per_tick));
        }
        if self.landmine_damage_per_tick < 0 {
            return Err(invalid("landmine_damage_per_tick", self.landmine_damage_per_tick));
        }
        if self.loot_health_restore < 0 {
            return Err(invalid("loot_health_restore", self.loot_health_restore));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: format!("{value} is out of range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "username": "alice", "near_margin_m": 5.0 }"#)
                .unwrap();
        assert_eq!(config.username, "alice");
        assert_eq!(config.near_margin_m, 5.0);
        assert_eq!(config.poll_interval_ms, POLL_INTERVAL_MS);
        assert_eq!(config.fixed_entity_radius_m, FIXED_ENTITY_RADIUS_M);
    }

    #[test]
    fn test_rejects_negative_margin() {
        let err = EngineConfig::from_json_str(r#"{ "near_margin_m": -1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "near_margin_m",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_tick_interval() {
        let err = EngineConfig::from_json_str(r#"{ "damage_tick_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_rejects_negative_damage_and_restore() {
        for json in [
            r#"{ "missile_damage_per_tick": -5 }"#,
            r#"{ "landmine_damage_per_tick": -1 }"#,
            r#"{ "loot_health_restore": -200 }"#,
        ] {
            let err = EngineConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{json}");
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
