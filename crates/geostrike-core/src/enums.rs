//! Enumeration types used throughout the engine.

use serde::{Deserialize, Serialize};

/// Missile flight status as reported by the live feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileStatus {
    /// Still in flight toward its destination.
    #[default]
    Incoming,
    /// Landed; the blast zone is live.
    Hit,
}

/// Loot rarity, controlling the chance of a special reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
}

impl Rarity {
    /// Percent chance (0-100) that a pickup of this rarity yields a special reward.
    pub fn reward_chance(self) -> f64 {
        use crate::constants::*;
        match self {
            Rarity::Common => LOOT_CHANCE_COMMON,
            Rarity::Uncommon => LOOT_CHANCE_UNCOMMON,
            Rarity::Rare => LOOT_CHANCE_RARE,
        }
    }
}

/// Player distance to an entity, discretized. Ordered Safe < Near < Within.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ProximityTier {
    #[default]
    Safe,
    Near,
    Within,
}

/// Entity kind without payload. Keys the notification ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Loot,
    Missile,
    Landmine,
}

impl EntityClass {
    pub const ALL: [EntityClass; 3] = [EntityClass::Loot, EntityClass::Missile, EntityClass::Landmine];
}

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// Damage session lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamagePhase {
    /// No session running.
    #[default]
    Idle,
    /// Waiting out the initial delay before the first tick.
    Scheduled,
    /// At least one tick applied; next tick pending.
    Ticking,
    /// Ended by death or cancellation.
    Terminated,
}
