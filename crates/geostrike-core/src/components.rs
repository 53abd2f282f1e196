//! ECS components for hecs entities.
//!
//! One hecs entity is spawned per feed entity. Components are plain data;
//! the proximity logic lives in the engine's systems.

use crate::enums::{MissileStatus, Rarity};

/// Feed identifier of the entity (used for `consumeEntity` and dedup).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey(pub String);

/// Blast zone of a missile. The entity's location is the impact point.
#[derive(Debug, Clone)]
pub struct MissileBlast {
    /// Blast radius in meters.
    pub radius_m: f64,
    pub missile_type: String,
    pub status: MissileStatus,
    pub sent_by: String,
}

/// A loot drop waiting to be picked up.
#[derive(Debug, Clone, Copy)]
pub struct LootDrop {
    pub rarity: Rarity,
}

/// An armed landmine.
#[derive(Debug, Clone)]
pub struct ArmedLandmine {
    pub placed_by: String,
}

// GeoPoint (types.rs) is attached as the entity's location component.
