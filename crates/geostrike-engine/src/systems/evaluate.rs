//! Evaluation system: classify every entity in the world against the
//! player's location.

use hecs::{Entity, World};

use geostrike_core::components::{ArmedLandmine, EntityKey, LootDrop, MissileBlast};
use geostrike_core::enums::{EntityClass, MissileStatus, ProximityTier, Rarity};
use geostrike_core::types::GeoPoint;

use crate::proximity::{classify, ProximityThresholds};

/// Kind-specific details the engine needs to react to an observation.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedKind {
    Missile {
        missile_type: String,
        status: MissileStatus,
        sent_by: String,
    },
    Loot {
        rarity: Rarity,
    },
    Landmine {
        placed_by: String,
    },
}

impl ObservedKind {
    pub fn class(&self) -> EntityClass {
        match self {
            ObservedKind::Missile { .. } => EntityClass::Missile,
            ObservedKind::Loot { .. } => EntityClass::Loot,
            ObservedKind::Landmine { .. } => EntityClass::Landmine,
        }
    }
}

/// One entity's tier this cycle.
#[derive(Debug, Clone)]
pub struct Observation {
    pub entity: Entity,
    pub id: String,
    pub tier: ProximityTier,
    pub kind: ObservedKind,
}

/// Classify every entity. Entities owned by `own_username` (missiles they
/// sent, landmines they placed) are left out entirely.
pub fn run(
    world: &World,
    player: GeoPoint,
    thresholds: &ProximityThresholds,
    own_username: &str,
) -> Vec<Observation> {
    let is_own = |owner: &str| !own_username.is_empty() && owner == own_username;
    let mut observations = Vec::new();

    for (entity, (key, location, blast)) in
        world.query::<(&EntityKey, &GeoPoint, &MissileBlast)>().iter()
    {
        if is_own(&blast.sent_by) {
            continue;
        }
        observations.push(Observation {
            entity,
            id: key.0.clone(),
            tier: classify(
                EntityClass::Missile,
                *location,
                Some(blast.radius_m),
                player,
                thresholds,
            ),
            kind: ObservedKind::Missile {
                missile_type: blast.missile_type.clone(),
                status: blast.status,
                sent_by: blast.sent_by.clone(),
            },
        });
    }

    for (entity, (key, location, drop)) in
        world.query::<(&EntityKey, &GeoPoint, &LootDrop)>().iter()
    {
        observations.push(Observation {
            entity,
            id: key.0.clone(),
            tier: classify(EntityClass::Loot, *location, None, player, thresholds),
            kind: ObservedKind::Loot {
                rarity: drop.rarity,
            },
        });
    }

    for (entity, (key, location, mine)) in
        world.query::<(&EntityKey, &GeoPoint, &ArmedLandmine)>().iter()
    {
        if is_own(&mine.placed_by) {
            continue;
        }
        observations.push(Observation {
            entity,
            id: key.0.clone(),
            tier: classify(EntityClass::Landmine, *location, None, player, thresholds),
            kind: ObservedKind::Landmine {
                placed_by: mine.placed_by.clone(),
            },
        });
    }

    observations
}
