//! Live feed snapshot: the full set of entities near the player.
//!
//! Every update replaces the previous snapshot wholesale; there are no deltas.

use serde::{Deserialize, Serialize};

use crate::enums::{MissileStatus, Rarity};
use crate::types::GeoPoint;

/// A missile as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Missile {
    pub id: String,
    /// Impact point; the blast zone is centred here.
    pub destination: GeoPoint,
    pub current_location: GeoPoint,
    /// Blast radius in meters.
    pub radius: f64,
    pub missile_type: String,
    pub status: MissileStatus,
    pub sent_by_username: String,
}

/// A loot drop as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loot {
    pub id: String,
    pub location: GeoPoint,
    pub rarity: Rarity,
}

/// A landmine as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmine {
    pub id: String,
    pub location: GeoPoint,
    pub placed_by_username: String,
}

/// One complete feed update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    #[serde(default)]
    pub missiles: Vec<Missile>,
    #[serde(default)]
    pub loot: Vec<Loot>,
    #[serde(default)]
    pub landmines: Vec<Landmine>,
}

impl EntitySnapshot {
    /// Total number of entities across all kinds.
    pub fn len(&self) -> usize {
        self.missiles.len() + self.loot.len() + self.landmines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the ids of every entity in the snapshot.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.missiles
            .iter()
            .map(|m| m.id.as_str())
            .chain(self.loot.iter().map(|l| l.id.as_str()))
            .chain(self.landmines.iter().map(|l| l.id.as_str()))
    }
}
