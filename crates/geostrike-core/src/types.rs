//! Fundamental geographic and player types.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_HEALTH;

/// A point on the Earth's surface in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite coordinates inside [-90, 90] x [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another point in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        crate::geo::distance_meters(*self, *other)
    }
}

/// Player liveness and health as mirrored between the local cache and the
/// authoritative store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerVitalState {
    pub is_alive: bool,
    /// 0..=MAX_HEALTH
    pub health: i32,
}

impl Default for PlayerVitalState {
    fn default() -> Self {
        Self {
            is_alive: true,
            health: MAX_HEALTH,
        }
    }
}

/// A special reward produced by a successful loot roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    pub name: String,
    pub category: String,
}

impl RewardItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }

    pub fn is_currency(&self) -> bool {
        self.category == crate::constants::CURRENCY_CATEGORY
    }
}
