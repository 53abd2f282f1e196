//! Proximity classification: the single near/within rule used for every
//! entity kind.
//!
//! Pure functions, no ECS dependency.

use geostrike_core::config::EngineConfig;
use geostrike_core::enums::{EntityClass, ProximityTier};
use geostrike_core::geo::distance_meters;
use geostrike_core::types::GeoPoint;

/// Engine-wide distances that define the tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityThresholds {
    /// Added to the entity radius to get the outer edge of `Near`.
    pub near_margin_m: f64,
    /// Radius for kinds that carry none of their own (loot, landmines).
    pub fixed_entity_radius_m: f64,
}

impl ProximityThresholds {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            near_margin_m: config.near_margin_m,
            fixed_entity_radius_m: config.fixed_entity_radius_m,
        }
    }

    /// Radius of the `Within` zone for an entity of this kind.
    /// Only missiles use their own radius.
    pub fn radius_for(&self, class: EntityClass, own_radius_m: Option<f64>) -> f64 {
        match (class, own_radius_m) {
            (EntityClass::Missile, Some(r)) => r,
            _ => self.fixed_entity_radius_m,
        }
    }
}

impl Default for ProximityThresholds {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Classify one entity against the player's location.
///
/// Unusable coordinates or radii classify as `Safe`.
pub fn classify(
    class: EntityClass,
    entity_location: GeoPoint,
    own_radius_m: Option<f64>,
    player_location: GeoPoint,
    thresholds: &ProximityThresholds,
) -> ProximityTier {
    if !entity_location.is_valid() || !player_location.is_valid() {
        return ProximityTier::Safe;
    }
    let radius = thresholds.radius_for(class, own_radius_m);
    let distance = distance_meters(entity_location, player_location);
    tier_at(distance, radius, thresholds.near_margin_m)
}

/// Tier for a known distance: `Within` below the radius, `Near` up to
/// radius + margin, `Safe` beyond (or when any input is NaN).
pub fn tier_at(distance_m: f64, radius_m: f64, near_margin_m: f64) -> ProximityTier {
    if !(distance_m.is_finite() && radius_m.is_finite() && near_margin_m.is_finite()) {
        return ProximityTier::Safe;
    }
    if distance_m < radius_m {
        ProximityTier::Within
    } else if distance_m < radius_m + near_margin_m {
        ProximityTier::Near
    } else {
        ProximityTier::Safe
    }
}
