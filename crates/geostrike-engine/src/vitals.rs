//! Player vitals: the single writer of health and liveness.
//!
//! Reads come from the local cache; every mutation updates the cache first
//! and then writes through to the authoritative store. Only the damage engine,
//! loot rewards and the respawn flow call the mutating methods.

use log::{info, warn};

use geostrike_core::types::PlayerVitalState;

use crate::authority::Authority;
use crate::collaborators::VitalsCache;

/// Result of applying one damage tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Still alive with this much health.
    Damaged { health: i32 },
    /// Health reached zero on this tick.
    Killed,
    /// Already dead; nothing applied.
    AlreadyDead,
}

pub struct PlayerVitals {
    state: PlayerVitalState,
    max_health: i32,
    cache: Box<dyn VitalsCache>,
}

impl PlayerVitals {
    /// Restore vitals from the cache, falling back to full health.
    pub fn load(mut cache: Box<dyn VitalsCache>, max_health: i32) -> Self {
        let state = match cache.load() {
            Ok(Some(mut cached)) => {
                cached.health = cached.health.clamp(0, max_health);
                cached
            }
            Ok(None) => PlayerVitalState {
                is_alive: true,
                health: max_health,
            },
            Err(e) => {
                warn!("vitals cache unreadable, assuming full health: {e}");
                PlayerVitalState {
                    is_alive: true,
                    health: max_health,
                }
            }
        };
        Self {
            state,
            max_health,
            cache,
        }
    }

    pub fn state(&self) -> PlayerVitalState {
        self.state
    }

    pub fn health(&self) -> i32 {
        self.state.health
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive
    }

    /// Subtract `amount` health. At zero the player dies: health 0,
    /// `isAlive=false`, both written through.
    pub fn apply_damage(&mut self, amount: i32, authority: &mut Authority) -> DamageOutcome {
        if !self.state.is_alive {
            return DamageOutcome::AlreadyDead;
        }
        let remaining = self.state.health - amount;
        if remaining <= 0 {
            self.state = PlayerVitalState {
                is_alive: false,
                health: 0,
            };
            self.persist();
            authority.set_health(0);
            authority.set_alive(false);
            DamageOutcome::Killed
        } else {
            self.state.health = remaining;
            self.persist();
            authority.remove_health(amount);
            DamageOutcome::Damaged { health: remaining }
        }
    }

    /// Add health, capped at max. Returns the amount actually restored.
    pub fn restore(&mut self, amount: i32, authority: &mut Authority) -> i32 {
        if !self.state.is_alive || amount <= 0 {
            return 0;
        }
        let before = self.state.health;
        self.state.health = before.saturating_add(amount).min(self.max_health);
        let restored = self.state.health - before;
        if restored > 0 {
            self.persist();
            authority.add_health(restored);
        }
        restored
    }

    /// Back to life at full health.
    pub fn respawn(&mut self, authority: &mut Authority) {
        self.state = PlayerVitalState {
            is_alive: true,
            health: self.max_health,
        };
        self.persist();
        authority.set_health(self.max_health);
        authority.set_alive(true);
        info!("player respawned at {} health", self.max_health);
    }

    fn persist(&mut self) {
        if let Err(e) = self.cache.store(&self.state) {
            warn!("failed to cache vitals: {e}");
        }
    }
}
