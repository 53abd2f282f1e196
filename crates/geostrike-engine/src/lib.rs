//! Proximity and damage engine for GEOSTRIKE.
//!
//! Owns the latest entity snapshot (as a hecs world), classifies every entity
//! against the player's location on each poll, and drives notifications,
//! damage-over-time sessions and loot pickups. Completely headless: all I/O
//! goes through the collaborator traits, enabling deterministic testing.

pub mod authority;
pub mod collaborators;
pub mod damage;
pub mod engine;
pub mod ledger;
pub mod loot;
pub mod proximity;
pub mod systems;
pub mod vitals;

pub use engine::{CycleReport, ProximityEngine};
pub use geostrike_core as core;

#[cfg(test)]
mod tests;
