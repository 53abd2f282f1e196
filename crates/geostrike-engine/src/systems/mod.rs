//! ECS systems that operate on the entity world.
//!
//! Systems are plain functions over `&mut World` (or `&World` for read-only).
//! They do not own state; the engine passes in what they need.

pub mod cleanup;
pub mod evaluate;
pub mod ingest;

use std::collections::HashSet;

use geostrike_core::enums::EntityClass;

/// Feed entities consumed locally, keyed by kind and id.
pub type ConsumedSet = HashSet<(EntityClass, String)>;
