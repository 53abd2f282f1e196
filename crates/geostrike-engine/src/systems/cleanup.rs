//! Cleanup system: despawn entities consumed this cycle.

use hecs::{Entity, World};

use geostrike_core::enums::EntityClass;

use super::ConsumedSet;

/// Despawn each buffered entity and remember its kind and feed id so a lagging
/// snapshot cannot resurrect it. Uses a caller-owned buffer to avoid
/// per-cycle allocation.
pub fn run(
    world: &mut World,
    despawn_buffer: &mut Vec<(Entity, EntityClass, String)>,
    consumed: &mut ConsumedSet,
) {
    for (entity, class, id) in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
        consumed.insert((class, id));
    }
}
