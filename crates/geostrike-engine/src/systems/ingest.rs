//! Snapshot ingestion: replace the world with the latest feed snapshot.

use std::collections::HashSet;

use hecs::World;
use log::debug;

use geostrike_core::components::{ArmedLandmine, EntityKey, LootDrop, MissileBlast};
use geostrike_core::enums::EntityClass;
use geostrike_core::snapshot::EntitySnapshot;

use super::ConsumedSet;

/// Clear the world and spawn one entity per feed entity.
///
/// Entries in `consumed` (picked up or triggered locally, still echoed by a
/// lagging feed) are skipped. Entries that no longer appear in the snapshot
/// are forgotten, since the server has caught up. Ids are only unique within
/// one kind, so every lookup is per kind.
pub fn run(world: &mut World, snapshot: EntitySnapshot, consumed: &mut ConsumedSet) {
    world.clear();

    let present: HashSet<(EntityClass, &str)> = snapshot
        .missiles
        .iter()
        .map(|m| (EntityClass::Missile, m.id.as_str()))
        .chain(snapshot.loot.iter().map(|l| (EntityClass::Loot, l.id.as_str())))
        .chain(
            snapshot
                .landmines
                .iter()
                .map(|l| (EntityClass::Landmine, l.id.as_str())),
        )
        .collect();
    consumed.retain(|(class, id)| present.contains(&(*class, id.as_str())));
    let is_consumed = |class: EntityClass, id: &str| consumed.contains(&(class, id.to_string()));

    let mut spawned = 0usize;
    for missile in snapshot.missiles {
        if is_consumed(EntityClass::Missile, &missile.id) {
            continue;
        }
        world.spawn((
            EntityKey(missile.id),
            missile.destination,
            MissileBlast {
                radius_m: missile.radius,
                missile_type: missile.missile_type,
                status: missile.status,
                sent_by: missile.sent_by_username,
            },
        ));
        spawned += 1;
    }
    for loot in snapshot.loot {
        if is_consumed(EntityClass::Loot, &loot.id) {
            continue;
        }
        world.spawn((
            EntityKey(loot.id),
            loot.location,
            LootDrop {
                rarity: loot.rarity,
            },
        ));
        spawned += 1;
    }
    for landmine in snapshot.landmines {
        if is_consumed(EntityClass::Landmine, &landmine.id) {
            continue;
        }
        world.spawn((
            EntityKey(landmine.id),
            landmine.location,
            ArmedLandmine {
                placed_by: landmine.placed_by_username,
            },
        ));
        spawned += 1;
    }
    debug!(
        "snapshot ingested: {spawned} entities, {} suppressed",
        consumed.len()
    );
}
