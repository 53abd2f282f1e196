//! Engine constants and tuning parameters.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// --- Proximity ---

/// Extra distance beyond an entity's radius that still counts as "near" (meters).
pub const NEAR_MARGIN_M: f64 = 2.0;

/// Reference radius for entities without their own radius (loot, landmines).
pub const FIXED_ENTITY_RADIUS_M: f64 = 10.0;

// --- Scheduling ---

/// Interval between location polls (milliseconds).
pub const POLL_INTERVAL_MS: u64 = 1_000;

/// Delay between a missile hit and its first damage tick (milliseconds).
pub const MISSILE_INITIAL_DELAY_MS: u64 = 30_000;

/// Landmines detonate immediately.
pub const LANDMINE_INITIAL_DELAY_MS: u64 = 0;

/// Interval between successive damage ticks (milliseconds).
pub const DAMAGE_TICK_INTERVAL_MS: u64 = 30_000;

// --- Damage ---

/// Health removed per tick while caught in a missile blast.
pub const MISSILE_DAMAGE_PER_TICK: i32 = 40;

/// Health removed per tick after stepping on a landmine.
pub const LANDMINE_DAMAGE_PER_TICK: i32 = 50;

// --- Vitals ---

/// Maximum (and respawn) health.
pub const MAX_HEALTH: i32 = 100;

// --- Loot ---

/// Health restored on every loot pickup (capped at MAX_HEALTH).
pub const LOOT_HEALTH_RESTORE: i32 = 200;

/// Currency granted on every loot pickup.
pub const LOOT_CURRENCY_BASELINE: u32 = 250;

/// Extra currency granted when the rolled reward is of the currency category.
pub const LOOT_CURRENCY_BONUS: u32 = 1_000;

/// Reward category that converts into currency rather than an inventory item.
pub const CURRENCY_CATEGORY: &str = "Currency";

/// Percent chance of a special reward per rarity.
pub const LOOT_CHANCE_COMMON: f64 = 20.0;
pub const LOOT_CHANCE_UNCOMMON: f64 = 30.0;
pub const LOOT_CHANCE_RARE: f64 = 50.0;

/// Fixed table of rewards a successful roll may produce: (name, category).
pub const GOOD_LOOT: [(&str, &str); 8] = [
    ("Amplifier", "Missiles"),
    ("Ballista", "Missiles"),
    ("Thunderbolt", "Missiles"),
    ("BunkerBlocker", "Landmines"),
    ("BigBertha", "Landmines"),
    ("Shield", "Other"),
    ("LootDrop", "Loot Drops"),
    ("Coins", CURRENCY_CATEGORY),
];

// --- Determinism ---

/// Default RNG seed for loot rolls.
pub const DEFAULT_RNG_SEED: u64 = 42;
