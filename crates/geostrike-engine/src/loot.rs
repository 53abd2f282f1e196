//! Loot rolls and reward application.

use log::info;
use rand::Rng;

use geostrike_core::config::EngineConfig;
use geostrike_core::constants::GOOD_LOOT;
use geostrike_core::enums::Rarity;
use geostrike_core::types::RewardItem;

use crate::authority::Authority;
use crate::vitals::PlayerVitals;

/// Roll for a special reward.
///
/// Draws `chance` uniformly in [0, 100); below the rarity's threshold a
/// uniformly random entry of `GOOD_LOOT` is returned.
pub fn roll_loot<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> Option<RewardItem> {
    let chance = rng.gen::<f64>() * 100.0;
    if chance >= rarity.reward_chance() {
        return None;
    }
    let pick = rng.gen::<f64>() * GOOD_LOOT.len() as f64;
    let index = (pick as usize).min(GOOD_LOOT.len() - 1);
    let (name, category) = GOOD_LOOT[index];
    Some(RewardItem::new(name, category))
}

/// What a single pickup granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootGrant {
    pub health_restored: i32,
    pub currency: u32,
    /// Item added to inventory (never a currency-category reward).
    pub item: Option<RewardItem>,
}

/// Apply a pickup: flat health and currency always; a rolled item goes to
/// the inventory, except currency-category rewards which add the larger
/// currency bonus instead.
pub fn apply_loot_reward(
    reward: Option<RewardItem>,
    config: &EngineConfig,
    vitals: &mut PlayerVitals,
    authority: &mut Authority,
) -> LootGrant {
    let health_restored = vitals.restore(config.loot_health_restore, authority);
    let mut currency = config.loot_currency_baseline;

    let item = match reward {
        Some(reward) if reward.is_currency() => {
            currency += config.loot_currency_bonus;
            None
        }
        Some(reward) => {
            authority.add_inventory_item(&reward.name, &reward.category);
            Some(reward)
        }
        None => None,
    };

    if currency > 0 {
        authority.add_currency(currency);
    }
    info!(
        "loot granted: +{health_restored} health, +{currency} coins{}",
        item.as_ref()
            .map(|i| format!(", {} ({})", i.name, i.category))
            .unwrap_or_default()
    );
    LootGrant {
        health_restored,
        currency,
        item,
    }
}
