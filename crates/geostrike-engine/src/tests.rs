//! Tests for the engine: polling, damage sessions, loot and the ledger,
//! driven through recording fakes of every collaborator.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use geostrike_core::config::EngineConfig;
use geostrike_core::enums::*;
use geostrike_core::error::{ApiError, ApiResult, ConfigError, LocationError};
use geostrike_core::events::SessionEvent;
use geostrike_core::geo::offset_north;
use geostrike_core::snapshot::{EntitySnapshot, Landmine, Loot, Missile};
use geostrike_core::types::{GeoPoint, PlayerVitalState, RewardItem};

use crate::authority::Authority;
use crate::collaborators::*;
use crate::damage::{DamageEngine, DamageRequest, DamageSource, StartOutcome};
use crate::engine::{ProximityEngine, SkipReason};
use crate::loot::apply_loot_reward;
use crate::vitals::PlayerVitals;

// ---- Fakes ----

#[derive(Debug, Clone, PartialEq)]
enum StoreCall {
    SetHealth(i32),
    RemoveHealth(i32),
    AddHealth(i32),
    SetAlive(bool),
    AddCurrency(u32),
    AddInventoryItem(String, String),
    ConsumeEntity(String),
}

#[derive(Clone, Default)]
struct RecordingStore {
    calls: Arc<Mutex<Vec<StoreCall>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingStore {
    fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn record(&self, call: StoreCall) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        if *self.fail.lock().unwrap() {
            Err(ApiError::Transport("connection reset".into()))
        } else {
            Ok(())
        }
    }
}

impl AuthoritativeStore for RecordingStore {
    fn set_health(&mut self, _token: &str, value: i32) -> ApiResult<()> {
        self.record(StoreCall::SetHealth(value))
    }
    fn remove_health(&mut self, _token: &str, amount: i32) -> ApiResult<()> {
        self.record(StoreCall::RemoveHealth(amount))
    }
    fn add_health(&mut self, _token: &str, amount: i32) -> ApiResult<()> {
        self.record(StoreCall::AddHealth(amount))
    }
    fn set_alive(&mut self, _token: &str, alive: bool) -> ApiResult<()> {
        self.record(StoreCall::SetAlive(alive))
    }
    fn add_currency(&mut self, _token: &str, amount: u32) -> ApiResult<()> {
        self.record(StoreCall::AddCurrency(amount))
    }
    fn add_inventory_item(&mut self, _token: &str, item_name: &str, category: &str) -> ApiResult<()> {
        self.record(StoreCall::AddInventoryItem(item_name.into(), category.into()))
    }
    fn consume_entity(&mut self, entity_id: &str) -> ApiResult<()> {
        self.record(StoreCall::ConsumeEntity(entity_id.into()))
    }
}

#[derive(Clone)]
struct FakeLocation(Arc<Mutex<Result<GeoPoint, LocationError>>>);

impl FakeLocation {
    fn at(point: GeoPoint) -> Self {
        Self(Arc::new(Mutex::new(Ok(point))))
    }

    fn set(&self, value: Result<GeoPoint, LocationError>) {
        *self.0.lock().unwrap() = value;
    }
}

impl LocationSource for FakeLocation {
    fn current_location(&mut self) -> Result<GeoPoint, LocationError> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier(Arc<Mutex<Vec<(String, String)>>>);

impl RecordingNotifier {
    fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&mut self, title: &str, body: &str) {
        self.0.lock().unwrap().push((title.into(), body.into()));
    }
}

// ---- Harness ----

const PLAYER: GeoPoint = GeoPoint {
    latitude: 40.7484,
    longitude: -73.9857,
};

struct Harness {
    engine: ProximityEngine,
    store: RecordingStore,
    location: FakeLocation,
    notifier: RecordingNotifier,
    cache: MemoryVitalsCache,
    calendar: ManualCalendar,
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn harness_with(config: EngineConfig, vitals: PlayerVitalState) -> Harness {
    let store = RecordingStore::default();
    let location = FakeLocation::at(PLAYER);
    let notifier = RecordingNotifier::default();
    let cache = MemoryVitalsCache::with_state(vitals);
    let calendar = ManualCalendar::new(day(1));
    let mut engine = ProximityEngine::new(
        config,
        Collaborators {
            location: Box::new(location.clone()),
            notifier: Box::new(notifier.clone()),
            store: Box::new(store.clone()),
            cache: Box::new(cache.clone()),
            calendar: Box::new(calendar.clone()),
        },
    )
    .unwrap();
    engine.queue_event(SessionEvent::SetAuthToken {
        token: Some("token-1".into()),
    });
    Harness {
        engine,
        store,
        location,
        notifier,
        cache,
        calendar,
    }
}

fn harness() -> Harness {
    let config = EngineConfig {
        username: "me".into(),
        ..Default::default()
    };
    harness_with(config, PlayerVitalState::default())
}

fn hit_missile(id: &str, meters: f64) -> Missile {
    let at = offset_north(PLAYER, meters);
    Missile {
        id: id.into(),
        destination: at,
        current_location: at,
        radius: 100.0,
        missile_type: "Ballista".into(),
        status: MissileStatus::Hit,
        sent_by_username: "enemy".into(),
    }
}

fn loot(id: &str, meters: f64, rarity: Rarity) -> Loot {
    Loot {
        id: id.into(),
        location: offset_north(PLAYER, meters),
        rarity,
    }
}

fn landmine(id: &str, meters: f64, placed_by: &str) -> Landmine {
    Landmine {
        id: id.into(),
        location: offset_north(PLAYER, meters),
        placed_by_username: placed_by.into(),
    }
}

fn snapshot(missiles: Vec<Missile>, loot: Vec<Loot>, landmines: Vec<Landmine>) -> SessionEvent {
    SessionEvent::Snapshot {
        snapshot: EntitySnapshot {
            missiles,
            loot,
            landmines,
        },
    }
}

fn poll(h: &mut Harness, now_ms: u64) -> crate::engine::CycleReport {
    h.engine.queue_event(SessionEvent::Poll);
    h.engine.advance(now_ms)
}

// ---- Input unavailable ----

#[test]
fn test_poll_before_snapshot_is_skipped() {
    let mut h = harness();
    let report = poll(&mut h, 0);
    assert_eq!(report.skipped, Some(SkipReason::NoSnapshot));
    assert_eq!(report.evaluations, 0);
    assert!(report.alerts.is_empty());
}

#[test]
fn test_location_failure_skips_cycle() {
    let mut h = harness();
    h.engine.queue_event(snapshot(vec![hit_missile("m1", 10.0)], vec![], vec![]));
    h.location.set(Err(LocationError::PermissionDenied));
    let report = poll(&mut h, 0);
    assert_eq!(report.skipped, Some(SkipReason::NoLocation));
    assert_eq!(h.engine.damage_phase(), DamagePhase::Idle);

    h.location.set(Ok(GeoPoint::new(f64::NAN, 1.0)));
    let report = poll(&mut h, 1_000);
    assert_eq!(report.skipped, Some(SkipReason::InvalidLocation));

    h.location.set(Ok(PLAYER));
    let report = poll(&mut h, 2_000);
    assert_eq!(report.skipped, None);
    assert_eq!(report.evaluations, 1);
    assert_eq!(h.engine.last_location(), Some(PLAYER));
}

#[test]
fn test_malformed_entity_is_safe() {
    let mut h = harness();
    let mut bad = hit_missile("m1", 0.0);
    bad.destination = GeoPoint::new(f64::NAN, 0.0);
    h.engine.queue_event(snapshot(vec![bad], vec![], vec![]));
    let report = poll(&mut h, 0);
    assert_eq!(report.readings.len(), 1);
    assert_eq!(report.readings[0].tier, ProximityTier::Safe);
    assert_eq!(h.engine.damage_phase(), DamagePhase::Idle);
}

// ---- Classification through the engine ----

#[test]
fn test_readings_report_tiers() {
    let mut h = harness();
    h.engine.queue_event(snapshot(
        vec![hit_missile("within", 50.0), hit_missile("near", 101.0), hit_missile("safe", 200.0)],
        vec![],
        vec![],
    ));
    let report = poll(&mut h, 0);
    let tier_of = |id: &str| {
        report
            .readings
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.tier)
            .unwrap()
    };
    assert_eq!(tier_of("within"), ProximityTier::Within);
    assert_eq!(tier_of("near"), ProximityTier::Near);
    assert_eq!(tier_of("safe"), ProximityTier::Safe);
}

#[test]
fn test_snapshot_replaces_world() {
    let mut h = harness();
    h.engine.queue_event(snapshot(
        vec![hit_missile("m1", 500.0)],
        vec![loot("l1", 500.0, Rarity::Common)],
        vec![],
    ));
    h.engine.advance(0);
    assert_eq!(h.engine.entity_count(), 2);
    h.engine.queue_event(snapshot(vec![], vec![], vec![landmine("d1", 500.0, "x")]));
    h.engine.advance(0);
    assert_eq!(h.engine.entity_count(), 1);
}

// ---- Notification ledger ----

#[test]
fn test_notifications_once_per_class_per_day() {
    let mut h = harness();
    h.engine.queue_event(snapshot(
        vec![hit_missile("m1", 101.0)],
        vec![loot("l1", 11.0, Rarity::Common), loot("l2", 11.5, Rarity::Rare)],
        vec![landmine("d1", 11.0, "enemy")],
    ));
    let report = poll(&mut h, 0);
    // One per class even with two loot drops nearby.
    assert_eq!(report.notifications.len(), 3);
    assert_eq!(h.notifier.count(), 3);

    let report = poll(&mut h, 1_000);
    assert!(report.notifications.is_empty());

    h.calendar.set(day(2));
    let report = poll(&mut h, 2_000);
    assert_eq!(report.notifications.len(), 3);
    assert_eq!(h.notifier.count(), 6);
}

#[test]
fn test_safe_entities_do_not_notify() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![hit_missile("m1", 5_000.0)], vec![], vec![]));
    let report = poll(&mut h, 0);
    assert!(report.notifications.is_empty());
    assert_eq!(h.engine.ledger().last_notified(EntityClass::Missile), None);
}

// ---- Damage sessions ----

#[test]
fn test_missile_hit_schedules_damage_after_delay() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![hit_missile("m1", 50.0)], vec![], vec![]));
    let report = poll(&mut h, 0);
    assert_eq!(report.damage_phase, DamagePhase::Scheduled);
    assert_eq!(report.damage_ticks, 0);
    assert_eq!(h.engine.next_wakeup_ms(), Some(30_000));

    let report = h.engine.advance(29_999);
    assert_eq!(report.damage_ticks, 0);
    assert_eq!(report.vitals.health, 100);

    let report = h.engine.advance(30_000);
    assert_eq!(report.damage_ticks, 1);
    assert_eq!(report.damage_phase, DamagePhase::Ticking);
    assert_eq!(report.vitals.health, 60);
    assert_eq!(report.alerts[0].message, "You have taken 40 damage");
    assert!(h.store.calls().contains(&StoreCall::RemoveHealth(40)));
    assert_eq!(h.cache.get().unwrap().health, 60);
    assert_eq!(h.engine.next_wakeup_ms(), Some(60_000));
}

#[test]
fn test_incoming_missile_never_damages() {
    let mut h = harness();
    let mut m = hit_missile("m1", 10.0);
    m.status = MissileStatus::Incoming;
    h.engine.queue_event(snapshot(vec![m], vec![], vec![]));
    let report = poll(&mut h, 0);
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.damage_phase, DamagePhase::Idle);
    assert_eq!(
        h.notifier.0.lock().unwrap()[0],
        (
            "Incoming missile".to_string(),
            "A Ballista from enemy is nearby".to_string()
        )
    );
}

#[test]
fn test_reobserving_within_keeps_one_session() {
    let mut h = harness();
    h.engine.queue_event(snapshot(
        vec![hit_missile("m1", 10.0), hit_missile("m2", 20.0)],
        vec![],
        vec![],
    ));
    for i in 0..30u64 {
        poll(&mut h, i * 1_000);
    }
    assert_eq!(h.engine.damage_session().unwrap().id, 0);

    // A single schedule: one tick at 30 s, not one per observation.
    h.engine.queue_event(SessionEvent::Poll);
    let report = h.engine.advance(30_000);
    assert_eq!(report.damage_ticks, 1);
    assert_eq!(report.vitals.health, 60);
    let removes = h
        .store
        .calls()
        .iter()
        .filter(|c| matches!(c, StoreCall::RemoveHealth(_)))
        .count();
    assert_eq!(removes, 1);
}

#[test]
fn test_leaving_blast_zone_does_not_cancel() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![hit_missile("m1", 10.0)], vec![], vec![]));
    poll(&mut h, 0);
    h.location.set(Ok(offset_north(PLAYER, 10_000.0)));
    poll(&mut h, 1_000);
    let report = h.engine.advance(30_000);
    assert_eq!(report.damage_ticks, 1);
    assert_eq!(report.vitals.health, 60);
}

#[test]
fn test_damage_until_death() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![hit_missile("m1", 10.0)], vec![], vec![]));
    poll(&mut h, 0);
    // Ticks at 30, 60 and 90 s: 100 -> 60 -> 20 -> dead.
    let report = h.engine.advance(90_000);
    assert_eq!(report.damage_ticks, 3);
    assert_eq!(report.damage_phase, DamagePhase::Terminated);
    assert_eq!(report.vitals, PlayerVitalState { is_alive: false, health: 0 });
    let deaths: Vec<_> = report
        .alerts
        .iter()
        .filter(|a| a.level == AlertLevel::Critical)
        .collect();
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].message, "You have been killed by enemy's Ballista");
    assert_eq!(deaths[0].at_ms, 90_000);
    assert!(h.store.calls().ends_with(&[StoreCall::SetHealth(0), StoreCall::SetAlive(false)]));
    assert_eq!(h.engine.next_wakeup_ms(), None);

    // Dead players are not damaged again.
    let report = poll(&mut h, 200_000);
    assert_eq!(report.damage_ticks, 0);
    assert_eq!(report.damage_phase, DamagePhase::Terminated);
}

#[test]
fn test_respawn_cancels_and_restores() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![hit_missile("m1", 10.0)], vec![], vec![]));
    poll(&mut h, 0);
    h.engine.advance(30_000);
    h.engine.queue_event(SessionEvent::Respawn);
    let report = h.engine.advance(31_000);
    assert_eq!(report.damage_phase, DamagePhase::Terminated);
    assert_eq!(report.vitals, PlayerVitalState::default());
    assert_eq!(h.engine.next_wakeup_ms(), None);
    assert!(h.store.calls().ends_with(&[StoreCall::SetHealth(100), StoreCall::SetAlive(true)]));

    // The cancelled schedule never fires.
    let report = h.engine.advance(120_000);
    assert_eq!(report.damage_ticks, 0);
}

#[test]
fn test_landmine_detonates_immediately_and_is_consumed() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![], vec![], vec![landmine("d1", 3.0, "enemy")]));
    let report = poll(&mut h, 5_000);
    assert_eq!(report.damage_ticks, 1);
    assert_eq!(report.vitals.health, 50);
    assert!(report
        .alerts
        .iter()
        .any(|a| a.message == "You stepped on a landmine placed by enemy"));
    assert!(h.store.calls().contains(&StoreCall::ConsumeEntity("d1".into())));
    assert_eq!(h.engine.entity_count(), 0);
    assert_eq!(h.engine.next_wakeup_ms(), Some(35_000));

    // Still in the feed (server lag): not triggered again.
    h.engine
        .queue_event(snapshot(vec![], vec![], vec![landmine("d1", 3.0, "enemy")]));
    let report = poll(&mut h, 6_000);
    assert_eq!(report.readings.len(), 0);
}

#[test]
fn test_landmine_waits_while_session_live() {
    let mut h = harness();
    h.engine.queue_event(snapshot(
        vec![hit_missile("m1", 10.0)],
        vec![],
        vec![landmine("d1", 3.0, "enemy")],
    ));
    let report = poll(&mut h, 0);
    assert_eq!(report.damage_phase, DamagePhase::Scheduled);
    assert_eq!(h.engine.damage_session().unwrap().source.class, EntityClass::Missile);
    assert!(!h.store.calls().contains(&StoreCall::ConsumeEntity("d1".into())));
    assert_eq!(h.engine.entity_count(), 2);
}

#[test]
fn test_own_entities_are_ignored() {
    let mut h = harness();
    let mut own = hit_missile("m1", 10.0);
    own.sent_by_username = "me".into();
    h.engine
        .queue_event(snapshot(vec![own], vec![], vec![landmine("d1", 1.0, "me")]));
    let report = poll(&mut h, 0);
    assert!(report.readings.is_empty());
    assert!(report.notifications.is_empty());
    assert_eq!(report.damage_phase, DamagePhase::Idle);
}

// ---- Loot ----

#[test]
fn test_loot_pickup_grants_flat_reward() {
    let config = EngineConfig {
        username: "me".into(),
        ..Default::default()
    };
    let mut h = harness_with(config, PlayerVitalState { is_alive: true, health: 30 });
    h.engine
        .queue_event(snapshot(vec![], vec![loot("l1", 2.0, Rarity::Common)], vec![]));
    let report = poll(&mut h, 0);
    assert_eq!(report.vitals.health, 100);
    let calls = h.store.calls();
    assert!(calls.contains(&StoreCall::AddHealth(70)));
    assert!(calls.contains(&StoreCall::ConsumeEntity("l1".into())));
    assert!(calls
        .iter()
        .any(|c| matches!(c, StoreCall::AddCurrency(n) if *n >= 250)));
    assert_eq!(h.engine.entity_count(), 0);
    assert!(report.alerts.iter().any(|a| a.level == AlertLevel::Info));
}

#[test]
fn test_consumed_loot_suppressed_until_feed_catches_up() {
    let mut h = harness();
    let with_loot = || snapshot(vec![], vec![loot("l1", 2.0, Rarity::Rare)], vec![]);
    h.engine.queue_event(with_loot());
    poll(&mut h, 0);

    h.engine.queue_event(with_loot());
    let report = poll(&mut h, 1_000);
    assert!(report.readings.is_empty());

    // Feed drops it, then a new drop with the same id appears.
    h.engine.queue_event(snapshot(vec![], vec![], vec![]));
    poll(&mut h, 2_000);
    h.engine.queue_event(with_loot());
    let report = poll(&mut h, 3_000);
    assert_eq!(report.readings.len(), 1);
    let consumes = h
        .store
        .calls()
        .iter()
        .filter(|c| **c == StoreCall::ConsumeEntity("l1".into()))
        .count();
    assert_eq!(consumes, 2);
}

#[test]
fn test_consumed_id_does_not_hide_other_kind() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![], vec![loot("x1", 1.0, Rarity::Common)], vec![]));
    poll(&mut h, 0);
    assert!(h.store.calls().contains(&StoreCall::ConsumeEntity("x1".into())));

    // The feed still echoes loot "x1" and now also has a missile "x1".
    h.engine.queue_event(snapshot(
        vec![hit_missile("x1", 5.0)],
        vec![loot("x1", 1.0, Rarity::Common)],
        vec![],
    ));
    let report = poll(&mut h, 1_000);
    assert_eq!(report.readings.len(), 1);
    assert_eq!(report.readings[0].class, EntityClass::Missile);
    assert_eq!(report.damage_phase, DamagePhase::Scheduled);
    assert_eq!(h.engine.entity_count(), 1);
}

#[test]
fn test_dead_player_does_not_pick_up_loot() {
    let config = EngineConfig::default();
    let mut h = harness_with(config, PlayerVitalState { is_alive: false, health: 0 });
    h.engine
        .queue_event(snapshot(vec![], vec![loot("l1", 2.0, Rarity::Rare)], vec![]));
    let report = poll(&mut h, 0);
    assert_eq!(report.readings[0].tier, ProximityTier::Within);
    assert_eq!(report.notifications.len(), 1);
    assert!(h.store.calls().is_empty());
    assert_eq!(h.engine.entity_count(), 1);
}

#[test]
fn test_currency_reward_skips_inventory() {
    let store = RecordingStore::default();
    let mut authority = Authority::new(Box::new(store.clone()));
    authority.set_token(Some("t".into()));
    let mut vitals = PlayerVitals::load(Box::new(MemoryVitalsCache::new()), 100);
    let config = EngineConfig::default();

    let grant = apply_loot_reward(
        Some(RewardItem::new("Coins", "Currency")),
        &config,
        &mut vitals,
        &mut authority,
    );
    assert_eq!(grant.currency, 1_250);
    assert_eq!(grant.item, None);
    assert_eq!(store.calls(), vec![StoreCall::AddCurrency(1_250)]);
}

#[test]
fn test_item_reward_goes_to_inventory() {
    let store = RecordingStore::default();
    let mut authority = Authority::new(Box::new(store.clone()));
    authority.set_token(Some("t".into()));
    let mut vitals = PlayerVitals::load(
        Box::new(MemoryVitalsCache::with_state(PlayerVitalState { is_alive: true, health: 50 })),
        100,
    );
    let config = EngineConfig::default();

    let grant = apply_loot_reward(
        Some(RewardItem::new("Shield", "Other")),
        &config,
        &mut vitals,
        &mut authority,
    );
    assert_eq!(grant.currency, 250);
    assert_eq!(grant.health_restored, 50);
    assert_eq!(grant.item, Some(RewardItem::new("Shield", "Other")));
    assert_eq!(
        store.calls(),
        vec![
            StoreCall::AddHealth(50),
            StoreCall::AddInventoryItem("Shield".into(), "Other".into()),
            StoreCall::AddCurrency(250),
        ]
    );
}

// ---- Authoritative write failures ----

#[test]
fn test_missing_token_skips_writes_but_state_advances() {
    let mut h = harness();
    h.engine.queue_event(SessionEvent::SetAuthToken { token: None });
    h.engine
        .queue_event(snapshot(vec![], vec![], vec![landmine("d1", 1.0, "enemy")]));
    let report = poll(&mut h, 0);
    assert_eq!(report.vitals.health, 50);
    // Only the token-free entity removal reached the store.
    assert_eq!(h.store.calls(), vec![StoreCall::ConsumeEntity("d1".into())]);
}

#[test]
fn test_store_failure_is_not_rolled_back() {
    let mut h = harness();
    h.store.set_failing(true);
    h.engine
        .queue_event(snapshot(vec![], vec![], vec![landmine("d1", 1.0, "enemy")]));
    let report = poll(&mut h, 0);
    assert_eq!(report.vitals.health, 50);
    assert_eq!(h.cache.get().unwrap().health, 50);
    assert!(h.store.calls().contains(&StoreCall::RemoveHealth(50)));
}

// ---- Damage engine in isolation ----

fn isolated(health: i32) -> (DamageEngine, PlayerVitals, Authority, RecordingStore) {
    let store = RecordingStore::default();
    let mut authority = Authority::new(Box::new(store.clone()));
    authority.set_token(Some("t".into()));
    let vitals = PlayerVitals::load(
        Box::new(MemoryVitalsCache::with_state(PlayerVitalState { is_alive: true, health })),
        100,
    );
    (DamageEngine::new(), vitals, authority, store)
}

fn request(damage: i32) -> DamageRequest {
    DamageRequest {
        source: DamageSource {
            class: EntityClass::Missile,
            entity_id: "m1".into(),
            attacker: "enemy".into(),
            weapon: "Ballista".into(),
        },
        damage_per_tick: damage,
        initial_delay_ms: 0,
        tick_interval_ms: 30_000,
    }
}

#[test]
fn test_session_forty_health_thirty_per_tick() {
    let (mut damage, mut vitals, mut authority, _store) = isolated(40);
    let mut alerts = Vec::new();
    assert_eq!(damage.phase(), DamagePhase::Idle);
    assert_eq!(damage.start(request(30), 0, vitals.health()), StartOutcome::Started(0));
    assert_eq!(damage.session().unwrap().remaining_health_at_start, 40);

    assert_eq!(damage.run_due(0, &mut vitals, &mut authority, &mut alerts), 1);
    assert_eq!(vitals.health(), 10);
    assert!(vitals.is_alive());
    assert!(alerts.iter().all(|a| a.level != AlertLevel::Critical));

    assert_eq!(damage.run_due(30_000, &mut vitals, &mut authority, &mut alerts), 1);
    assert_eq!(vitals.state(), PlayerVitalState { is_alive: false, health: 0 });
    let deaths = alerts.iter().filter(|a| a.level == AlertLevel::Critical).count();
    assert_eq!(deaths, 1);
    assert_eq!(damage.phase(), DamagePhase::Terminated);
    assert_eq!(damage.next_due_ms(), None);
    assert_eq!(damage.run_due(1_000_000, &mut vitals, &mut authority, &mut alerts), 0);
}

#[test]
fn test_second_start_while_live_is_dropped() {
    let (mut damage, mut vitals, mut authority, _store) = isolated(100);
    let mut alerts = Vec::new();
    assert_eq!(damage.start(request(10), 0, 100), StartOutcome::Started(0));
    damage.run_due(0, &mut vitals, &mut authority, &mut alerts);
    assert_eq!(damage.phase(), DamagePhase::Ticking);
    assert_eq!(damage.start(request(10), 5_000, 90), StartOutcome::AlreadyActive(0));
    assert_eq!(damage.next_due_ms(), Some(30_000));

    // After termination a new session may start.
    assert!(damage.cancel());
    assert!(!damage.cancel());
    assert_eq!(damage.start(request(10), 40_000, 90), StartOutcome::Started(1));
}

#[test]
fn test_catch_up_applies_each_missed_tick() {
    let (mut damage, mut vitals, mut authority, _store) = isolated(100);
    let mut alerts = Vec::new();
    damage.start(request(10), 0, 100);
    let ticks = damage.run_due(95_000, &mut vitals, &mut authority, &mut alerts);
    // Due at 0, 30, 60 and 90 s.
    assert_eq!(ticks, 4);
    assert_eq!(vitals.health(), 60);
    let stamps: Vec<u64> = alerts.iter().map(|a| a.at_ms).collect();
    assert_eq!(stamps, vec![0, 30_000, 60_000, 90_000]);
}

#[test]
fn test_late_advance_ticks_before_respawn() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![hit_missile("m1", 10.0)], vec![], vec![]));
    poll(&mut h, 0);

    // Tick was due at 30 s; the respawn only arrives with the 45 s advance.
    h.engine.queue_event(SessionEvent::Respawn);
    let report = h.engine.advance(45_000);
    assert_eq!(report.damage_ticks, 1);
    let messages: Vec<(&str, u64)> = report
        .alerts
        .iter()
        .map(|a| (a.message.as_str(), a.at_ms))
        .collect();
    assert_eq!(
        messages,
        vec![("You have taken 40 damage", 30_000), ("You have respawned", 45_000)]
    );
    assert_eq!(report.vitals, PlayerVitalState::default());
    assert_eq!(report.damage_phase, DamagePhase::Terminated);
    assert!(h.store.calls().ends_with(&[
        StoreCall::RemoveHealth(40),
        StoreCall::SetHealth(100),
        StoreCall::SetAlive(true),
    ]));
}

// ---- Configuration ----

#[test]
fn test_engine_rejects_invalid_config() {
    let config = EngineConfig {
        missile_damage_per_tick: -40,
        ..Default::default()
    };
    let result = ProximityEngine::new(
        config,
        Collaborators {
            location: Box::new(FakeLocation::at(PLAYER)),
            notifier: Box::new(RecordingNotifier::default()),
            store: Box::new(RecordingStore::default()),
            cache: Box::new(MemoryVitalsCache::new()),
            calendar: Box::new(ManualCalendar::new(day(1))),
        },
    );
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "missile_damage_per_tick",
            ..
        })
    ));
}

#[test]
fn test_huge_restore_caps_at_max_health() {
    let store = RecordingStore::default();
    let mut authority = Authority::new(Box::new(store.clone()));
    authority.set_token(Some("t".into()));
    let cache = MemoryVitalsCache::with_state(PlayerVitalState {
        is_alive: true,
        health: 30,
    });
    let mut vitals = PlayerVitals::load(Box::new(cache), 100);

    assert_eq!(vitals.restore(i32::MAX, &mut authority), 70);
    assert_eq!(vitals.health(), 100);
    assert_eq!(store.calls(), vec![StoreCall::AddHealth(70)]);
}

// ---- Shutdown ----

#[test]
fn test_shutdown_stops_everything() {
    let mut h = harness();
    h.engine
        .queue_event(snapshot(vec![hit_missile("m1", 10.0)], vec![], vec![]));
    poll(&mut h, 0);
    h.engine.queue_events([SessionEvent::Shutdown, SessionEvent::Poll]);
    let report = h.engine.advance(10_000);
    assert!(report.shut_down);
    assert_eq!(report.damage_ticks, 0);
    assert_eq!(report.evaluations, 0);
    assert!(h.engine.is_shut_down());
    assert_eq!(h.engine.entity_count(), 0);

    // The pending tick never fires.
    let report = h.engine.advance(60_000);
    assert_eq!(report.damage_ticks, 0);
    assert_eq!(h.engine.next_wakeup_ms(), None);
}
