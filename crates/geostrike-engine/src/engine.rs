//! Proximity engine: one instance per foreground session.
//!
//! `ProximityEngine` owns the entity world, the notification ledger, the
//! damage session and the player's vitals. Feed snapshots, poll requests and
//! respawns arrive as queued `SessionEvent`s and are consumed serially at the
//! next `advance`, between two passes over due damage ticks. Nothing escapes as
//! an error: external failures degrade to log lines.

use std::collections::VecDeque;

use hecs::{Entity, World};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use geostrike_core::config::EngineConfig;
use geostrike_core::enums::{AlertLevel, DamagePhase, EntityClass, MissileStatus, ProximityTier};
use geostrike_core::error::ConfigError;
use geostrike_core::events::{Alert, Notification, SessionEvent};
use geostrike_core::types::{GeoPoint, PlayerVitalState};

use crate::authority::Authority;
use crate::collaborators::{CalendarClock, Collaborators, LocationSource, NotificationSink};
use crate::damage::{DamageEngine, DamageRequest, DamageSession, DamageSource, StartOutcome};
use crate::ledger::NotificationLedger;
use crate::loot::{apply_loot_reward, roll_loot};
use crate::proximity::ProximityThresholds;
use crate::systems;
use crate::systems::ConsumedSet;
use crate::systems::evaluate::{ObservedKind, Observation};
use crate::vitals::PlayerVitals;

/// Why a poll did not evaluate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// No feed snapshot has arrived yet.
    NoSnapshot,
    /// The location source failed.
    NoLocation,
    /// The location source returned unusable coordinates.
    InvalidLocation,
}

/// One entity's tier as seen by the most recent poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierReading {
    pub id: String,
    pub class: EntityClass,
    pub tier: ProximityTier,
}

/// Everything that happened during one `advance`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub now_ms: u64,
    /// Number of polls that evaluated the world.
    pub evaluations: u32,
    /// Reason the last poll was skipped, if it was.
    pub skipped: Option<SkipReason>,
    /// Tiers from the last evaluated poll.
    pub readings: Vec<TierReading>,
    pub alerts: Vec<Alert>,
    pub notifications: Vec<Notification>,
    /// Damage ticks applied.
    pub damage_ticks: u32,
    pub vitals: PlayerVitalState,
    pub damage_phase: DamagePhase,
    pub shut_down: bool,
}

pub struct ProximityEngine {
    config: EngineConfig,
    thresholds: ProximityThresholds,
    world: World,
    has_snapshot: bool,
    consumed: ConsumedSet,
    despawn_buffer: Vec<(Entity, EntityClass, String)>,
    ledger: NotificationLedger,
    damage: DamageEngine,
    vitals: PlayerVitals,
    authority: Authority,
    rng: ChaCha8Rng,
    event_queue: VecDeque<SessionEvent>,
    location: Box<dyn LocationSource>,
    notifier: Box<dyn NotificationSink>,
    calendar: Box<dyn CalendarClock>,
    alerts: Vec<Alert>,
    notifications: Vec<Notification>,
    last_location: Option<GeoPoint>,
    shut_down: bool,
}

impl ProximityEngine {
    /// Create an engine for a new foreground session. Vitals are restored
    /// from the cache. Fails if `config` does not validate.
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        let Collaborators {
            location,
            notifier,
            store,
            cache,
            calendar,
        } = collaborators;
        let vitals = PlayerVitals::load(cache, config.max_health);
        info!(
            "session started for '{}' (health {}, alive {})",
            config.username,
            vitals.health(),
            vitals.is_alive()
        );
        Ok(Self {
            thresholds: ProximityThresholds::from_config(&config),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            world: World::new(),
            has_snapshot: false,
            consumed: ConsumedSet::new(),
            despawn_buffer: Vec::new(),
            ledger: NotificationLedger::new(),
            damage: DamageEngine::new(),
            vitals,
            authority: Authority::new(store),
            event_queue: VecDeque::new(),
            location,
            notifier,
            calendar,
            alerts: Vec::new(),
            notifications: Vec::new(),
            last_location: None,
            shut_down: false,
        })
    }

    /// Queue an event for processing at the next `advance`.
    pub fn queue_event(&mut self, event: SessionEvent) {
        self.event_queue.push_back(event);
    }

    /// Queue multiple events.
    pub fn queue_events(&mut self, events: impl IntoIterator<Item = SessionEvent>) {
        self.event_queue.extend(events);
    }

    /// Fire damage ticks already due at or before `now_ms`, consume queued
    /// events in order, then fire anything the events made due.
    ///
    /// Queued events carry no timestamp and are taken to arrive at `now_ms`,
    /// so a late `advance` still applies earlier ticks before a respawn or
    /// pickup.
    pub fn advance(&mut self, now_ms: u64) -> CycleReport {
        let mut report = CycleReport {
            now_ms,
            ..Default::default()
        };

        self.run_due_ticks(now_ms, &mut report);
        while !self.shut_down {
            let Some(event) = self.event_queue.pop_front() else {
                break;
            };
            self.handle_event(event, now_ms, &mut report);
        }
        self.run_due_ticks(now_ms, &mut report);

        report.alerts = std::mem::take(&mut self.alerts);
        report.notifications = std::mem::take(&mut self.notifications);
        report.vitals = self.vitals.state();
        report.damage_phase = self.damage.phase();
        report.shut_down = self.shut_down;
        report
    }

    /// Earliest engine time at which a damage tick is pending.
    pub fn next_wakeup_ms(&self) -> Option<u64> {
        self.damage.next_due_ms()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn vitals(&self) -> PlayerVitalState {
        self.vitals.state()
    }

    pub fn damage_phase(&self) -> DamagePhase {
        self.damage.phase()
    }

    pub fn damage_session(&self) -> Option<&DamageSession> {
        self.damage.session()
    }

    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    pub fn last_location(&self) -> Option<GeoPoint> {
        self.last_location
    }

    /// Entities currently in the world.
    pub fn entity_count(&self) -> u32 {
        self.world.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn run_due_ticks(&mut self, now_ms: u64, report: &mut CycleReport) {
        if self.shut_down {
            return;
        }
        report.damage_ticks += self.damage.run_due(
            now_ms,
            &mut self.vitals,
            &mut self.authority,
            &mut self.alerts,
        );
    }

    fn handle_event(&mut self, event: SessionEvent, now_ms: u64, report: &mut CycleReport) {
        match event {
            SessionEvent::Snapshot { snapshot } => {
                systems::ingest::run(&mut self.world, snapshot, &mut self.consumed);
                self.has_snapshot = true;
            }
            SessionEvent::Poll => match self.evaluate(now_ms) {
                Ok(readings) => {
                    report.evaluations += 1;
                    report.skipped = None;
                    report.readings = readings;
                }
                Err(reason) => {
                    debug!("poll skipped: {reason:?}");
                    report.skipped = Some(reason);
                }
            },
            SessionEvent::Respawn => {
                self.damage.cancel();
                self.vitals.respawn(&mut self.authority);
                self.alerts.push(Alert {
                    level: AlertLevel::Info,
                    message: "You have respawned".into(),
                    at_ms: now_ms,
                });
            }
            SessionEvent::SetAuthToken { token } => {
                self.authority.set_token(token);
            }
            SessionEvent::Shutdown => {
                self.damage.cancel();
                self.world.clear();
                self.event_queue.clear();
                self.shut_down = true;
                info!("session shut down");
            }
        }
    }

    /// Re-read the location and react to every entity's tier.
    fn evaluate(&mut self, now_ms: u64) -> Result<Vec<TierReading>, SkipReason> {
        if !self.has_snapshot {
            return Err(SkipReason::NoSnapshot);
        }
        let player = match self.location.current_location() {
            Ok(p) if p.is_valid() => p,
            Ok(_) => return Err(SkipReason::InvalidLocation),
            Err(e) => {
                debug!("location unavailable: {e}");
                return Err(SkipReason::NoLocation);
            }
        };
        self.last_location = Some(player);

        let observations =
            systems::evaluate::run(&self.world, player, &self.thresholds, &self.config.username);
        let today = self.calendar.today();

        for obs in &observations {
            if obs.tier == ProximityTier::Safe {
                continue;
            }
            if self.ledger.claim(obs.kind.class(), today) {
                self.push_notification(obs);
            }
            if obs.tier == ProximityTier::Within && self.vitals.is_alive() {
                self.react_within(obs, now_ms);
            }
        }

        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer, &mut self.consumed);

        Ok(observations
            .into_iter()
            .map(|obs| TierReading {
                class: obs.kind.class(),
                id: obs.id,
                tier: obs.tier,
            })
            .collect())
    }

    fn react_within(&mut self, obs: &Observation, now_ms: u64) {
        match &obs.kind {
            ObservedKind::Missile {
                missile_type,
                status: MissileStatus::Hit,
                sent_by,
            } => {
                let request = DamageRequest {
                    source: DamageSource {
                        class: EntityClass::Missile,
                        entity_id: obs.id.clone(),
                        attacker: sent_by.clone(),
                        weapon: missile_type.clone(),
                    },
                    damage_per_tick: self.config.missile_damage_per_tick,
                    initial_delay_ms: self.config.missile_initial_delay_ms,
                    tick_interval_ms: self.config.damage_tick_interval_ms,
                };
                if let StartOutcome::Started(_) =
                    self.damage.start(request, now_ms, self.vitals.health())
                {
                    self.alerts.push(Alert {
                        level: AlertLevel::Warning,
                        message: format!(
                            "You are in the blast zone of {sent_by}'s {missile_type}"
                        ),
                        at_ms: now_ms,
                    });
                }
            }
            ObservedKind::Missile { .. } => {}
            ObservedKind::Loot { rarity } => {
                let reward = roll_loot(*rarity, &mut self.rng);
                let grant =
                    apply_loot_reward(reward, &self.config, &mut self.vitals, &mut self.authority);
                self.consume(obs);
                let message = match &grant.item {
                    Some(item) => format!(
                        "You picked up a {} and {} coins",
                        item.name, grant.currency
                    ),
                    None => format!("You picked up {} coins", grant.currency),
                };
                self.alerts.push(Alert {
                    level: AlertLevel::Info,
                    message,
                    at_ms: now_ms,
                });
            }
            ObservedKind::Landmine { placed_by } => {
                if self.damage.is_live() {
                    // Stays armed until the current session ends.
                    debug!("landmine {} not triggered, damage already live", obs.id);
                    return;
                }
                let request = DamageRequest {
                    source: DamageSource {
                        class: EntityClass::Landmine,
                        entity_id: obs.id.clone(),
                        attacker: placed_by.clone(),
                        weapon: "landmine".into(),
                    },
                    damage_per_tick: self.config.landmine_damage_per_tick,
                    initial_delay_ms: self.config.landmine_initial_delay_ms,
                    tick_interval_ms: self.config.damage_tick_interval_ms,
                };
                self.damage.start(request, now_ms, self.vitals.health());
                self.consume(obs);
                self.alerts.push(Alert {
                    level: AlertLevel::Warning,
                    message: format!("You stepped on a landmine placed by {placed_by}"),
                    at_ms: now_ms,
                });
            }
        }
    }

    /// Remove a picked-up or triggered entity locally and on the server.
    fn consume(&mut self, obs: &Observation) {
        self.authority.consume_entity(&obs.id);
        self.despawn_buffer
            .push((obs.entity, obs.kind.class(), obs.id.clone()));
    }

    fn push_notification(&mut self, obs: &Observation) {
        let (title, body) = match &obs.kind {
            ObservedKind::Missile {
                missile_type,
                sent_by,
                ..
            } => (
                "Incoming missile".to_string(),
                format!("A {missile_type} from {sent_by} is nearby"),
            ),
            ObservedKind::Loot { rarity } => (
                "Loot nearby".to_string(),
                format!("A {rarity:?} loot drop is within reach"),
            ),
            ObservedKind::Landmine { .. } => (
                "Landmine nearby".to_string(),
                "Watch your step! A landmine is close".to_string(),
            ),
        };
        self.notifier.notify(&title, &body);
        self.notifications.push(Notification {
            class: obs.kind.class(),
            title,
            body,
        });
    }
}
