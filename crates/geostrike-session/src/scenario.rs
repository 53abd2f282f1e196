//! Scenario replay: drive an engine through a scripted timeline in virtual
//! time, with logging collaborators.
//!
//! A scenario is JSON: engine config, a start location, and timed steps that
//! move the player, deliver feed snapshots or respawn. Polls happen every
//! `poll_interval_ms`; damage ticks fire at their exact due times.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use geostrike_core::config::EngineConfig;
use geostrike_core::enums::ProximityTier;
use geostrike_core::error::{ApiResult, ConfigError, LocationError};
use geostrike_core::events::SessionEvent;
use geostrike_core::snapshot::EntitySnapshot;
use geostrike_core::types::{GeoPoint, PlayerVitalState};
use geostrike_engine::collaborators::*;
use geostrike_engine::{CycleReport, ProximityEngine};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scenario config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: EngineConfig,
    /// Auth token for authoritative writes; none means writes are skipped.
    #[serde(default)]
    pub token: Option<String>,
    /// Calendar day for the notification ledger; defaults to today.
    #[serde(default)]
    pub day: Option<NaiveDate>,
    /// Vitals to start from; defaults to alive at full health.
    #[serde(default)]
    pub vitals: Option<PlayerVitalState>,
    pub start_location: GeoPoint,
    pub duration_ms: u64,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// Things that happen at `at_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub at_ms: u64,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Location becomes unavailable until the next `location`.
    #[serde(default)]
    pub location_lost: bool,
    #[serde(default)]
    pub snapshot: Option<EntitySnapshot>,
    #[serde(default)]
    pub respawn: bool,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ScenarioError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Result of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    /// Cycles that evaluated, alerted, notified or ticked.
    pub reports: Vec<CycleReport>,
    pub final_vitals: PlayerVitalState,
    /// Authoritative writes in the order they were made.
    pub writes: Vec<String>,
}

/// Location source whose answer the replay changes between steps.
#[derive(Clone)]
struct ScriptedLocation(Arc<Mutex<Result<GeoPoint, LocationError>>>);

impl LocationSource for ScriptedLocation {
    fn current_location(&mut self) -> Result<GeoPoint, LocationError> {
        self.0
            .lock()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?
            .clone()
    }
}

struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, title: &str, body: &str) {
        info!("notification: {title}: {body}");
    }
}

/// Accepts every write and records it.
#[derive(Clone, Default)]
struct LoggingStore(Arc<Mutex<Vec<String>>>);

impl LoggingStore {
    fn record(&self, entry: String) -> ApiResult<()> {
        info!("authoritative write: {entry}");
        if let Ok(mut lock) = self.0.lock() {
            lock.push(entry);
        }
        Ok(())
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().map(|lock| lock.clone()).unwrap_or_default()
    }
}

impl AuthoritativeStore for LoggingStore {
    fn set_health(&mut self, _token: &str, value: i32) -> ApiResult<()> {
        self.record(format!("setHealth({value})"))
    }
    fn remove_health(&mut self, _token: &str, amount: i32) -> ApiResult<()> {
        self.record(format!("removeHealth({amount})"))
    }
    fn add_health(&mut self, _token: &str, amount: i32) -> ApiResult<()> {
        self.record(format!("addHealth({amount})"))
    }
    fn set_alive(&mut self, _token: &str, alive: bool) -> ApiResult<()> {
        self.record(format!("setAlive({alive})"))
    }
    fn add_currency(&mut self, _token: &str, amount: u32) -> ApiResult<()> {
        self.record(format!("addCurrency({amount})"))
    }
    fn add_inventory_item(&mut self, _token: &str, item_name: &str, category: &str) -> ApiResult<()> {
        self.record(format!("addInventoryItem({item_name}, {category})"))
    }
    fn consume_entity(&mut self, entity_id: &str) -> ApiResult<()> {
        self.record(format!("consumeEntity({entity_id})"))
    }
}

/// Run a scenario to completion in virtual time.
pub fn replay(scenario: Scenario) -> Result<ReplayOutcome, ScenarioError> {
    let location = ScriptedLocation(Arc::new(Mutex::new(Ok(scenario.start_location))));
    let store = LoggingStore::default();
    let cache = match scenario.vitals {
        Some(vitals) => MemoryVitalsCache::with_state(vitals),
        None => MemoryVitalsCache::new(),
    };
    let calendar: Box<dyn CalendarClock> = match scenario.day {
        Some(day) => Box::new(ManualCalendar::new(day)),
        None => Box::new(LocalCalendar),
    };

    let poll_interval = scenario.config.poll_interval_ms.max(1);
    let mut engine = ProximityEngine::new(
        scenario.config,
        Collaborators {
            location: Box::new(location.clone()),
            notifier: Box::new(LogNotifier),
            store: Box::new(store.clone()),
            cache: Box::new(cache),
            calendar,
        },
    )?;
    engine.queue_event(SessionEvent::SetAuthToken {
        token: scenario.token,
    });

    let mut steps = scenario.steps;
    steps.sort_by_key(|s| s.at_ms);
    let mut steps = steps.into_iter().peekable();
    let mut next_poll_ms = 0u64;
    let mut reports = Vec::new();

    loop {
        let mut now_ms = next_poll_ms;
        if let Some(step) = steps.peek() {
            now_ms = now_ms.min(step.at_ms);
        }
        if let Some(due) = engine.next_wakeup_ms() {
            now_ms = now_ms.min(due);
        }
        if now_ms > scenario.duration_ms {
            break;
        }

        while let Some(step) = steps.next_if(|s| s.at_ms <= now_ms) {
            apply_step(&mut engine, &location, step);
        }
        if now_ms == next_poll_ms {
            engine.queue_event(SessionEvent::Poll);
            next_poll_ms += poll_interval;
        }

        let report = engine.advance(now_ms);
        let done = report.shut_down;
        if is_noteworthy(&report) {
            reports.push(report);
        }
        if done {
            break;
        }
    }

    Ok(ReplayOutcome {
        reports,
        final_vitals: engine.vitals(),
        writes: store.entries(),
    })
}

fn is_noteworthy(report: &CycleReport) -> bool {
    report.damage_ticks > 0
        || !report.alerts.is_empty()
        || !report.notifications.is_empty()
        || report
            .readings
            .iter()
            .any(|r| r.tier != ProximityTier::Safe)
}

fn apply_step(engine: &mut ProximityEngine, location: &ScriptedLocation, step: ScenarioStep) {
    if let Ok(mut lock) = location.0.lock() {
        if let Some(point) = step.location {
            *lock = Ok(point);
        } else if step.location_lost {
            *lock = Err(LocationError::Unavailable("scripted loss".into()));
        }
    }
    if let Some(snapshot) = step.snapshot {
        engine.queue_event(SessionEvent::Snapshot { snapshot });
    }
    if step.respawn {
        engine.queue_event(SessionEvent::Respawn);
    }
}
