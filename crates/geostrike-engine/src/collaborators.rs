//! Traits for everything outside the engine: location, notifications,
//! the authoritative store, the local vitals cache and the calendar.
//!
//! Implementations must be `Send` so an engine can be moved into a
//! session thread.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use geostrike_core::error::{ApiResult, CacheError, LocationError};
use geostrike_core::types::{GeoPoint, PlayerVitalState};

/// Pull-based player location. May fail (permission, no fix).
pub trait LocationSource: Send {
    fn current_location(&mut self) -> Result<GeoPoint, LocationError>;
}

/// Fire-and-forget local notifications.
pub trait NotificationSink: Send {
    fn notify(&mut self, title: &str, body: &str);
}

/// Remote system of record for vitals, currency and inventory.
///
/// Calls may fail independently; the engine logs failures and never retries.
pub trait AuthoritativeStore: Send {
    fn set_health(&mut self, token: &str, value: i32) -> ApiResult<()>;
    fn remove_health(&mut self, token: &str, amount: i32) -> ApiResult<()>;
    fn add_health(&mut self, token: &str, amount: i32) -> ApiResult<()>;
    fn set_alive(&mut self, token: &str, alive: bool) -> ApiResult<()>;
    fn add_currency(&mut self, token: &str, amount: u32) -> ApiResult<()>;
    fn add_inventory_item(&mut self, token: &str, item_name: &str, category: &str)
        -> ApiResult<()>;
    /// Remove a loot drop or landmine after pickup/trigger.
    fn consume_entity(&mut self, entity_id: &str) -> ApiResult<()>;
}

/// Local fast-path cache of the player's vitals.
pub trait VitalsCache: Send {
    fn load(&mut self) -> Result<Option<PlayerVitalState>, CacheError>;
    fn store(&mut self, vitals: &PlayerVitalState) -> Result<(), CacheError>;
}

/// Source of the local calendar day for the notification ledger.
pub trait CalendarClock: Send {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCalendar;

impl CalendarClock for LocalCalendar {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A calendar whose day is set by hand. Clones share the same day.
#[derive(Debug, Clone)]
pub struct ManualCalendar {
    day: Arc<Mutex<NaiveDate>>,
}

impl ManualCalendar {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Arc::new(Mutex::new(day)),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        if let Ok(mut lock) = self.day.lock() {
            *lock = day;
        }
    }
}

impl CalendarClock for ManualCalendar {
    fn today(&self) -> NaiveDate {
        match self.day.lock() {
            Ok(lock) => *lock,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// In-memory vitals cache. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryVitalsCache {
    slot: Arc<Mutex<Option<PlayerVitalState>>>,
}

impl MemoryVitalsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(vitals: PlayerVitalState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(vitals))),
        }
    }

    pub fn get(&self) -> Option<PlayerVitalState> {
        self.slot.lock().ok().and_then(|lock| *lock)
    }
}

impl VitalsCache for MemoryVitalsCache {
    fn load(&mut self) -> Result<Option<PlayerVitalState>, CacheError> {
        Ok(self.get())
    }

    fn store(&mut self, vitals: &PlayerVitalState) -> Result<(), CacheError> {
        if let Ok(mut lock) = self.slot.lock() {
            *lock = Some(*vitals);
        }
        Ok(())
    }
}

/// The full set of collaborators an engine is constructed with.
pub struct Collaborators {
    pub location: Box<dyn LocationSource>,
    pub notifier: Box<dyn NotificationSink>,
    pub store: Box<dyn AuthoritativeStore>,
    pub cache: Box<dyn VitalsCache>,
    pub calendar: Box<dyn CalendarClock>,
}
