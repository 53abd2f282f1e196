//! Notification de-duplication ledger.
//!
//! At most one notification per entity class per calendar day. Keyed by
//! class, not entity id: two loot drops on the same day produce one
//! notification. The ledger rolls over when the day changes, not after a
//! fixed elapsed time.

use std::collections::HashMap;

use chrono::NaiveDate;

use geostrike_core::enums::EntityClass;

#[derive(Debug, Clone, Default)]
pub struct NotificationLedger {
    last_notified: HashMap<EntityClass, NaiveDate>,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True unless this class was already notified on `today`.
    pub fn should_notify(&self, class: EntityClass, today: NaiveDate) -> bool {
        self.last_notified.get(&class) != Some(&today)
    }

    pub fn record_notified(&mut self, class: EntityClass, today: NaiveDate) {
        self.last_notified.insert(class, today);
    }

    /// `should_notify` + `record_notified` in one step.
    pub fn claim(&mut self, class: EntityClass, today: NaiveDate) -> bool {
        if self.should_notify(class, today) {
            self.record_notified(class, today);
            true
        } else {
            false
        }
    }

    pub fn last_notified(&self, class: EntityClass) -> Option<NaiveDate> {
        self.last_notified.get(&class).copied()
    }
}
