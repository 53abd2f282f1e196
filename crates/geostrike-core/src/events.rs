//! Session events flowing into the engine, and alerts/notifications
//! flowing out of it.

use serde::{Deserialize, Serialize};

use crate::enums::{AlertLevel, EntityClass};
use crate::snapshot::EntitySnapshot;

/// Everything that can happen to a foreground session.
///
/// Events are queued and consumed serially at the next `advance`, so feed
/// callbacks and timers never race each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A new feed snapshot replaces the current one.
    Snapshot { snapshot: EntitySnapshot },
    /// Re-read the player location and re-evaluate every entity.
    Poll,
    /// The player respawned: cancel damage, restore full health.
    Respawn,
    /// Set or clear the token used for authoritative writes.
    SetAuthToken { token: Option<String> },
    /// End the session.
    Shutdown,
}

/// User-visible domain alert ("You have taken 40 damage").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    /// Engine time (milliseconds) when the alert was raised.
    pub at_ms: u64,
}

/// A local push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub class: EntityClass,
    pub title: String,
    pub body: String,
}
