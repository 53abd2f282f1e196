//! State shared between the session thread and whoever drives it.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use geostrike_core::events::SessionEvent;
use geostrike_engine::CycleReport;

/// Commands sent to the session thread.
#[derive(Debug)]
pub enum SessionCommand {
    /// Forward an event to the engine (snapshot, respawn, token...).
    Event(SessionEvent),
    /// Stop the session thread.
    Shutdown,
}

/// Handle to a running session.
///
/// `latest_report` holds the most recent cycle that did something
/// (evaluated, alerted or ticked), for synchronous polling by a UI.
pub struct SessionState {
    pub command_tx: Mutex<Option<mpsc::Sender<SessionCommand>>>,
    pub latest_report: Arc<Mutex<Option<CycleReport>>>,
    pub running: Mutex<bool>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_report: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send an event to the running session.
    pub fn send(&self, event: SessionEvent) -> Result<(), String> {
        let tx_lock = self.command_tx.lock().map_err(|e| e.to_string())?;
        match tx_lock.as_ref() {
            Some(tx) => tx
                .send(SessionCommand::Event(event))
                .map_err(|e| format!("Failed to send event: {e}")),
            None => Err("Session not started".into()),
        }
    }

    /// Clone of the latest report, if any.
    pub fn latest_report(&self) -> Option<CycleReport> {
        self.latest_report.lock().ok().and_then(|lock| lock.clone())
    }
}
