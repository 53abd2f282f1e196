//! Session thread: drives a `ProximityEngine` in real time.
//!
//! The engine is moved into the thread, which owns it for the session's
//! lifetime. Commands arrive via `mpsc` channel and wake the thread
//! immediately; otherwise it sleeps until the next poll or damage tick.
//! A `Poll` event is queued every `poll_interval_ms`.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info};

use geostrike_core::events::SessionEvent;
use geostrike_engine::{CycleReport, ProximityEngine};

use crate::state::{SessionCommand, SessionState};

/// Spawn the session thread. Returns the command sender and join handle.
pub fn spawn_session_loop(
    engine: ProximityEngine,
    latest_report: Arc<Mutex<Option<CycleReport>>>,
) -> std::io::Result<(mpsc::Sender<SessionCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<SessionCommand>();

    let handle = std::thread::Builder::new()
        .name("geostrike-session".into())
        .spawn(move || {
            run_session_loop(engine, cmd_rx, &latest_report);
        })?;

    Ok((cmd_tx, handle))
}

/// Start a session on `state`, refusing if one is already running.
pub fn start_session(
    state: &SessionState,
    engine: ProximityEngine,
) -> Result<JoinHandle<()>, String> {
    let mut running = state.running.lock().map_err(|e| e.to_string())?;
    if *running {
        return Err("Session already running".into());
    }

    let (cmd_tx, handle) = spawn_session_loop(engine, state.latest_report.clone())
        .map_err(|e| format!("Failed to spawn session thread: {e}"))?;

    let mut tx_lock = state.command_tx.lock().map_err(|e| e.to_string())?;
    *tx_lock = Some(cmd_tx);
    *running = true;
    Ok(handle)
}

/// Stop the session on `state`, if running.
pub fn stop_session(state: &SessionState) -> Result<(), String> {
    let mut running = state.running.lock().map_err(|e| e.to_string())?;
    let mut tx_lock = state.command_tx.lock().map_err(|e| e.to_string())?;
    if let Some(tx) = tx_lock.take() {
        // A closed channel means the thread already exited.
        let _ = tx.send(SessionCommand::Shutdown);
    }
    *running = false;
    Ok(())
}

/// The session loop. Runs until Shutdown, a `SessionEvent::Shutdown`, or
/// channel disconnect.
fn run_session_loop(
    mut engine: ProximityEngine,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    latest_report: &Mutex<Option<CycleReport>>,
) {
    let started = Instant::now();
    let poll_interval = engine.config().poll_interval_ms.max(1);
    let mut next_poll_ms = 0u64;

    loop {
        let now_ms = elapsed_ms(started);

        // 1. Queue a poll if one is due
        if now_ms >= next_poll_ms {
            engine.queue_event(SessionEvent::Poll);
            next_poll_ms = now_ms + poll_interval;
        }

        // 2. Advance the engine (events first, then due damage ticks)
        let report = engine.advance(now_ms);
        let shut_down = report.shut_down;
        if is_noteworthy(&report) {
            for alert in &report.alerts {
                info!("[{:?}] {}", alert.level, alert.message);
            }
            if let Ok(mut lock) = latest_report.lock() {
                *lock = Some(report);
            }
        }
        if shut_down {
            return;
        }

        // 3. Sleep until the next poll or damage tick, waking on commands
        let wake_ms = engine
            .next_wakeup_ms()
            .map_or(next_poll_ms, |due| due.min(next_poll_ms));
        let timeout = Duration::from_millis(wake_ms.saturating_sub(elapsed_ms(started)));

        match cmd_rx.recv_timeout(timeout) {
            Ok(command) => {
                if !forward(&mut engine, command, elapsed_ms(started)) {
                    return;
                }
                // Drain anything else that arrived together
                while let Ok(command) = cmd_rx.try_recv() {
                    if !forward(&mut engine, command, elapsed_ms(started)) {
                        return;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("session command channel closed");
                return;
            }
        }
    }
}

/// Queue a command's event. Returns false when the loop should exit.
fn forward(engine: &mut ProximityEngine, command: SessionCommand, now_ms: u64) -> bool {
    match command {
        SessionCommand::Event(event) => {
            engine.queue_event(event);
            true
        }
        SessionCommand::Shutdown => {
            engine.queue_event(SessionEvent::Shutdown);
            engine.advance(now_ms);
            false
        }
    }
}

fn is_noteworthy(report: &CycleReport) -> bool {
    report.evaluations > 0
        || report.damage_ticks > 0
        || !report.alerts.is_empty()
        || !report.notifications.is_empty()
        || report.shut_down
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
