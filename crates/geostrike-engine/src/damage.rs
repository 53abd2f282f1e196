//! Damage-over-time sessions for missile blasts and landmine detonations.
//!
//! State machine: Idle → Scheduled → Ticking → Terminated.
//! - Scheduled: waiting out the initial delay (30 s for missiles, none for
//!   landmines).
//! - Ticking: each tick removes `damage_per_tick` from cached health and
//!   writes through; the session ends when health reaches zero.
//! - Terminated: death or explicit cancellation (respawn).
//!
//! At most one session is live at a time. Leaving the blast radius does not
//! cancel a session; damage continues until death or respawn.

use log::{debug, info};

use geostrike_core::enums::{AlertLevel, DamagePhase, EntityClass};
use geostrike_core::events::Alert;

use crate::authority::Authority;
use crate::vitals::{DamageOutcome, PlayerVitals};

/// What is dealing the damage, for alerts and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageSource {
    pub class: EntityClass,
    pub entity_id: String,
    /// Username of the player who sent the missile or placed the landmine.
    pub attacker: String,
    /// Missile type, or "landmine".
    pub weapon: String,
}

/// Parameters for a new session.
#[derive(Debug, Clone)]
pub struct DamageRequest {
    pub source: DamageSource,
    pub damage_per_tick: i32,
    pub initial_delay_ms: u64,
    pub tick_interval_ms: u64,
}

/// One live (or just-ended) damage session.
#[derive(Debug, Clone)]
pub struct DamageSession {
    pub id: u32,
    pub source: DamageSource,
    pub damage_per_tick: i32,
    pub tick_interval_ms: u64,
    /// Health when the session was created.
    pub remaining_health_at_start: i32,
    pub phase: DamagePhase,
    /// Engine time of the next tick; `None` once terminated.
    pub next_due_ms: Option<u64>,
    pub ticks_applied: u32,
}

impl DamageSession {
    pub fn is_live(&self) -> bool {
        matches!(self.phase, DamagePhase::Scheduled | DamagePhase::Ticking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(u32),
    /// A session is already live; the request was dropped.
    AlreadyActive(u32),
}

#[derive(Debug, Default)]
pub struct DamageEngine {
    session: Option<DamageSession>,
    next_session_id: u32,
}

impl DamageEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase. `Idle` before the first session.
    pub fn phase(&self) -> DamagePhase {
        self.session
            .as_ref()
            .map_or(DamagePhase::Idle, |s| s.phase)
    }

    pub fn session(&self) -> Option<&DamageSession> {
        self.session.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.session.as_ref().is_some_and(DamageSession::is_live)
    }

    /// When the next tick is due, if a session is live.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.session
            .as_ref()
            .filter(|s| s.is_live())
            .and_then(|s| s.next_due_ms)
    }

    /// Schedule a new session unless one is already live.
    pub fn start(&mut self, request: DamageRequest, now_ms: u64, health: i32) -> StartOutcome {
        if let Some(active) = self.session.as_ref().filter(|s| s.is_live()) {
            debug!(
                "damage from {} ignored, session {} already live",
                request.source.entity_id, active.id
            );
            return StartOutcome::AlreadyActive(active.id);
        }

        let id = self.next_session_id;
        self.next_session_id += 1;
        info!(
            "damage session {id} scheduled: {} from {} ({} per tick, first in {} ms)",
            request.source.weapon,
            request.source.attacker,
            request.damage_per_tick,
            request.initial_delay_ms
        );
        self.session = Some(DamageSession {
            id,
            source: request.source,
            damage_per_tick: request.damage_per_tick,
            tick_interval_ms: request.tick_interval_ms.max(1),
            remaining_health_at_start: health,
            phase: DamagePhase::Scheduled,
            next_due_ms: Some(now_ms.saturating_add(request.initial_delay_ms)),
            ticks_applied: 0,
        });
        StartOutcome::Started(id)
    }

    /// Terminate the live session, clearing its pending tick.
    /// Returns whether anything was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.session.as_mut().filter(|s| s.is_live()) {
            Some(session) => {
                session.phase = DamagePhase::Terminated;
                session.next_due_ms = None;
                info!("damage session {} cancelled", session.id);
                true
            }
            None => false,
        }
    }

    /// Apply every tick due at or before `now_ms`. Returns how many ticks ran.
    pub fn run_due(
        &mut self,
        now_ms: u64,
        vitals: &mut PlayerVitals,
        authority: &mut Authority,
        alerts: &mut Vec<Alert>,
    ) -> u32 {
        let mut ticks = 0;
        while let Some(session) = self.session.as_mut() {
            let due = match session.next_due_ms {
                Some(due) if session.is_live() && due <= now_ms => due,
                _ => break,
            };
            match vitals.apply_damage(session.damage_per_tick, authority) {
                DamageOutcome::Damaged { health } => {
                    session.phase = DamagePhase::Ticking;
                    session.ticks_applied += 1;
                    ticks += 1;
                    session.next_due_ms = Some(due + session.tick_interval_ms);
                    debug!("session {} tick: health now {health}", session.id);
                    alerts.push(Alert {
                        level: AlertLevel::Warning,
                        message: format!("You have taken {} damage", session.damage_per_tick),
                        at_ms: due,
                    });
                }
                DamageOutcome::Killed => {
                    session.phase = DamagePhase::Terminated;
                    session.ticks_applied += 1;
                    ticks += 1;
                    session.next_due_ms = None;
                    info!(
                        "player killed by {}'s {} (session {})",
                        session.source.attacker, session.source.weapon, session.id
                    );
                    alerts.push(Alert {
                        level: AlertLevel::Critical,
                        message: format!(
                            "You have been killed by {}'s {}",
                            session.source.attacker, session.source.weapon
                        ),
                        at_ms: due,
                    });
                }
                DamageOutcome::AlreadyDead => {
                    session.phase = DamagePhase::Terminated;
                    session.next_due_ms = None;
                }
            }
        }
        ticks
    }
}
