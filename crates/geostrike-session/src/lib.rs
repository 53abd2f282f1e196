//! GEOSTRIKE foreground session.
//!
//! Wires a `ProximityEngine` to real time: a session thread polls the
//! player's location at a fixed interval, forwards feed snapshots and
//! respawns, and fires damage ticks when they fall due. Also provides the
//! file-backed vitals cache, logging setup and scenario replay.

pub mod file_cache;
pub mod logging;
pub mod scenario;
pub mod session_loop;
pub mod state;

pub use geostrike_core as core;
pub use geostrike_engine as engine;
