//! Core types and definitions for the GEOSTRIKE proximity engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geographic types, entity components, feed snapshots, session events,
//! alerts, constants, configuration and errors.
//! It has no dependency on threads, clocks or any runtime framework.

pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod geo;
pub mod snapshot;
pub mod types;
