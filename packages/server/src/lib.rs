//! Presence-aware real-time chat server.
//!
//! Tracks live connections per user, routes server events to named groups
//! (`user:<id>`, `room:<id>`), announces online/offline transitions to
//! friends and persists room and direct messages before fanning them out.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// wiring
pub mod bootstrap;
pub mod config;
