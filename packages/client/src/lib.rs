//! Interactive CLI client for the Tsudoi chat server.
//!
//! Reads commands from the terminal, turns them into WebSocket invocations
//! and prints incoming server events.

pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::run_client;
