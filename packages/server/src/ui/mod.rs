//! axum surface: WebSocket sessions, the thin HTTP API and server lifecycle.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, router};
pub use state::AppState;
