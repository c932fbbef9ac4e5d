//! Data Transfer Objects (DTOs) for the chat protocol.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound invocations and outbound event frames
//! - `http`: HTTP API request/response bodies
//!
//! `conversion` holds the mapping between DTOs and domain types.

pub mod conversion;
pub mod http;
pub mod websocket;
