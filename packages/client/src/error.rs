//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the WebSocket upgrade
    #[error("Server rejected the connection with HTTP {0}")]
    Rejected(u16),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
