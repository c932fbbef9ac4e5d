//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_room, get_direct_messages, get_presence, get_room_detail, get_room_messages,
        get_rooms, health_check, join_room, leave_room, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Build the application router (WebSocket + HTTP API)
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms).post(create_room))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/rooms/{room_id}/messages", get(get_room_messages))
        .route("/api/rooms/{room_id}/join", post(join_room))
        .route("/api/rooms/{room_id}/leave", post(leave_room))
        .route("/api/direct/{user_id}", get(get_direct_messages))
        .route("/api/presence/{user_id}", get(get_presence))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(Arc::new(app_state));
/// server.run("127.0.0.1", 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run the chat server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(self.state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?user_id=<id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
