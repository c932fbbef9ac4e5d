//! Tsudoi chat server.
//!
//! Serves WebSocket sessions on `/ws` and a thin HTTP API under `/api`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsudoi-server
//! cargo run --bin tsudoi-server -- --host 0.0.0.0 --port 3000 --seed seed.json
//! ```

use std::sync::Arc;

use clap::Parser;

use tsudoi_server::{
    bootstrap::InMemoryBackend,
    config::{Args, ServerConfig},
    infrastructure::SeedData,
    ui::Server,
};
use tsudoi_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = ServerConfig::from(Args::parse());

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. Stores, registry and MessagePusher
    // 2. Seed data
    // 3. UseCases and AppState
    // 4. Server

    // 1. Create the in-memory backend
    let backend = InMemoryBackend::new(Arc::new(SystemClock));

    // 2. Load seed data
    if let Some(path) = &config.seed {
        let loaded = match SeedData::from_file(path).await {
            Ok(data) => backend.seed(&data).await.map(|_| data),
            Err(e) => Err(e),
        };
        match loaded {
            Ok(data) => tracing::info!(
                "Seeded {} users and {} rooms from {}",
                data.users.len(),
                data.rooms.len(),
                path.display()
            ),
            Err(e) => {
                tracing::error!("Failed to load seed {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    // 3. Create UseCases
    tracing::info!("Room subscription mode: {}", config.room_subscription);
    let state = Arc::new(backend.app_state(config.room_subscription));

    // 4. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
