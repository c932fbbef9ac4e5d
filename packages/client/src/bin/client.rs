//! Tsudoi chat client.
//!
//! Connects to a Tsudoi server as the given user and sends commands from stdin.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//! A 4xx rejection of the upgrade exits immediately.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsudoi-client -- --user-id 1
//! cargo run --bin tsudoi-client -- -u ws://127.0.0.1:3000/ws -i 2
//! ```

use clap::Parser;

use tsudoi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tsudoi-client")]
#[command(about = "Interactive CLI client for the Tsudoi chat server", long_about = None)]
struct Args {
    /// Authenticated user ID to connect as
    #[arg(short = 'i', long, env = "TSUDOI_USER_ID")]
    user_id: i64,

    /// WebSocket server URL
    #[arg(short = 'u', long, env = "TSUDOI_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Default log level (overridden by RUST_LOG)
    #[arg(short = 'l', long, env = "TSUDOI_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the client
    if let Err(e) = tsudoi_client::run_client(args.url, args.user_id).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
