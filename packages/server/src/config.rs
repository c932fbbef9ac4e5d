//! Server configuration from command-line flags and `TSUDOI_*` environment variables.

use std::path::PathBuf;

use clap::Parser;

use crate::usecase::RoomSubscriptionMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "tsudoi-server")]
#[command(about = "Presence-aware real-time chat server", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TSUDOI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TSUDOI_PORT", default_value = "8080")]
    pub port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(short = 'l', long, env = "TSUDOI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// JSON seed file with users, friendships and rooms
    #[arg(short = 's', long, env = "TSUDOI_SEED")]
    pub seed: Option<PathBuf>,

    /// Room group subscription on connect: "explicit" or "auto"
    #[arg(long, env = "TSUDOI_ROOM_SUBSCRIPTION", default_value = "explicit")]
    pub room_subscription: RoomSubscriptionMode,
}

/// Resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub seed: Option<PathBuf>,
    pub room_subscription: RoomSubscriptionMode,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            seed: args.seed,
            room_subscription: args.room_subscription,
        }
    }
}
