//! Infrastructure layer: in-memory collaborators, the connection registry,
//! the WebSocket group router, identity resolution, seeding and wire DTOs.

pub mod dto;
pub mod identity;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod seed;

pub use identity::TrustedIdentityResolver;
pub use message_pusher::WebSocketMessagePusher;
pub use registry::InMemoryConnectionRegistry;
pub use repository::{InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository};
pub use seed::{SeedData, SeedError};
