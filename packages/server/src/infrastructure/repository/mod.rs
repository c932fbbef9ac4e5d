//! Repository 実装
//!
//! - `inmemory`: HashMap をストレージとして使う実装（開発・テスト用）

pub mod inmemory;

pub use inmemory::{InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository};
