//! インメモリ実装
//!
//! プロセス再起動でデータは失われます。永続ストアを実装する場合は
//! 同じ trait をデータベースに対して実装します。

pub mod message;
pub mod room;
pub mod user;

pub use message::InMemoryMessageRepository;
pub use room::InMemoryRoomRepository;
pub use user::InMemoryUserRepository;
