//! 起動時に投入するシードデータ（JSON）
//!
//! ```json
//! {
//!   "users": [{"id": 1, "username": "alice", "avatar": "alice.png"}],
//!   "friendships": [[1, 2]],
//!   "rooms": [{"name": "lobby", "creator": 1, "members": [2]}]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    MembershipStore, NewChatRoom, RepositoryError, RoomName, RoomRole, RoomStore, UserId,
    ValueObjectError,
};
use crate::infrastructure::repository::{InMemoryRoomRepository, InMemoryUserRepository};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed value: {0}")]
    Invalid(#[from] ValueObjectError),

    #[error("failed to apply seed: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRoom {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub creator: i64,
    #[serde(default)]
    pub is_private: bool,
    /// 作成者以外のメンバー
    #[serde(default)]
    pub members: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub friendships: Vec<[i64; 2]>,
    #[serde(default)]
    pub rooms: Vec<SeedRoom>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// インメモリストアへ投入
    pub async fn apply(
        &self,
        users: &InMemoryUserRepository,
        rooms: &InMemoryRoomRepository,
    ) -> Result<(), SeedError> {
        for user in &self.users {
            users
                .upsert_user(UserId::new(user.id)?, &user.username, &user.avatar)
                .await;
        }
        for [a, b] in &self.friendships {
            users
                .add_friendship(UserId::new(*a)?, UserId::new(*b)?)
                .await?;
        }
        for seed in &self.rooms {
            let room = rooms
                .create_room(
                    UserId::new(seed.creator)?,
                    NewChatRoom {
                        name: RoomName::new(seed.name.clone())?,
                        description: seed.description.clone(),
                        image: seed.image.clone(),
                        is_private: seed.is_private,
                    },
                )
                .await?;
            for member in &seed.members {
                rooms
                    .add_member(room.id, UserId::new(*member)?, RoomRole::Member)
                    .await?;
            }
        }
        tracing::info!(
            users = self.users.len(),
            friendships = self.friendships.len(),
            rooms = self.rooms.len(),
            "seed data applied"
        );
        Ok(())
    }
}
