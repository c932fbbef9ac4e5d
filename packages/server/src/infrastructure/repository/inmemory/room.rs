//! InMemory Room Repository 実装
//!
//! RoomStore と MembershipStore を実装します。ルームとメンバーシップを
//! 1 つのロックで保護するため、ルーム作成と作成者の admin 登録は
//! 分割されずに反映されます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tsudoi_shared::time::Clock;

use crate::domain::{
    ChatRoom, MembershipStore, NewChatRoom, RepositoryError, RoomId, RoomMembership, RoomRole,
    RoomStore, Timestamp, UserId,
};

#[derive(Default)]
struct RoomState {
    next_id: i64,
    rooms: HashMap<RoomId, ChatRoom>,
    /// room_id -> (user_id -> membership)
    members: HashMap<RoomId, HashMap<UserId, RoomMembership>>,
}

impl RoomState {
    fn live_room(&self, room_id: RoomId) -> Result<&ChatRoom, RepositoryError> {
        self.rooms
            .get(&room_id)
            .filter(|room| !room.is_deleted)
            .ok_or_else(|| RepositoryError::NotFound(format!("room {}", room_id)))
    }
}

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    state: Mutex<RoomState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RoomState::default()),
            clock,
        }
    }

    /// ルームを論理削除（メンバーシップ行は残る）
    #[cfg(test)]
    pub(crate) async fn soft_delete_room(&self, room_id: RoomId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let room = state
            .rooms
            .get_mut(&room_id)
            .filter(|room| !room.is_deleted)
            .ok_or_else(|| RepositoryError::NotFound(format!("room {}", room_id)))?;
        room.is_deleted = true;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn get_membership(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Option<RoomMembership> {
        let state = self.state.lock().await;
        state
            .members
            .get(&room_id)
            .and_then(|members| members.get(&user_id))
            .cloned()
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomRepository {
    async fn create_room(
        &self,
        creator_id: UserId,
        room: NewChatRoom,
    ) -> Result<ChatRoom, RepositoryError> {
        let created_at = self.now();
        let mut state = self.state.lock().await;

        state.next_id += 1;
        let room_id = RoomId::new(state.next_id)
            .map_err(|e| RepositoryError::PersistenceFailure(e.to_string()))?;

        let chat_room = ChatRoom {
            id: room_id,
            name: room.name.as_str().to_string(),
            description: room.description,
            image: room.image,
            creator_id,
            is_private: room.is_private,
            is_deleted: false,
            created_at,
        };
        let creator_membership = RoomMembership {
            room_id,
            user_id: creator_id,
            role: RoomRole::Admin,
            joined_at: created_at,
        };

        state.rooms.insert(room_id, chat_room.clone());
        state
            .members
            .entry(room_id)
            .or_default()
            .insert(creator_id, creator_membership);

        tracing::debug!(room_id = %room_id, creator_id = %creator_id, "room persisted");
        Ok(chat_room)
    }

    async fn get_room(&self, room_id: RoomId) -> Result<ChatRoom, RepositoryError> {
        let state = self.state.lock().await;
        state.live_room(room_id).cloned()
    }

    async fn list_rooms_visible_to(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ChatRoom>, RepositoryError> {
        let state = self.state.lock().await;
        let mut rooms: Vec<ChatRoom> = state
            .rooms
            .values()
            .filter(|room| !room.is_deleted)
            .filter(|room| {
                !room.is_private
                    || state
                        .members
                        .get(&room.id)
                        .is_some_and(|members| members.contains_key(&user_id))
            })
            .cloned()
            .collect();
        // Newest first
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rooms)
    }
}

#[async_trait]
impl MembershipStore for InMemoryRoomRepository {
    async fn is_member(&self, room_id: RoomId, user_id: UserId) -> Result<bool, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .members
            .get(&room_id)
            .is_some_and(|members| members.contains_key(&user_id)))
    }

    async fn add_member(
        &self,
        room_id: RoomId,
        user_id: UserId,
        role: RoomRole,
    ) -> Result<bool, RepositoryError> {
        let joined_at = self.now();
        let mut state = self.state.lock().await;
        state.live_room(room_id)?;

        let members = state.members.entry(room_id).or_default();
        if members.contains_key(&user_id) {
            return Ok(false);
        }
        members.insert(
            user_id,
            RoomMembership {
                room_id,
                user_id,
                role,
                joined_at,
            },
        );
        Ok(true)
    }

    async fn remove_member(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        let Some(members) = state.members.get_mut(&room_id) else {
            return Ok(false);
        };
        let removed = members.remove(&user_id).is_some();
        if members.is_empty() {
            state.members.remove(&room_id);
        }
        Ok(removed)
    }

    async fn count_members(&self, room_id: RoomId) -> Result<usize, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.members.get(&room_id).map_or(0, HashMap::len))
    }

    async fn rooms_of(&self, user_id: UserId) -> Result<Vec<RoomId>, RepositoryError> {
        let state = self.state.lock().await;
        let mut room_ids: Vec<RoomId> = state
            .members
            .iter()
            .filter(|(room_id, members)| {
                members.contains_key(&user_id)
                    && state.rooms.get(room_id).is_some_and(|room| !room.is_deleted)
            })
            .map(|(room_id, _)| *room_id)
            .collect();
        room_ids.sort();
        Ok(room_ids)
    }
}
