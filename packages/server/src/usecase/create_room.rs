//! UseCase: ルーム作成処理
//!
//! 作成者は admin として同時に登録されます。作成しただけでは
//! どの接続もルームグループを購読しません。

use std::sync::Arc;

use crate::domain::{NewChatRoom, ProfileStore, RoomStore, RoomView, UserId};

use super::error::{CreateRoomError, classify};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    rooms: Arc<dyn RoomStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(rooms: Arc<dyn RoomStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { rooms, profiles }
    }

    pub async fn execute(
        &self,
        creator_id: UserId,
        room: NewChatRoom,
    ) -> Result<RoomView, CreateRoomError> {
        let creator = self.profiles.get_profile(creator_id).await.map_err(|e| {
            classify(
                e,
                CreateRoomError::CreatorNotFound(creator_id),
                CreateRoomError::PersistenceFailure,
            )
        })?;
        let room = self
            .rooms
            .create_room(creator_id, room)
            .await
            .map_err(|e| CreateRoomError::PersistenceFailure(e.to_string()))?;

        tracing::info!(room_id = %room.id, creator_id = %creator_id, "room created");
        Ok(RoomView {
            room,
            members_count: 1,
            creator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomStore, RoomName, RoomRole},
        usecase::testing::{World, uid},
    };

    fn new_room(name: &str) -> NewChatRoom {
        NewChatRoom {
            name: RoomName::new(name.to_string()).unwrap(),
            description: "chat".to_string(),
            image: None,
            is_private: false,
        }
    }

    #[tokio::test]
    async fn test_create_room_makes_creator_admin() {
        // テスト項目: 作成者が admin になり、メンバー数 1 のビューが返る
        // given (前提条件):
        let world = World::new().await;
        let usecase = CreateRoomUseCase::new(world.rooms.clone(), world.users.clone());

        // when (操作):
        let view = usecase.execute(uid(1), new_room("lobby")).await.unwrap();

        // then (期待する結果):
        assert_eq!(view.members_count, 1);
        assert_eq!(view.creator.username, "alice");
        assert_eq!(view.room.name, "lobby");
        let membership = world
            .rooms
            .get_membership(view.room.id, uid(1))
            .await
            .unwrap();
        assert_eq!(membership.role, RoomRole::Admin);
    }

    #[tokio::test]
    async fn test_unknown_creator_creates_nothing() {
        // テスト項目: 存在しない作成者ではルームを作らない
        // given (前提条件):
        let world = World::new().await;
        let mut rooms = MockRoomStore::new();
        rooms.expect_create_room().never();
        let usecase = CreateRoomUseCase::new(Arc::new(rooms), world.users.clone());

        // when (操作):
        let result = usecase.execute(uid(77), new_room("ghost")).await;

        // then (期待する結果):
        assert_eq!(result, Err(CreateRoomError::CreatorNotFound(uid(77))));
    }
}
