//! UseCase: ルーム詳細取得
//!
//! 非公開ルームはメンバー以外には存在しないものとして扱います。

use std::sync::Arc;

use crate::domain::{
    MembershipStore, ProfileStore, RepositoryError, RoomId, RoomStore, RoomView, UserId,
};

use super::{
    error::{GetRoomDetailError, classify},
    get_rooms::build_room_view,
};

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    rooms: Arc<dyn RoomStore>,
    memberships: Arc<dyn MembershipStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        memberships: Arc<dyn MembershipStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            rooms,
            memberships,
            profiles,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        room_id: RoomId,
    ) -> Result<RoomView, GetRoomDetailError> {
        let to_error = |e: RepositoryError| {
            classify(
                e,
                GetRoomDetailError::RoomNotFound(room_id),
                GetRoomDetailError::RepositoryError,
            )
        };
        let room = self.rooms.get_room(room_id).await.map_err(to_error)?;
        if room.is_private
            && !self
                .memberships
                .is_member(room_id, user_id)
                .await
                .map_err(to_error)?
        {
            return Err(GetRoomDetailError::RoomNotFound(room_id));
        }
        build_room_view(room, self.memberships.as_ref(), self.profiles.as_ref())
            .await
            .map_err(to_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::testing::{World, uid};

    #[tokio::test]
    async fn test_get_room_detail() {
        // テスト項目: 公開ルームの詳細を取得できる
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        let usecase =
            GetRoomDetailUseCase::new(world.rooms.clone(), world.rooms.clone(), world.users.clone());

        // when (操作):
        let view = usecase.execute(uid(2), room_id).await.unwrap();

        // then (期待する結果):
        assert_eq!(view.room.id, room_id);
        assert_eq!(view.members_count, 1);
    }

    #[tokio::test]
    async fn test_private_room_is_hidden_from_non_members() {
        // テスト項目: 非公開ルームはメンバー以外には RoomNotFound
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), true).await;
        let usecase =
            GetRoomDetailUseCase::new(world.rooms.clone(), world.rooms.clone(), world.users.clone());

        // when (操作):
        let outsider = usecase.execute(uid(2), room_id).await;
        let member = usecase.execute(uid(1), room_id).await;

        // then (期待する結果):
        assert_eq!(outsider, Err(GetRoomDetailError::RoomNotFound(room_id)));
        assert!(member.is_ok());
    }
}
