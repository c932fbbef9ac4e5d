//! UseCase: ルーム参加処理
//!
//! メンバーシップを追加（既にメンバーなら何もしない）し、呼び出した
//! 接続だけを `room:<id>` に購読させてから、参加をルームへ配信します。
//! 同じユーザーの他の接続は購読されません。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, GroupKey, MembershipStore, MessagePusher, ProfileStore, RepositoryError, RoomId,
    RoomRole, RoomStore, ServerEvent, UserId,
};

use super::error::{JoinRoomError, classify};

/// 参加処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    /// 新しくメンバーになった場合のみ `true`
    pub newly_joined: bool,
    pub delivered: usize,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    rooms: Arc<dyn RoomStore>,
    memberships: Arc<dyn MembershipStore>,
    profiles: Arc<dyn ProfileStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        memberships: Arc<dyn MembershipStore>,
        profiles: Arc<dyn ProfileStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            rooms,
            memberships,
            profiles,
            message_pusher,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 購読させる接続（HTTP からの参加では `None`）
    pub async fn execute(
        &self,
        user_id: UserId,
        room_id: RoomId,
        connection: Option<ConnectionId>,
    ) -> Result<JoinOutcome, JoinRoomError> {
        let room = self.rooms.get_room(room_id).await.map_err(|e| {
            classify(
                e,
                JoinRoomError::RoomNotFound(room_id),
                JoinRoomError::PersistenceFailure,
            )
        })?;
        let persistence = |e: RepositoryError| JoinRoomError::PersistenceFailure(e.to_string());
        if room.is_private
            && !self
                .memberships
                .is_member(room_id, user_id)
                .await
                .map_err(persistence)?
        {
            return Err(JoinRoomError::PrivateRoom(room_id));
        }
        let profile = self.profiles.get_profile(user_id).await.map_err(|e| {
            classify(
                e,
                JoinRoomError::UserNotFound(user_id),
                JoinRoomError::PersistenceFailure,
            )
        })?;

        let newly_joined = self
            .memberships
            .add_member(room_id, user_id, RoomRole::Member)
            .await
            .map_err(|e| {
                classify(
                    e,
                    JoinRoomError::RoomNotFound(room_id),
                    JoinRoomError::PersistenceFailure,
                )
            })?;

        if let Some(connection_id) = connection {
            self.message_pusher
                .subscribe(connection_id, GroupKey::Room(room_id))
                .await;
        }
        let delivered = self
            .message_pusher
            .broadcast(
                GroupKey::Room(room_id),
                &ServerEvent::UserJoinedRoom {
                    room_id,
                    user: profile,
                },
            )
            .await;

        tracing::info!(room_id = %room_id, user_id = %user_id, newly_joined, "user joined room");
        Ok(JoinOutcome {
            room_id,
            newly_joined,
            delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::testing::{World, drain, uid};

    fn create_usecase(world: &World) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            world.rooms.clone(),
            world.rooms.clone(),
            world.users.clone(),
            world.pusher.clone(),
        )
    }

    #[tokio::test]
    async fn test_join_subscribes_issuing_connection_and_announces() {
        // テスト項目: 参加した接続が購読し、参加イベントがルームへ届く
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        let (alice_conn, mut alice_rx) = world.connect(uid(1)).await;
        world
            .pusher
            .subscribe(alice_conn, GroupKey::Room(room_id))
            .await;
        let (bob_conn, mut bob_rx) = world.connect(uid(2)).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let outcome = usecase
            .execute(uid(2), room_id, Some(bob_conn))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.newly_joined);
        assert_eq!(outcome.delivered, 2);
        assert!(world.rooms.is_member(room_id, uid(2)).await.unwrap());
        let seen_by_alice = drain(&mut alice_rx);
        assert_eq!(seen_by_alice[0]["event"], "UserJoinedRoom");
        assert_eq!(seen_by_alice[0]["data"]["user"]["username"], "bob");
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_join_only_subscribes_the_issuing_connection() {
        // テスト項目: 同じユーザーの他の接続は購読されない
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        let (first, _rx1) = world.connect(uid(2)).await;
        let (second, _rx2) = world.connect(uid(2)).await;
        let usecase = create_usecase(&world);

        // when (操作):
        usecase.execute(uid(2), room_id, Some(first)).await.unwrap();

        // then (期待する結果):
        assert!(world.pusher.is_subscribed(first, GroupKey::Room(room_id)).await);
        assert!(
            !world
                .pusher
                .is_subscribed(second, GroupKey::Room(room_id))
                .await
        );
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        // テスト項目: 既にメンバーでも成功し、メンバー数は増えない
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let outcome = usecase.execute(uid(1), room_id, None).await.unwrap();

        // then (期待する結果):
        assert!(!outcome.newly_joined);
        assert_eq!(world.rooms.count_members(room_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_join_private_room_is_rejected() {
        // テスト項目: 非公開ルームにはメンバー以外は参加できない
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), true).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let result = usecase.execute(uid(2), room_id, None).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::PrivateRoom(room_id)));
        assert!(!world.rooms.is_member(room_id, uid(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        // テスト項目: 存在しないルームへの参加は RoomNotFound
        // given (前提条件):
        let world = World::new().await;
        let usecase = create_usecase(&world);
        let missing = RoomId::new(9).unwrap();

        // when (操作):
        let result = usecase.execute(uid(1), missing, None).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::RoomNotFound(missing)));
    }
}
