//! UseCase: ルーム退出処理
//!
//! メンバーシップを削除し、呼び出した接続の `room:<id>` 購読を外してから
//! 退出をルームへ配信します。メンバーでなければ失敗を返しますが、
//! 呼び出した接続に購読が残っていればそれは外します。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, GroupKey, MembershipStore, MessagePusher, ProfileStore, RoomId, RoomStore,
    ServerEvent, UserId,
};

use super::error::{LeaveRoomError, classify};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    rooms: Arc<dyn RoomStore>,
    memberships: Arc<dyn MembershipStore>,
    profiles: Arc<dyn ProfileStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
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

    /// ルーム退出を実行し、配信できた数を返す
    pub async fn execute(
        &self,
        user_id: UserId,
        room_id: RoomId,
        connection: Option<ConnectionId>,
    ) -> Result<usize, LeaveRoomError> {
        self.rooms.get_room(room_id).await.map_err(|e| {
            classify(
                e,
                LeaveRoomError::RoomNotFound(room_id),
                LeaveRoomError::PersistenceFailure,
            )
        })?;
        let profile = self.profiles.get_profile(user_id).await.map_err(|e| {
            classify(
                e,
                LeaveRoomError::UserNotFound(user_id),
                LeaveRoomError::PersistenceFailure,
            )
        })?;

        let removed = self
            .memberships
            .remove_member(room_id, user_id)
            .await
            .map_err(|e| LeaveRoomError::PersistenceFailure(e.to_string()))?;

        if let Some(connection_id) = connection {
            self.message_pusher
                .unsubscribe(connection_id, GroupKey::Room(room_id))
                .await;
        }
        if !removed {
            return Err(LeaveRoomError::NotAMember { room_id, user_id });
        }

        let delivered = self
            .message_pusher
            .broadcast(
                GroupKey::Room(room_id),
                &ServerEvent::UserLeftRoom {
                    room_id,
                    user: profile,
                },
            )
            .await;

        tracing::info!(room_id = %room_id, user_id = %user_id, "user left room");
        Ok(delivered)
    }
}
