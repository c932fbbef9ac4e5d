//! UseCase: 入力中通知
//!
//! 入力中の状態は保存せず、`room:<id>` へ配信するだけです。
//! メンバーでないユーザーの通知は配信しません。

use std::sync::Arc;

use crate::domain::{
    GroupKey, MembershipStore, MessagePusher, ProfileStore, RoomId, ServerEvent, UserId,
};

use super::error::{TypingError, classify};

/// 入力中通知のユースケース
pub struct UserTypingUseCase {
    memberships: Arc<dyn MembershipStore>,
    profiles: Arc<dyn ProfileStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UserTypingUseCase {
    /// 新しい UserTypingUseCase を作成
    pub fn new(
        memberships: Arc<dyn MembershipStore>,
        profiles: Arc<dyn ProfileStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            memberships,
            profiles,
            message_pusher,
        }
    }

    /// 入力中通知を配信し、配信できた数を返す
    pub async fn execute(
        &self,
        user_id: UserId,
        room_id: RoomId,
        is_typing: bool,
    ) -> Result<usize, TypingError> {
        let is_member = self
            .memberships
            .is_member(room_id, user_id)
            .await
            .map_err(|e| TypingError::PersistenceFailure(e.to_string()))?;
        if !is_member {
            return Err(TypingError::NotAMember { room_id, user_id });
        }
        let user = self.profiles.get_profile(user_id).await.map_err(|e| {
            classify(
                e,
                TypingError::UserNotFound(user_id),
                TypingError::PersistenceFailure,
            )
        })?;

        let delivered = self
            .message_pusher
            .broadcast(
                GroupKey::Room(room_id),
                &ServerEvent::UserTypingStatus {
                    room_id,
                    user,
                    is_typing,
                },
            )
            .await;
        Ok(delivered)
    }
}
