//! プレゼンス状態機械
//!
//! 状態は offline / online の 2 つだけで、接続数の変化から導出されます。
//! 遷移時には状態を保存し、プロフィールとフレンド一覧を取得して
//! 各フレンドの `user:<id>` グループへ `UserOnlineStatus` を配信します。
//!
//! 猶予時間は設けていません。タブの再読み込みのような即時の再接続でも
//! offline → online の 2 イベントがそのまま配信されます。

use std::sync::Arc;

use crate::domain::{
    FriendStore, GroupKey, MessagePusher, PresenceStatus, ProfileStore, RepositoryError,
    ServerEvent, UserId,
};

use super::error::{PresenceError, classify};

/// プレゼンス遷移の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceAnnouncement {
    pub status: PresenceStatus,
    /// 通知したフレンドの数
    pub friends_notified: usize,
    /// 実際に配信できた接続の数
    pub delivered: usize,
}

/// プレゼンス遷移を保存して配信するサービス
pub struct PresenceService {
    profiles: Arc<dyn ProfileStore>,
    friends: Arc<dyn FriendStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl PresenceService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        friends: Arc<dyn FriendStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            profiles,
            friends,
            message_pusher,
        }
    }

    /// 状態を保存し、フレンドへ配信する
    ///
    /// 保存に失敗した場合は配信しない。
    pub async fn transition(
        &self,
        user_id: UserId,
        status: PresenceStatus,
    ) -> Result<PresenceAnnouncement, PresenceError> {
        let to_error = |e: RepositoryError| {
            classify(
                e,
                PresenceError::UserNotFound(user_id),
                PresenceError::PersistenceFailure,
            )
        };

        self.profiles
            .update_status(user_id, status)
            .await
            .map_err(to_error)?;
        let profile = self.profiles.get_profile(user_id).await.map_err(to_error)?;
        let friends = self
            .friends
            .get_accepted_friends(user_id)
            .await
            .map_err(to_error)?;

        let event = ServerEvent::UserOnlineStatus {
            user: profile,
            is_online: status.is_online(),
        };
        let mut delivered = 0;
        for friend in &friends {
            delivered += self
                .message_pusher
                .broadcast(GroupKey::User(*friend), &event)
                .await;
        }

        tracing::info!(
            user_id = %user_id,
            status = status.as_str(),
            friends = friends.len(),
            delivered,
            "presence changed"
        );
        Ok(PresenceAnnouncement {
            status,
            friends_notified: friends.len(),
            delivered,
        })
    }
}
