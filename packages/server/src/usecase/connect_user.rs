//! UseCase: ユーザー接続処理
//!
//! 接続を MessagePusher に登録し、自分の `user:<id>` グループを購読させ、
//! 接続レジストリに登録します。そのユーザーの最初の接続であれば
//! online への遷移をフレンドへ配信します。
//!
//! ## ルームグループの購読
//!
//! `RoomSubscriptionMode::Explicit`（デフォルト）では、接続は `joinRoom` を
//! 呼んだルームのグループしか購読しません。既にメンバーであっても、
//! 新しい接続はもう一度 `joinRoom` を呼ぶまでルームのイベントを受け取りません。
//! `AutoOnConnect` では、接続時にそのユーザーの全メンバーシップについて
//! `room:<id>` を購読させます。

use std::{fmt, str::FromStr, sync::Arc};

use crate::domain::{
    ConnectOutcome, ConnectionId, ConnectionRegistry, GroupKey, MembershipStore, MessagePusher,
    PresenceStatus, PusherChannel, UserId,
};

use super::{
    gate::KeyedGate,
    presence::{PresenceAnnouncement, PresenceService},
};

/// 接続時のルームグループ購読方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomSubscriptionMode {
    /// `joinRoom` を呼んだ接続だけがルームグループを購読する
    #[default]
    Explicit,
    /// 接続時に全メンバーシップのルームグループを購読する
    AutoOnConnect,
}

impl RoomSubscriptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomSubscriptionMode::Explicit => "explicit",
            RoomSubscriptionMode::AutoOnConnect => "auto",
        }
    }
}

impl FromStr for RoomSubscriptionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(RoomSubscriptionMode::Explicit),
            "auto" | "auto-on-connect" => Ok(RoomSubscriptionMode::AutoOnConnect),
            other => Err(format!(
                "unknown room subscription mode '{}' (expected 'explicit' or 'auto')",
                other
            )),
        }
    }
}

impl fmt::Display for RoomSubscriptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 接続処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectReport {
    pub outcome: ConnectOutcome,
    /// 接続時に購読させたルームグループの数
    pub rooms_subscribed: usize,
    /// online 遷移が起きた場合の配信結果
    pub presence: Option<PresenceAnnouncement>,
}

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    memberships: Arc<dyn MembershipStore>,
    presence: Arc<PresenceService>,
    /// ユーザー単位で登録とプレゼンス遷移を直列化する
    user_gate: Arc<KeyedGate<UserId>>,
    mode: RoomSubscriptionMode,
}

impl ConnectUserUseCase {
    /// 新しい ConnectUserUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        memberships: Arc<dyn MembershipStore>,
        presence: Arc<PresenceService>,
        user_gate: Arc<KeyedGate<UserId>>,
        mode: RoomSubscriptionMode,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            memberships,
            presence,
            user_gate,
            mode,
        }
    }

    pub fn mode(&self) -> RoomSubscriptionMode {
        self.mode
    }

    /// 接続処理を実行
    ///
    /// プレゼンスの保存や配信に失敗しても接続は成立させる（ログのみ）。
    ///
    /// # Arguments
    ///
    /// * `user_id` - 認証済みユーザー
    /// * `connection_id` - 新しい接続の ID
    /// * `sender` - この接続へのフレーム送信用チャンネル
    pub async fn execute(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> ConnectReport {
        // 1. 送信チャンネルを登録し、自分の user グループを購読
        self.message_pusher
            .register_connection(connection_id, sender)
            .await;
        self.message_pusher
            .subscribe(connection_id, GroupKey::User(user_id))
            .await;

        // 2. 方針に応じてルームグループを購読
        let rooms_subscribed = match self.mode {
            RoomSubscriptionMode::Explicit => 0,
            RoomSubscriptionMode::AutoOnConnect => {
                self.subscribe_memberships(user_id, connection_id).await
            }
        };

        // 3. レジストリに登録し、最初の接続なら online へ遷移
        let _guard = self.user_gate.enter(user_id).await;
        let outcome = self.registry.register(user_id, connection_id).await;
        let presence = match outcome {
            ConnectOutcome::FirstConnection => {
                match self
                    .presence
                    .transition(user_id, PresenceStatus::Online)
                    .await
                {
                    Ok(announcement) => Some(announcement),
                    Err(e) => {
                        tracing::error!(user_id = %user_id, "failed to announce online: {}", e);
                        None
                    }
                }
            }
            ConnectOutcome::AdditionalConnection { .. } => None,
        };

        tracing::info!(
            user_id = %user_id,
            connection_id = %connection_id,
            rooms_subscribed,
            "user connected"
        );
        ConnectReport {
            outcome,
            rooms_subscribed,
            presence,
        }
    }

    async fn subscribe_memberships(&self, user_id: UserId, connection_id: ConnectionId) -> usize {
        let room_ids = match self.memberships.rooms_of(user_id).await {
            Ok(room_ids) => room_ids,
            Err(e) => {
                tracing::error!(user_id = %user_id, "failed to load memberships: {}", e);
                return 0;
            }
        };
        let mut subscribed = 0;
        for room_id in room_ids {
            if self
                .message_pusher
                .subscribe(connection_id, GroupKey::Room(room_id))
                .await
            {
                subscribed += 1;
            }
        }
        subscribed
    }
}
