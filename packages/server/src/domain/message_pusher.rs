//! MessagePusher trait（グループ購読とファンアウト）
//!
//! 接続とブロードキャストグループ（`user:<id>` / `room:<id>`）の購読関係を
//! 管理し、イベントを購読中の全接続へ配信する。購読関係は揮発性の
//! キャッシュであり、再起動時は空から作り直される。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    error::MessagePushError,
    event::ServerEvent,
    value_object::{ConnectionId, GroupKey},
};

/// 接続ごとの送信チャンネル（シリアライズ済みフレームを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続を登録解除し、その接続の購読をすべて外す
    async fn unregister_connection(&self, connection_id: ConnectionId);

    /// グループを購読（冪等）。新たに購読した場合のみ `true`。
    ///
    /// 登録されていない接続は購読できない（`false`）。
    async fn subscribe(&self, connection_id: ConnectionId, group: GroupKey) -> bool;

    /// 購読を解除（冪等）。実際に解除した場合のみ `true`。
    async fn unsubscribe(&self, connection_id: ConnectionId, group: GroupKey) -> bool;

    async fn is_subscribed(&self, connection_id: ConnectionId, group: GroupKey) -> bool;

    async fn subscriber_count(&self, group: GroupKey) -> usize;

    /// 特定の接続だけにイベントを送る
    async fn push_to(
        &self,
        connection_id: ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// グループの全購読者へベストエフォートで配信し、配信できた数を返す
    ///
    /// 閉じた接続への配信は黙って捨てられ、呼び出し元にはエラーを返さない。
    async fn broadcast(&self, group: GroupKey, event: &ServerEvent) -> usize;
}
