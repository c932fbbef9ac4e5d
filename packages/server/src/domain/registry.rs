//! 接続レジストリ
//!
//! ユーザーごとの生存中接続の集合を保持する。集合が空でないことと
//! オンラインであることは同値で、空になったエントリは即座に削除される。

use async_trait::async_trait;

use super::value_object::{ConnectionId, UserId};

/// 接続登録の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// そのユーザーの最初の接続（offline → online）
    FirstConnection,
    /// 既に別の接続がある
    AdditionalConnection { live_connections: usize },
}

/// 接続解除の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// 最後の接続が閉じた（online → offline）
    LastConnectionClosed,
    /// まだ接続が残っている
    ConnectionsRemaining(usize),
    /// 登録されていない接続（既に解除済み）
    UnknownConnection,
}

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    async fn register(&self, user_id: UserId, connection_id: ConnectionId) -> ConnectOutcome;

    async fn unregister(&self, user_id: UserId, connection_id: ConnectionId)
    -> DisconnectOutcome;

    /// ユーザーの生存中接続（オフラインなら空）
    async fn connections_of(&self, user_id: UserId) -> Vec<ConnectionId>;

    async fn is_online(&self, user_id: UserId) -> bool;
}
