//! InMemory User Repository 実装
//!
//! ProfileStore と FriendStore を 1 つの構造体で実装します。
//! プロフィール CRUD やフレンド申請のワークフローはコアの範囲外のため、
//! ここでは起動時のシード投入に必要な最小限の操作だけを提供します。

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tsudoi_shared::time::Clock;

use crate::domain::{
    FriendStore, PresenceStatus, ProfileStore, RepositoryError, Timestamp, UserId, UserProfile,
};

struct UserRecord {
    profile: UserProfile,
    is_deleted: bool,
}

/// 承認済みフレンド関係（小さい ID を先に正規化して保持）
fn friendship_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// インメモリ User Repository 実装
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, UserRecord>>,
    friendships: Mutex<HashSet<(UserId, UserId)>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRepository {
    /// 新しい InMemoryUserRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            friendships: Mutex::new(HashSet::new()),
            clock,
        }
    }

    /// ユーザーを追加（既存なら表示名とアバターを上書き）
    pub async fn upsert_user(&self, user_id: UserId, username: &str, avatar: &str) {
        let mut users = self.users.lock().await;
        let last_active = Timestamp::new(self.clock.now_millis());
        users
            .entry(user_id)
            .and_modify(|record| {
                record.profile.username = username.to_string();
                record.profile.avatar = avatar.to_string();
                record.is_deleted = false;
            })
            .or_insert_with(|| UserRecord {
                profile: UserProfile {
                    id: user_id,
                    username: username.to_string(),
                    avatar: avatar.to_string(),
                    status: PresenceStatus::Offline,
                    last_active,
                },
                is_deleted: false,
            });
    }

    /// ユーザーを論理削除（以後のプロフィール取得は NotFound）
    pub async fn soft_delete_user(&self, user_id: UserId) -> bool {
        let mut users = self.users.lock().await;
        match users.get_mut(&user_id) {
            Some(record) if !record.is_deleted => {
                record.is_deleted = true;
                true
            }
            _ => false,
        }
    }

    /// 承認済みのフレンド関係を追加
    pub async fn add_friendship(&self, a: UserId, b: UserId) -> Result<(), RepositoryError> {
        if a == b {
            return Err(RepositoryError::PersistenceFailure(format!(
                "user {} cannot befriend themselves",
                a
            )));
        }
        {
            let users = self.users.lock().await;
            for id in [a, b] {
                if !users.get(&id).is_some_and(|record| !record.is_deleted) {
                    return Err(RepositoryError::NotFound(format!("user {}", id)));
                }
            }
        }
        self.friendships.lock().await.insert(friendship_key(a, b));
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryUserRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, RepositoryError> {
        let users = self.users.lock().await;
        users
            .get(&user_id)
            .filter(|record| !record.is_deleted)
            .map(|record| record.profile.clone())
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user_id)))
    }

    async fn update_status(
        &self,
        user_id: UserId,
        status: PresenceStatus,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        let record = users
            .get_mut(&user_id)
            .filter(|record| !record.is_deleted)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user_id)))?;
        record.profile.status = status;
        record.profile.last_active = Timestamp::new(self.clock.now_millis());
        Ok(())
    }
}

#[async_trait]
impl FriendStore for InMemoryUserRepository {
    async fn get_accepted_friends(&self, user_id: UserId) -> Result<Vec<UserId>, RepositoryError> {
        let friendships = self.friendships.lock().await;
        let users = self.users.lock().await;
        let mut friends: Vec<UserId> = friendships
            .iter()
            .filter_map(|&(a, b)| match (a == user_id, b == user_id) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .filter(|id| users.get(id).is_some_and(|record| !record.is_deleted))
            .collect();
        friends.sort();
        Ok(friends)
    }
}
