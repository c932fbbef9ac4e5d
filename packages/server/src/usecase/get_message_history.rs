//! UseCase: メッセージ履歴取得
//!
//! 履歴の各行には、取得時点の送信者プロフィールを付けます。
//! 削除済みユーザーは代替プロフィールで表示します。

use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    EnrichedDirectMessage, EnrichedRoomMessage, MembershipStore, MessageStore, Page,
    ProfileStore, RepositoryError, RoomId, RoomStore, UserId, UserProfile,
};

use super::error::{HistoryError, classify};

/// 1 回の履歴取得の中でプロフィールを使い回すキャッシュ
struct ProfileCache<'a> {
    profiles: &'a dyn ProfileStore,
    cache: HashMap<UserId, UserProfile>,
}

impl<'a> ProfileCache<'a> {
    fn new(profiles: &'a dyn ProfileStore) -> Self {
        Self {
            profiles,
            cache: HashMap::new(),
        }
    }

    async fn get(&mut self, user_id: UserId) -> Result<UserProfile, RepositoryError> {
        if let Some(profile) = self.cache.get(&user_id) {
            return Ok(profile.clone());
        }
        let profile = match self.profiles.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(RepositoryError::NotFound(_)) => UserProfile::unknown(user_id),
            Err(e) => return Err(e),
        };
        self.cache.insert(user_id, profile.clone());
        Ok(profile)
    }
}

/// メッセージ履歴取得のユースケース
pub struct GetMessageHistoryUseCase {
    rooms: Arc<dyn RoomStore>,
    memberships: Arc<dyn MembershipStore>,
    profiles: Arc<dyn ProfileStore>,
    messages: Arc<dyn MessageStore>,
}

impl GetMessageHistoryUseCase {
    /// 新しい GetMessageHistoryUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        memberships: Arc<dyn MembershipStore>,
        profiles: Arc<dyn ProfileStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            rooms,
            memberships,
            profiles,
            messages,
        }
    }

    /// ルームの履歴（新しい順）
    ///
    /// 非公開ルームはメンバーだけが読める（それ以外には RoomNotFound）。
    pub async fn room_history(
        &self,
        user_id: UserId,
        room_id: RoomId,
        page: Page,
    ) -> Result<Vec<EnrichedRoomMessage>, HistoryError> {
        let to_error = |e: RepositoryError| {
            classify(
                e,
                HistoryError::RoomNotFound(room_id),
                HistoryError::RepositoryError,
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
            return Err(HistoryError::RoomNotFound(room_id));
        }

        let messages = self
            .messages
            .room_messages(room_id, page)
            .await
            .map_err(|e| HistoryError::RepositoryError(e.to_string()))?;
        let mut profiles = ProfileCache::new(self.profiles.as_ref());
        let mut history = Vec::with_capacity(messages.len());
        for message in messages {
            let sender = profiles
                .get(message.sender_id)
                .await
                .map_err(|e| HistoryError::RepositoryError(e.to_string()))?;
            history.push(EnrichedRoomMessage { message, sender });
        }
        Ok(history)
    }

    /// 2 ユーザー間の DM 履歴（新しい順）
    pub async fn direct_history(
        &self,
        user_id: UserId,
        other_id: UserId,
        page: Page,
    ) -> Result<Vec<EnrichedDirectMessage>, HistoryError> {
        let messages = self
            .messages
            .direct_messages(user_id, other_id, page)
            .await
            .map_err(|e| HistoryError::RepositoryError(e.to_string()))?;
        let mut profiles = ProfileCache::new(self.profiles.as_ref());
        let mut history = Vec::with_capacity(messages.len());
        for message in messages {
            let sender = profiles
                .get(message.sender_id)
                .await
                .map_err(|e| HistoryError::RepositoryError(e.to_string()))?;
            let receiver = profiles
                .get(message.receiver_id)
                .await
                .map_err(|e| HistoryError::RepositoryError(e.to_string()))?;
            history.push(EnrichedDirectMessage {
                message,
                sender,
                receiver,
            });
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageContent, MessageKind},
        usecase::testing::{World, uid},
    };

    fn create_usecase(world: &World) -> GetMessageHistoryUseCase {
        GetMessageHistoryUseCase::new(
            world.rooms.clone(),
            world.rooms.clone(),
            world.users.clone(),
            world.messages.clone(),
        )
    }

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_room_history_is_enriched_with_current_profile() {
        // テスト項目: 履歴は新しい順で、取得時点のプロフィールが付く
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        for text in ["first", "second"] {
            world
                .messages
                .insert_room_message(room_id, uid(1), content(text), MessageKind::Text)
                .await
                .unwrap();
        }
        world.users.upsert_user(uid(1), "alice2", "new.png").await;
        let usecase = create_usecase(&world);

        // when (操作):
        let history = usecase
            .room_history(uid(2), room_id, Page::default())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message.content.as_str(), "second");
        assert_eq!(history[0].sender.username, "alice2");
    }

    #[tokio::test]
    async fn test_private_room_history_requires_membership() {
        // テスト項目: 非公開ルームの履歴はメンバー以外には見えない
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), true).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let result = usecase.room_history(uid(2), room_id, Page::default()).await;

        // then (期待する結果):
        assert_eq!(result, Err(HistoryError::RoomNotFound(room_id)));
    }

    #[tokio::test]
    async fn test_direct_history_with_deleted_sender() {
        // テスト項目: 削除済みユーザーの DM は代替プロフィールで返る
        // given (前提条件):
        let world = World::new().await;
        world
            .messages
            .insert_direct_message(uid(3), uid(1), content("bye"), MessageKind::Text)
            .await
            .unwrap();
        world.users.soft_delete_user(uid(3)).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let history = usecase
            .direct_history(uid(1), uid(3), Page::default())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sender, UserProfile::unknown(uid(3)));
        assert_eq!(history[0].receiver.username, "alice");
    }
}
