//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{
    ChatRoom, MembershipStore, ProfileStore, RepositoryError, RoomStore, RoomView, UserId,
    UserProfile,
};

/// メンバー数と作成者プロフィールを付けたビューを組み立てる
///
/// 作成者が削除済みの場合は代替プロフィールを使う。
pub(crate) async fn build_room_view(
    room: ChatRoom,
    memberships: &dyn MembershipStore,
    profiles: &dyn ProfileStore,
) -> Result<RoomView, RepositoryError> {
    let members_count = memberships.count_members(room.id).await?;
    let creator = match profiles.get_profile(room.creator_id).await {
        Ok(profile) => profile,
        Err(RepositoryError::NotFound(_)) => UserProfile::unknown(room.creator_id),
        Err(e) => return Err(e),
    };
    Ok(RoomView {
        room,
        members_count,
        creator,
    })
}

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    rooms: Arc<dyn RoomStore>,
    memberships: Arc<dyn MembershipStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
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

    /// ユーザーから見えるルーム（参加中または公開、新しい順）
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<RoomView>, RepositoryError> {
        let rooms = self.rooms.list_rooms_visible_to(user_id).await?;
        let mut views = Vec::with_capacity(rooms.len());
        for room in rooms {
            views.push(
                build_room_view(room, self.memberships.as_ref(), self.profiles.as_ref()).await?,
            );
        }
        Ok(views)
    }
}
