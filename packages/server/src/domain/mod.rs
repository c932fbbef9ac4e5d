//! Domain layer: value objects, entities, events and the ports the core depends on.

pub mod command;
pub mod entity;
pub mod error;
pub mod event;
pub mod identity;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use command::ChatCommand;
pub use entity::{
    ChatMessage, ChatRoom, DirectMessage, EnrichedDirectMessage, EnrichedRoomMessage,
    NewChatRoom, PresenceStatus, RoomMembership, RoomRole, RoomView, UserProfile,
};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event::ServerEvent;
pub use identity::IdentityResolver;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::{ConnectOutcome, ConnectionRegistry, DisconnectOutcome};
pub use repository::{FriendStore, MembershipStore, MessageStore, ProfileStore, RoomStore};
pub use value_object::{
    ConnectionId, GroupKey, MessageContent, MessageId, MessageKind, Page, RoomId, RoomName,
    Timestamp, UserId,
};

#[cfg(test)]
pub use repository::{
    MockFriendStore, MockMembershipStore, MockMessageStore, MockProfileStore, MockRoomStore,
};
