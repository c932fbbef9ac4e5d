//! Request handlers and the identity extractors they share.

mod http;
mod identity;
mod websocket;

pub use http::{
    create_room, get_direct_messages, get_presence, get_room_detail, get_room_messages,
    get_rooms, health_check, join_room, leave_room,
};
pub use websocket::websocket_handler;
