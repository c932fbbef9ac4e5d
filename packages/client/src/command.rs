//! Parsing of terminal input into invocations.
//!
//! Lines starting with `/` are commands; anything else is a message to the
//! currently selected room.

use thiserror::Error;
use tsudoi_server::infrastructure::dto::websocket::Invocation;

pub const HELP: &str = "\
Commands:
  /room <id>            select the room plain text is sent to
  /join <id>            join a room (also subscribes this connection)
  /leave <id>           leave a room
  /dm <user> <text>     send a direct message
  /read <messageId>     mark a direct message as read
  /typing on|off        typing indicator for the selected room
  /help                 show this help
";

/// What a line of input asks the client to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send this invocation to the server
    Invoke(Invocation),
    /// Change the room plain text goes to (local only)
    SelectRoom(i64),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no room selected, use /room <id> first")]
    NoRoomSelected,

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command '{0}' (try /help)")]
    Unknown(String),
}

fn id_arg(arg: Option<&str>, usage: &'static str) -> Result<i64, CommandError> {
    arg.and_then(|raw| raw.parse().ok())
        .ok_or(CommandError::Usage(usage))
}

/// Parse one line of input.
///
/// # Arguments
///
/// * `line` - Trimmed, non-empty input line
/// * `current_room` - Room selected with `/room`, if any
pub fn parse(line: &str, current_room: Option<i64>) -> Result<Action, CommandError> {
    let Some(rest) = line.strip_prefix('/') else {
        let room_id = current_room.ok_or(CommandError::NoRoomSelected)?;
        return Ok(Action::Invoke(Invocation::SendMessage {
            room_id,
            content: line.to_string(),
            message_type: None,
        }));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    let first = args.split_whitespace().next();

    match name {
        "room" => id_arg(first, "/room <id>").map(Action::SelectRoom),
        "join" => id_arg(first, "/join <id>")
            .map(|room_id| Action::Invoke(Invocation::JoinRoom { room_id })),
        "leave" => id_arg(first, "/leave <id>")
            .map(|room_id| Action::Invoke(Invocation::LeaveRoom { room_id })),
        "read" => id_arg(first, "/read <messageId>")
            .map(|message_id| Action::Invoke(Invocation::MarkMessageAsRead { message_id })),
        "dm" => {
            const USAGE: &str = "/dm <user> <text>";
            let (user, text) = args
                .split_once(char::is_whitespace)
                .ok_or(CommandError::Usage(USAGE))?;
            let receiver_id = id_arg(Some(user), USAGE)?;
            Ok(Action::Invoke(Invocation::SendDirectMessage {
                receiver_id,
                content: text.trim().to_string(),
                message_type: None,
            }))
        }
        "typing" => {
            const USAGE: &str = "/typing on|off";
            let is_typing = match first {
                Some("on") => true,
                Some("off") => false,
                _ => return Err(CommandError::Usage(USAGE)),
            };
            let room_id = current_room.ok_or(CommandError::NoRoomSelected)?;
            Ok(Action::Invoke(Invocation::UserTyping { room_id, is_typing }))
        }
        "help" => Ok(Action::Help),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_goes_to_selected_room() {
        // テスト項目: 通常の入力は選択中のルームへの sendMessage になる
        // given (前提条件):
        let line = "hello there";

        // when (操作):
        let result = parse(line, Some(3));

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(Action::Invoke(Invocation::SendMessage {
                room_id: 3,
                content: "hello there".to_string(),
                message_type: None,
            }))
        );
    }

    #[test]
    fn test_plain_text_without_room_is_rejected() {
        // テスト項目: ルーム未選択での通常入力はエラー
        // given (前提条件):
        let line = "hello";

        // when (操作):
        let result = parse(line, None);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::NoRoomSelected));
    }

    #[test]
    fn test_room_commands() {
        // テスト項目: /room /join /leave /read が ID 付きで解釈される
        // given (前提条件):
        let room = None;

        // when (操作):
        let select = parse("/room 7", room);
        let join = parse("/join 7", room);
        let leave = parse("/leave 7", room);
        let read = parse("/read 42", room);

        // then (期待する結果):
        assert_eq!(select, Ok(Action::SelectRoom(7)));
        assert_eq!(join, Ok(Action::Invoke(Invocation::JoinRoom { room_id: 7 })));
        assert_eq!(leave, Ok(Action::Invoke(Invocation::LeaveRoom { room_id: 7 })));
        assert_eq!(
            read,
            Ok(Action::Invoke(Invocation::MarkMessageAsRead { message_id: 42 }))
        );
    }

    #[test]
    fn test_direct_message_keeps_whole_text() {
        // テスト項目: /dm は宛先以降の全文を本文にする
        // given (前提条件):
        let line = "/dm 2 see you  later";

        // when (操作):
        let result = parse(line, None);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(Action::Invoke(Invocation::SendDirectMessage {
                receiver_id: 2,
                content: "see you  later".to_string(),
                message_type: None,
            }))
        );
    }

    #[test]
    fn test_typing_requires_on_or_off() {
        // テスト項目: /typing は on/off のみ受け付け、選択中のルームに送る
        // given (前提条件):
        let room = Some(5);

        // when (操作):
        let on = parse("/typing on", room);
        let bad = parse("/typing maybe", room);

        // then (期待する結果):
        assert_eq!(
            on,
            Ok(Action::Invoke(Invocation::UserTyping {
                room_id: 5,
                is_typing: true
            }))
        );
        assert_eq!(bad, Err(CommandError::Usage("/typing on|off")));
    }

    #[test]
    fn test_invalid_arguments_and_unknown_commands() {
        // テスト項目: 不正な引数は使い方、未知のコマンドは Unknown
        // given (前提条件):
        let room = None;

        // when (操作):
        let missing = parse("/join", room);
        let not_a_number = parse("/dm bob hi", room);
        let unknown = parse("/shout hi", room);

        // then (期待する結果):
        assert_eq!(missing, Err(CommandError::Usage("/join <id>")));
        assert_eq!(not_a_number, Err(CommandError::Usage("/dm <user> <text>")));
        assert_eq!(unknown, Err(CommandError::Unknown("shout".to_string())));
    }
}
