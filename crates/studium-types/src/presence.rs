//! Presence and room-broadcast event types.
//!
//! These are the room-scoped events the presence engine fans out to every
//! connection in a room. The payload shapes mirror what the web client
//! renders; they are serialized as JSON text frames with a `type` tag.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Ephemeral identifier for one live transport connection.
///
/// Generated at socket accept time; never reused after disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Generate a fresh connection id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry in a room roster broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    pub display_name: String,
    pub status: String,
}

impl RoomMember {
    /// A member that is currently connected. Presence only tracks live
    /// connections, so this is the only status the engine ever emits.
    pub fn online(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            status: "online".to_string(),
        }
    }
}

/// Outbound room-scoped event fanned out by the presence engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A new member entered the room. Sent to every *other* member.
    MemberJoined {
        display_name: String,
        message: String,
        timestamp: String,
    },
    /// A member left the room. Sent to the remaining members.
    MemberLeft {
        display_name: String,
        message: String,
        timestamp: String,
    },
    /// Full membership list, refreshed after every join/leave.
    RoomRoster { members: Vec<RoomMember> },
    /// A chat message, echoed to every member including the sender.
    ChatMessage {
        display_name: String,
        text: String,
        timestamp: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn test_room_event_tagged_serde() {
        let event = RoomEvent::ChatMessage {
            display_name: "Alice".to_string(),
            text: "hello".to_string(),
            timestamp: "12:00:00".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"chat_message\""));
        let parsed: RoomEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_roster_serde() {
        let event = RoomEvent::RoomRoster {
            members: vec![RoomMember::online("Alice"), RoomMember::online("Bob")],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"room_roster\""));
        assert!(json.contains("\"status\":\"online\""));
    }
}
