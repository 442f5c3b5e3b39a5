//! Presence state machine and broadcast fan-out.
//!
//! Each connection moves through Connected (registered, anonymous) ->
//! Joined (identity and room set) -> Gone (removed). One mutex guards the
//! (registry, directory) pair for the duration of a transition, and every
//! broadcast is enqueued onto bounded per-connection channels with a
//! non-blocking send while that lock is held. Since enqueueing never
//! blocks, events triggered on a room are observed by all of its members
//! in the order the engine processed them, and a slow consumer can only
//! lose its own events, never stall anyone else's. On overflow the
//! channel drops its oldest events, so a lagging member always keeps the
//! freshest view of the room.

use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::broadcast;

use studium_types::error::PresenceError;
use studium_types::presence::{ConnectionId, RoomEvent};

use super::registry::ConnectionRegistry;
use super::rooms::RoomDirectory;

/// In-memory presence state: who is connected, and in which room.
#[derive(Default)]
struct PresenceState {
    registry: ConnectionRegistry,
    rooms: RoomDirectory,
}

/// Orchestrates join/leave/disconnect transitions and room broadcasts.
///
/// The engine is the single serialization point for presence mutations.
/// The transport layer (WebSocket handler) calls in concurrently from
/// many connections; every transition runs under the state lock.
#[derive(Default)]
pub struct PresenceEngine {
    state: Mutex<PresenceState>,
}

impl PresenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new transport connection arrived. Registers it with its bounded
    /// outbound channel. Enters `Connected`.
    pub fn on_connect(&self, id: ConnectionId, outbound: broadcast::Sender<RoomEvent>) {
        let mut state = self.state.lock().expect("presence state lock poisoned");
        state.registry.register(id, outbound);
        tracing::debug!(connection = %id, "connection registered");
    }

    /// A connection joins a room under a display name.
    ///
    /// Re-joining while already in a room performs the leave transition
    /// for the prior room first. Broadcasts `member_joined` to the other
    /// members, then the refreshed roster to everyone including the
    /// joiner. Enters `Joined`.
    pub fn on_join(
        &self,
        id: ConnectionId,
        room_id: &str,
        display_name: &str,
    ) -> Result<(), PresenceError> {
        let mut state = self.state.lock().expect("presence state lock poisoned");

        if !state.registry.contains(id) {
            return Err(PresenceError::NotRegistered);
        }

        // Leave the previous room before switching.
        if let Some((prior_name, prior_room)) = state.registry.identity(id) {
            if prior_room != room_id {
                Self::leave_room(&mut state, id, &prior_room, &prior_name);
            }
        }

        state.registry.set_identity(id, display_name, room_id)?;
        state.rooms.add_member(room_id, id);

        let joined = RoomEvent::MemberJoined {
            display_name: display_name.to_string(),
            message: format!("{display_name} joined the study room"),
            timestamp: timestamp(),
        };
        Self::broadcast(&state, room_id, &joined, Some(id));

        let roster = RoomEvent::RoomRoster {
            members: state.rooms.roster(room_id, &state.registry),
        };
        Self::broadcast(&state, room_id, &roster, None);

        tracing::info!(connection = %id, room = room_id, name = display_name, "member joined room");
        Ok(())
    }

    /// A connection sends a chat message to its room.
    ///
    /// A message from a connection that never joined a room is dropped
    /// silently (logged at debug level, no broadcast, no error event) --
    /// membership is the only gate on room traffic.
    pub fn on_send(&self, id: ConnectionId, text: &str) {
        let state = self.state.lock().expect("presence state lock poisoned");

        let Some((display_name, room_id)) = state.registry.identity(id) else {
            tracing::debug!(connection = %id, "dropping chat message from connection without identity");
            return;
        };

        let event = RoomEvent::ChatMessage {
            display_name,
            text: text.to_string(),
            timestamp: timestamp(),
        };
        // Echo: the sender is a room member and receives its own message.
        Self::broadcast(&state, &room_id, &event, None);
    }

    /// A transport connection closed.
    ///
    /// When the connection had joined a room, the remaining members get a
    /// `member_left` notice and a refreshed roster. The registry entry is
    /// removed regardless of prior state. Enters `Gone`.
    pub fn on_disconnect(&self, id: ConnectionId) {
        let mut state = self.state.lock().expect("presence state lock poisoned");

        if let Some((display_name, room_id)) = state.registry.identity(id) {
            Self::leave_room(&mut state, id, &room_id, &display_name);
            tracing::info!(connection = %id, room = %room_id, "member disconnected");
        }

        state.registry.remove(id);
    }

    /// Shared leave transition: remove membership, notify the remaining
    /// members, and send them the refreshed roster.
    fn leave_room(state: &mut PresenceState, id: ConnectionId, room_id: &str, display_name: &str) {
        state.rooms.remove_member(room_id, id);

        let left = RoomEvent::MemberLeft {
            display_name: display_name.to_string(),
            message: format!("{display_name} left the study room"),
            timestamp: timestamp(),
        };
        Self::broadcast(state, room_id, &left, None);

        let roster = RoomEvent::RoomRoster {
            members: state.rooms.roster(room_id, &state.registry),
        };
        Self::broadcast(state, room_id, &roster, None);
    }

    /// Fan an event out to every member of a room, optionally excluding
    /// one connection (the joiner, for `member_joined`).
    ///
    /// Enqueueing is non-blocking: a member whose channel is full loses
    /// its oldest queued events (the receiver observes the lag) without
    /// delaying delivery to the others.
    fn broadcast(
        state: &PresenceState,
        room_id: &str,
        event: &RoomEvent,
        exclude: Option<ConnectionId>,
    ) {
        for member in state.rooms.members(room_id) {
            if Some(member) == exclude {
                continue;
            }
            let Some(sender) = state.registry.sender(member) else {
                continue;
            };
            if sender.send(event.clone()).is_err() {
                // Receiver already gone; disconnect cleanup will follow.
                tracing::debug!(connection = %member, "outbound channel closed");
            }
        }
    }
}

fn timestamp() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
