//! Room directory: maps a room id to the set of connections present.
//!
//! A room with no members is indistinguishable from a room that never
//! existed: entries are pruned as soon as their member set empties, so
//! the directory never accumulates dead rooms.

use std::collections::{HashMap, HashSet};

use studium_types::presence::{ConnectionId, RoomMember};

use super::registry::ConnectionRegistry;

/// Directory of rooms and their current members.
#[derive(Default)]
pub struct RoomDirectory {
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room, creating the room on first join.
    ///
    /// Set semantics: inserting a member that is already present is a
    /// no-op. Returns whether the member was newly inserted.
    pub fn add_member(&mut self, room_id: &str, id: ConnectionId) -> bool {
        self.rooms.entry(room_id.to_string()).or_default().insert(id)
    }

    /// Remove a connection from a room. No-op when the room or member is
    /// absent. Prunes the room entry when its member set becomes empty.
    pub fn remove_member(&mut self, room_id: &str, id: ConnectionId) {
        if let Some(members) = self.rooms.get_mut(room_id) {
            members.remove(&id);
            if members.is_empty() {
                self.rooms.remove(room_id);
            }
        }
    }

    /// Current member ids of a room. Empty when the room is absent.
    pub fn members(&self, room_id: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Resolve the room's members through the registry into a roster.
    ///
    /// A member id without a resolvable identity should not occur (the
    /// engine adds membership only after setting identity); if it does,
    /// the entry is skipped rather than failing the whole roster.
    pub fn roster(&self, room_id: &str, registry: &ConnectionRegistry) -> Vec<RoomMember> {
        let Some(members) = self.rooms.get(room_id) else {
            return Vec::new();
        };

        members
            .iter()
            .filter_map(|id| match registry.display_name(*id) {
                Some(name) => Some(RoomMember::online(name)),
                None => {
                    tracing::warn!(connection = %id, room = room_id, "room member without identity, skipping in roster");
                    None
                }
            })
            .collect()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    #[test]
    fn test_add_member_set_semantics() {
        let mut rooms = RoomDirectory::new();
        let id = ConnectionId::new();

        assert!(rooms.add_member("r1", id));
        assert!(!rooms.add_member("r1", id));
        assert_eq!(rooms.members("r1").len(), 1);
    }

    #[test]
    fn test_missing_room_is_empty() {
        let rooms = RoomDirectory::new();
        assert!(rooms.members("nowhere").is_empty());
    }

    #[test]
    fn test_remove_member_prunes_empty_room() {
        let mut rooms = RoomDirectory::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        rooms.add_member("r1", a);
        rooms.add_member("r1", b);
        rooms.remove_member("r1", a);
        assert_eq!(rooms.room_count(), 1);

        rooms.remove_member("r1", b);
        assert_eq!(rooms.room_count(), 0);
        assert!(rooms.members("r1").is_empty());
    }

    #[test]
    fn test_remove_from_absent_room_is_noop() {
        let mut rooms = RoomDirectory::new();
        rooms.remove_member("nowhere", ConnectionId::new());
        assert_eq!(rooms.room_count(), 0);
    }

    #[test]
    fn test_roster_skips_members_without_identity() {
        let mut rooms = RoomDirectory::new();
        let mut registry = ConnectionRegistry::new();

        let named = ConnectionId::new();
        let anonymous = ConnectionId::new();
        let (tx, _rx) = broadcast::channel(8);
        registry.register(named, tx.clone());
        registry.set_identity(named, "Alice", "r1").unwrap();
        registry.register(anonymous, tx);

        rooms.add_member("r1", named);
        rooms.add_member("r1", anonymous);

        let roster = rooms.roster("r1", &registry);
        assert_eq!(roster, vec![RoomMember::online("Alice")]);
    }
}
