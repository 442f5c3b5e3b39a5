//! Connection registry: maps a connection id to its identity and room.
//!
//! Pure in-memory map with no side effects. The engine owns the only
//! instance and serializes access through its state lock.

use std::collections::HashMap;

use tokio::sync::broadcast;

use studium_types::error::PresenceError;
use studium_types::presence::{ConnectionId, RoomEvent};

/// One registered connection.
///
/// `display_name` and `room_id` stay `None` until the connection joins a
/// room; both are set together by [`ConnectionRegistry::set_identity`].
pub struct ConnectionEntry {
    pub outbound: broadcast::Sender<RoomEvent>,
    pub display_name: Option<String>,
    pub room_id: Option<String>,
}

/// Registry of live connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection with its outbound event queue.
    ///
    /// No-op if the connection is already registered; the original
    /// queue handle is kept.
    pub fn register(&mut self, id: ConnectionId, outbound: broadcast::Sender<RoomEvent>) {
        self.entries.entry(id).or_insert(ConnectionEntry {
            outbound,
            display_name: None,
            room_id: None,
        });
    }

    /// Set the display name and room for a registered connection.
    pub fn set_identity(
        &mut self,
        id: ConnectionId,
        display_name: &str,
        room_id: &str,
    ) -> Result<(), PresenceError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(PresenceError::NotRegistered)?;
        entry.display_name = Some(display_name.to_string());
        entry.room_id = Some(room_id.to_string());
        Ok(())
    }

    /// Resolve a connection's identity: `(display_name, room_id)`.
    ///
    /// Returns `None` when the connection is unknown or has not joined a
    /// room yet.
    pub fn identity(&self, id: ConnectionId) -> Option<(String, String)> {
        let entry = self.entries.get(&id)?;
        match (&entry.display_name, &entry.room_id) {
            (Some(name), Some(room)) => Some((name.clone(), room.clone())),
            _ => None,
        }
    }

    /// The display name of a connection, if it has one.
    pub fn display_name(&self, id: ConnectionId) -> Option<&str> {
        self.entries.get(&id)?.display_name.as_deref()
    }

    /// The outbound queue handle for a connection.
    pub fn sender(&self, id: ConnectionId) -> Option<&broadcast::Sender<RoomEvent>> {
        self.entries.get(&id).map(|e| &e.outbound)
    }

    /// Whether a connection is registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Remove a connection. Idempotent: removing an absent id is a no-op.
    pub fn remove(&mut self, id: ConnectionId) {
        self.entries.remove(&id);
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> broadcast::Sender<RoomEvent> {
        broadcast::channel(8).0
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();

        registry.register(id, channel());
        assert!(registry.contains(id));
        // No identity until join
        assert!(registry.identity(id).is_none());

        registry.set_identity(id, "Alice", "r1").unwrap();
        assert_eq!(
            registry.identity(id),
            Some(("Alice".to_string(), "r1".to_string()))
        );
        assert_eq!(registry.display_name(id), Some("Alice"));
    }

    #[test]
    fn test_register_twice_is_noop() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();

        registry.register(id, channel());
        registry.set_identity(id, "Alice", "r1").unwrap();
        registry.register(id, channel());

        // Identity survives the duplicate register
        assert_eq!(registry.display_name(id), Some("Alice"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_identity_unknown_connection() {
        let mut registry = ConnectionRegistry::new();
        let err = registry
            .set_identity(ConnectionId::new(), "Alice", "r1")
            .unwrap_err();
        assert_eq!(err, PresenceError::NotRegistered);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();

        registry.register(id, channel());
        registry.remove(id);
        assert!(!registry.contains(id));

        // Removing again does not panic or error
        registry.remove(id);
        assert!(registry.is_empty());
    }
}
