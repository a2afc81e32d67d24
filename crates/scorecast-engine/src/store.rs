//! Collaborator contracts for destination storage and the managed platform.

use thiserror::Error;
use tracing::debug;

use scorecast_ipc::{BroadcastDetails, Destination, DestinationDraft, RemoteBroadcast};

/// Errors reported by the destination store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given id.
    #[error("Destination {0} not found")]
    NotFound(u32),

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Errors reported by the managed platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The account is not linked or the token was refused.
    #[error("Not authorized with the platform")]
    Unauthorized,

    /// The request did not complete.
    #[error("Network error: {0}")]
    Network(String),
}

/// Persistent storage for destinations.
pub trait DestinationStore: Send {
    /// All destinations, ordered by id.
    fn list(&mut self) -> Result<Vec<Destination>, StoreError>;

    /// Store a new destination and return it with its assigned id.
    fn add(&mut self, draft: DestinationDraft) -> Result<Destination, StoreError>;

    /// Replace an existing destination.
    fn update(&mut self, destination: Destination) -> Result<(), StoreError>;

    /// Delete a destination. Deleting a missing id is not an error.
    fn delete(&mut self, id: u32) -> Result<(), StoreError>;
}

/// Broadcast management on the managed video platform.
pub trait BroadcastPlatform: Send {
    /// Broadcasts owned by the linked account.
    fn list_broadcasts(&mut self) -> Result<Vec<RemoteBroadcast>, PlatformError>;

    /// Schedule a new broadcast.
    fn schedule(&mut self, details: &BroadcastDetails) -> Result<RemoteBroadcast, PlatformError>;
}

/// In-memory destination store.
///
/// Ids are assigned as one past the current maximum, matching what the
/// on-device store does.
#[derive(Debug, Default)]
pub struct MemoryDestinationStore {
    destinations: Vec<Destination>,
}

impl MemoryDestinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with records.
    pub fn with_destinations(mut destinations: Vec<Destination>) -> Self {
        destinations.sort_by_key(|d| d.id);
        Self { destinations }
    }

    fn next_id(&self) -> u32 {
        self.destinations.iter().map(|d| d.id).max().unwrap_or(0) + 1
    }
}

impl DestinationStore for MemoryDestinationStore {
    fn list(&mut self) -> Result<Vec<Destination>, StoreError> {
        Ok(self.destinations.clone())
    }

    fn add(&mut self, draft: DestinationDraft) -> Result<Destination, StoreError> {
        let destination = draft.with_id(self.next_id());
        debug!(id = destination.id, name = %destination.name, "Destination added");
        self.destinations.push(destination.clone());
        Ok(destination)
    }

    fn update(&mut self, destination: Destination) -> Result<(), StoreError> {
        let slot = self
            .destinations
            .iter_mut()
            .find(|d| d.id == destination.id)
            .ok_or(StoreError::NotFound(destination.id))?;
        *slot = destination;
        Ok(())
    }

    fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        self.destinations.retain(|d| d.id != id);
        Ok(())
    }
}

/// Platform used when no account is linked.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnlinkedPlatform;

impl BroadcastPlatform for UnlinkedPlatform {
    fn list_broadcasts(&mut self) -> Result<Vec<RemoteBroadcast>, PlatformError> {
        Err(PlatformError::Unauthorized)
    }

    fn schedule(&mut self, _details: &BroadcastDetails) -> Result<RemoteBroadcast, PlatformError> {
        Err(PlatformError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> DestinationDraft {
        DestinationDraft {
            name: name.to_string(),
            url: format!("rtmp://{}/app/", name.to_lowercase()),
            key: String::new(),
        }
    }

    #[test]
    fn test_ids_follow_max() {
        let mut store = MemoryDestinationStore::new();
        assert_eq!(store.add(draft("A")).unwrap().id, 1);
        assert_eq!(store.add(draft("B")).unwrap().id, 2);

        store.delete(1).unwrap();
        assert_eq!(store.add(draft("C")).unwrap().id, 3);

        let ids: Vec<u32> = store.list().unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_update_missing_is_error() {
        let mut store = MemoryDestinationStore::new();
        let missing = draft("A").with_id(7);
        assert!(matches!(store.update(missing), Err(StoreError::NotFound(7))));
    }

    #[test]
    fn test_update_replaces_record() {
        let mut store = MemoryDestinationStore::new();
        let mut destination = store.add(draft("Twitch")).unwrap();
        destination.key = "abc".to_string();
        store.update(destination.clone()).unwrap();
        assert_eq!(store.list().unwrap(), vec![destination]);
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let mut store = MemoryDestinationStore::new();
        assert!(store.delete(42).is_ok());
    }

    #[test]
    fn test_unlinked_platform_refuses() {
        let mut platform = UnlinkedPlatform;
        assert!(matches!(
            platform.list_broadcasts(),
            Err(PlatformError::Unauthorized)
        ));
    }
}
