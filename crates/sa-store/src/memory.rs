//! In-memory reference [`RemoteStore`] implementation — used by tests and
//! the CLI demo, never by production code (the real remote store is
//! treated as an external collaborator).

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sa_proto::{PacketKind, PacketName, StorePolicy};

use crate::error::StoreError;
use crate::remote_store::RemoteStore;

#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<PacketName, Vec<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn load_packet(&self, name: &PacketName) -> Result<Vec<Vec<u8>>, StoreError> {
        let guard = self.values.read();
        guard.get(name).cloned().filter(|v| !v.is_empty()).ok_or(StoreError::NotFound)
    }

    async fn store_packet(
        &self,
        name: &PacketName,
        value: Vec<u8>,
        kind: PacketKind,
        policy: StorePolicy,
        _msid: Option<&PacketName>,
    ) -> Result<(), StoreError> {
        let mut guard = self.values.write();
        match policy {
            StorePolicy::DoNothingReturnFailure => {
                if guard.get(name).is_some_and(|v| !v.is_empty()) {
                    tracing::debug!(?name, ?kind, "store rejected: key already occupied");
                    return Err(StoreError::Nack);
                }
                guard.insert(name.clone(), vec![value]);
            }
            StorePolicy::Append => {
                guard.entry(name.clone()).or_default().push(value);
            }
            StorePolicy::Overwrite => {
                guard.insert(name.clone(), vec![value]);
            }
        }
        Ok(())
    }

    async fn delete_packet(
        &self,
        name: &PacketName,
        values: Vec<Vec<u8>>,
        kind: PacketKind,
    ) -> Result<(), StoreError> {
        let mut guard = self.values.write();
        if values.is_empty() {
            guard.remove(name);
            return Ok(());
        }
        if let Some(stored) = guard.get_mut(name) {
            stored.retain(|v| !values.contains(v));
            if stored.is_empty() {
                guard.remove(name);
            }
            Ok(())
        } else {
            tracing::warn!(?name, ?kind, "deletion witness rejected: no packet at this name");
            Err(StoreError::DeletionWitnessRejected)
        }
    }

    async fn key_unique(&self, name: &PacketName) -> Result<bool, StoreError> {
        let guard = self.values.read();
        Ok(guard.get(name).is_none_or(|v| v.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_proto::PacketName;

    fn name(b: u8) -> PacketName {
        PacketName::from_hash([b; 64])
    }

    #[tokio::test]
    async fn do_nothing_policy_rejects_second_store() {
        let store = MemoryStore::new();
        let n = name(1);
        store
            .store_packet(&n, b"v1".to_vec(), PacketKind::Mid, StorePolicy::DoNothingReturnFailure, None)
            .await
            .unwrap();
        let err = store
            .store_packet(&n, b"v2".to_vec(), PacketKind::Mid, StorePolicy::DoNothingReturnFailure, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Nack));
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = MemoryStore::new();
        let n = name(2);
        store
            .store_packet(&n, b"v1".to_vec(), PacketKind::Mid, StorePolicy::Overwrite, None)
            .await
            .unwrap();
        store
            .store_packet(&n, b"v2".to_vec(), PacketKind::Mid, StorePolicy::Overwrite, None)
            .await
            .unwrap();
        let values = store.load_packet(&n).await.unwrap();
        assert_eq!(values, vec![b"v2".to_vec()]);
    }

    #[tokio::test]
    async fn key_unique_reflects_store_state() {
        let store = MemoryStore::new();
        let n = name(3);
        assert!(store.key_unique(&n).await.unwrap());
        store
            .store_packet(&n, b"v1".to_vec(), PacketKind::Mid, StorePolicy::Overwrite, None)
            .await
            .unwrap();
        assert!(!store.key_unique(&n).await.unwrap());
    }

    #[tokio::test]
    async fn delete_with_empty_values_removes_everything() {
        let store = MemoryStore::new();
        let n = name(4);
        store
            .store_packet(&n, b"v1".to_vec(), PacketKind::Mid, StorePolicy::Append, None)
            .await
            .unwrap();
        store
            .store_packet(&n, b"v2".to_vec(), PacketKind::Mid, StorePolicy::Append, None)
            .await
            .unwrap();
        store.delete_packet(&n, vec![], PacketKind::Mid).await.unwrap();
        assert!(store.load_packet(&n).await.is_err());
    }

    #[tokio::test]
    async fn delete_with_witness_removes_only_matching_entry() {
        let store = MemoryStore::new();
        let n = name(5);
        store
            .store_packet(&n, b"v1".to_vec(), PacketKind::Mid, StorePolicy::Append, None)
            .await
            .unwrap();
        store
            .store_packet(&n, b"v2".to_vec(), PacketKind::Mid, StorePolicy::Append, None)
            .await
            .unwrap();
        store.delete_packet(&n, vec![b"v1".to_vec()], PacketKind::Mid).await.unwrap();
        let remaining = store.load_packet(&n).await.unwrap();
        assert_eq!(remaining, vec![b"v2".to_vec()]);
    }
}
