//! The session store: mutable state held for one logged-in (or
//! logging-in) client. Instantiated once per client by the authentication
//! engine's constructor — never a process-wide singleton.
//!
//! Every public method takes and releases the lock within the call; no
//! lock is ever held across a remote-store `.await`.

use std::collections::HashMap;

use parking_lot::RwLock;
use sa_proto::{IdentityKeyRecord, PacketKind, PacketName};

use crate::error::SessionError;

#[derive(Default, Clone)]
struct Inner {
    username: Option<String>,
    pin: Option<String>,
    password: Option<String>,
    keys: HashMap<PacketKind, IdentityKeyRecord>,
    mid_rid: u32,
    smid_rid: u32,
    tmid_content: Option<Vec<u8>>,
    smid_tmid_content: Option<Vec<u8>>,
    private_shares: HashMap<String, PacketName>,
}

/// A point-in-time copy of everything a flow might need to roll back to
/// on failure (identity rotation, password change).
#[derive(Clone)]
pub struct SessionSnapshot(Inner);

/// Per-client mutable session state.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<Inner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- credentials --------------------------------------------------

    pub fn username(&self) -> Option<String> {
        self.inner.read().username.clone()
    }

    pub fn pin(&self) -> Option<String> {
        self.inner.read().pin.clone()
    }

    pub fn password(&self) -> Option<String> {
        self.inner.read().password.clone()
    }

    /// Commit `username`/`pin` unconditionally, even on a subsequent
    /// "user doesn't exist" outcome; callers are expected to check the
    /// returned result before trusting the session (documented in
    /// `DESIGN.md`).
    pub fn set_identity(&self, username: impl Into<String>, pin: impl Into<String>) {
        let mut guard = self.inner.write();
        guard.username = Some(username.into());
        guard.pin = Some(pin.into());
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.inner.write().password = Some(password.into());
    }

    // -- identity keys --------------------------------------------------

    /// Rejects if a record of this kind already exists: no two records
    /// of the same kind may coexist in one session.
    pub fn add_key(&self, record: IdentityKeyRecord) -> Result<(), SessionError> {
        let mut guard = self.inner.write();
        if guard.keys.contains_key(&record.kind) {
            tracing::warn!(kind = ?record.kind, "refusing to overwrite existing session key");
            return Err(SessionError::KeyAlreadyExists(record.kind));
        }
        guard.keys.insert(record.kind, record);
        Ok(())
    }

    /// Idempotent: removing an absent kind is not an error.
    pub fn remove_key(&self, kind: PacketKind) {
        self.inner.write().keys.remove(&kind);
    }

    pub fn key(&self, kind: PacketKind) -> Option<IdentityKeyRecord> {
        self.inner.read().keys.get(&kind).cloned()
    }

    pub fn keys(&self) -> Vec<IdentityKeyRecord> {
        self.inner.read().keys.values().cloned().collect()
    }

    // -- rid / TMID rotation state ---------------------------------------

    pub fn mid_rid(&self) -> u32 {
        self.inner.read().mid_rid
    }

    pub fn smid_rid(&self) -> u32 {
        self.inner.read().smid_rid
    }

    pub fn set_mid_rid(&self, rid: u32) {
        self.inner.write().mid_rid = rid;
    }

    pub fn set_smid_rid(&self, rid: u32) {
        self.inner.write().smid_rid = rid;
    }

    pub fn tmid_content(&self) -> Option<Vec<u8>> {
        self.inner.read().tmid_content.clone()
    }

    pub fn smid_tmid_content(&self) -> Option<Vec<u8>> {
        self.inner.read().smid_tmid_content.clone()
    }

    pub fn set_tmid_content(&self, content: Vec<u8>) {
        self.inner.write().tmid_content = Some(content);
    }

    pub fn set_smid_tmid_content(&self, content: Vec<u8>) {
        self.inner.write().smid_tmid_content = Some(content);
    }

    // -- private shares (MSID) -------------------------------------------

    pub fn add_private_share(&self, label: impl Into<String>, msid: PacketName) {
        self.inner.write().private_shares.insert(label.into(), msid);
    }

    pub fn remove_private_share(&self, label: &str) -> Option<PacketName> {
        self.inner.write().private_shares.remove(label)
    }

    pub fn private_share(&self, label: &str) -> Option<PacketName> {
        self.inner.read().private_shares.get(label).cloned()
    }

    // -- snapshot / reset -------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot(self.inner.read().clone())
    }

    pub fn restore(&self, snapshot: SessionSnapshot) {
        *self.inner.write() = snapshot.0;
    }

    /// Clears all fields. Required between user sessions, including inside
    /// test harnesses.
    pub fn reset(&self) {
        *self.inner.write() = Inner::default();
        tracing::debug!("session store reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn dummy_record(kind: PacketKind) -> IdentityKeyRecord {
        IdentityKeyRecord {
            kind,
            id: PacketName::from_hash([7u8; 64]),
            private_key_der: Zeroizing::new(vec![1, 2, 3]),
            public_key_der: vec![4, 5, 6],
            public_key_signature: vec![7, 8, 9],
        }
    }

    #[test]
    fn add_key_rejects_duplicate_kind() {
        let store = SessionStore::new();
        store.add_key(dummy_record(PacketKind::Maid)).unwrap();
        let err = store.add_key(dummy_record(PacketKind::Maid)).unwrap_err();
        assert!(matches!(err, SessionError::KeyAlreadyExists(PacketKind::Maid)));
    }

    #[test]
    fn remove_key_is_idempotent() {
        let store = SessionStore::new();
        store.remove_key(PacketKind::Maid);
        store.add_key(dummy_record(PacketKind::Maid)).unwrap();
        store.remove_key(PacketKind::Maid);
        store.remove_key(PacketKind::Maid);
        assert!(store.key(PacketKind::Maid).is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let store = SessionStore::new();
        store.set_identity("alice", "1234");
        store.set_mid_rid(42);
        store.add_key(dummy_record(PacketKind::Maid)).unwrap();
        store.reset();
        assert_eq!(store.username(), None);
        assert_eq!(store.mid_rid(), 0);
        assert!(store.key(PacketKind::Maid).is_none());
    }

    #[test]
    fn snapshot_and_restore_round_trip() {
        let store = SessionStore::new();
        store.set_identity("alice", "1234");
        store.set_mid_rid(42);
        let snap = store.snapshot();

        store.set_mid_rid(99);
        store.set_identity("mallory", "0001");
        assert_eq!(store.mid_rid(), 99);

        store.restore(snap);
        assert_eq!(store.mid_rid(), 42);
        assert_eq!(store.username().as_deref(), Some("alice"));
    }
}
