//! The remote-store adapter contract.
//!
//! Conceptually this boundary is callback-driven (`load_packet(name, cb)`)
//! with the guarantee of *at-most-one* callback per call, eventual
//! delivery, and no reordering within a single call, but no ordering
//! across calls. An `async fn` on a `Send + Sync` trait object gives
//! exactly that: each call is its own independent future, `.await`
//! resolves it exactly once, and nothing here imposes cross-call ordering
//! — the caller decides what to join (`tokio::join!`) and what to run
//! sequentially.
//!
//! The content-addressed remote packet/chunk store is treated as an
//! external collaborator: production code would implement this trait
//! against the actual DHT/vault; [`crate::memory::MemoryStore`] is a
//! reference implementation used only by tests and the CLI demo.

use async_trait::async_trait;
use sa_proto::{PacketKind, PacketName, StorePolicy};

use crate::error::StoreError;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All values stored under `name` (a packet may carry several signed
    /// values under one name in append mode). `Err(StoreError::NotFound)`
    /// if nothing is stored there.
    async fn load_packet(&self, name: &PacketName) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Store `value` at `name` under `policy`. `msid` is the private-share
    /// identity a share-scoped store is authorised under, if any.
    async fn store_packet(
        &self,
        name: &PacketName,
        value: Vec<u8>,
        kind: PacketKind,
        policy: StorePolicy,
        msid: Option<&PacketName>,
    ) -> Result<(), StoreError>;

    /// Delete packet values at `name`. An empty `values` deletes every
    /// value stored there; a non-empty list deletes only matching entries
    /// (each entry doubling as the deletion witness for that value).
    async fn delete_packet(
        &self,
        name: &PacketName,
        values: Vec<Vec<u8>>,
        kind: PacketKind,
    ) -> Result<(), StoreError>;

    /// `true` iff no value is stored at `name`.
    async fn key_unique(&self, name: &PacketName) -> Result<bool, StoreError>;
}
