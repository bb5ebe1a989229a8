//! sa-store — the remote-store adapter: the `RemoteStore` trait
//! production code is written against, plus an in-memory reference
//! implementation for tests and the CLI demo.

pub mod error;
pub mod memory;
pub mod remote_store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use remote_store::RemoteStore;
