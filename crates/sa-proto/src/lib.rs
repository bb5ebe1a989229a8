//! sa-proto — domain/wire types shared by the packet factory, the session
//! store, the remote-store adapter, and the authentication engine.
//!
//! # Module layout
//! - `kind`         — the closed `PacketKind` enumeration and signer mapping
//! - `packet_name`  — the 64-byte content-addressed name type
//! - `identity`     — `IdentityKeyRecord`
//! - `datamap`      — opaque `DataMap` envelope with a parse-checkable header
//! - `store_policy` — `StorePolicy` for `store_packet`
//! - `validate`     — pure input-validation predicates

pub mod datamap;
pub mod identity;
pub mod kind;
pub mod packet_name;
pub mod store_policy;
pub mod validate;

pub use datamap::DataMap;
pub use identity::IdentityKeyRecord;
pub use kind::PacketKind;
pub use packet_name::PacketName;
pub use store_policy::StorePolicy;
