//! sa-packets — the packet factory: per-kind `create`, `get_data`,
//! and `packet_name` operations.
//!
//! # Module layout
//! - `names`     — deterministic name derivation for MID/SMID/TMID/MPID
//! - `signature` — signature-packet creation (the 8 identity-key kinds + MSID)
//! - `mid_smid`  — MID/SMID content (encrypted rid)
//! - `tmid`      — TMID content (encrypted DataMap)
//! - `error`     — unified error type

pub mod error;
pub mod mid_smid;
pub mod names;
pub mod signature;
pub mod tmid;

pub use error::PacketError;
pub use signature::SignaturePacket;
