//! sa-crypto — cryptographic primitives and key-pair pool for the
//! self-authentication packet engine.
//!
//! # Design principles
//! - No custom crypto; every primitive is a thin wrapper over an audited
//!   RustCrypto crate.
//! - All key material that can be zeroized is (`Zeroizing`/`ZeroizeOnDrop`).
//! - Every derivation that must be reproducible across logins is a pure,
//!   deterministic function of its inputs — no random salts/nonces.
//!
//! # Module layout
//! - `hash`  — SHA-512 (fixed algorithm)
//! - `symm`  — AES-256-CBC with a password-derived IV
//! - `sign`  — RSA-2048 sign/verify over SHA-512
//! - `kdf`   — deterministic password stretching
//! - `rid`   — 32-bit session identifier sampling
//! - `pool`  — bounded RSA key-pair pre-generation pool
//! - `error` — unified error type

pub mod error;
pub mod hash;
pub mod kdf;
pub mod pool;
pub mod rid;
pub mod sign;
pub mod symm;

pub use error::CryptoError;
pub use pool::KeyPairPool;
pub use sign::KeyPair;
