//! Deterministic password stretching.
//!
//! Every derivation here must be a pure function of its inputs: the same
//! `(username, pin[, password, rid])` must yield the same 32-byte key on
//! every platform, every run, forever — that is what lets a user log back
//! in from a fresh machine. This rules out randomized salts; instead the
//! salt is itself derived from the inputs (Argon2id still gets the benefit
//! of its memory-hard mixing, it just loses salt *secrecy*, which we don't
//! need here since the "salt" is effectively the username/PIN being
//! authenticated against).

use argon2::{Argon2, Params, Version};
use hkdf::Hkdf;
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash;

/// Argon2id parameters. Deliberately modest (interactive, client-side use;
/// this runs on every login, not once).
fn argon2_params() -> Params {
    Params::new(19 * 1024, 2, 1, Some(32)).expect("static Argon2 params are always valid")
}

fn argon2_stretch(ikm: &[u8], salt: &[u8]) -> Result<[u8; 32], CryptoError> {
    let salt32 = hash::hash(salt);
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params());
    let mut out = [0u8; 32];
    argon2
        .hash_password_into(ikm, &salt32[..16], &mut out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(out)
}

/// `secure_password(username, pin) -> derived_key`.
///
/// Used to encrypt/decrypt the MID/SMID `rid`.
pub fn secure_password(username: &str, pin: &str) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let ikm = hash::hash_many(&[username.as_bytes(), b"\x00", pin.as_bytes()]);
    Ok(Zeroizing::new(argon2_stretch(&ikm, b"sa-mid-smid-v1")?))
}

/// Password used to encrypt/decrypt a TMID's serialized DataMap.
///
/// Stretches `(username, pin, password, rid)` — the `rid` binds the key to
/// one particular session generation, so rotating `rid` (SaveSession)
/// automatically invalidates the previous TMID key.
pub fn tmid_password(
    username: &str,
    pin: &str,
    password: &str,
    rid: u32,
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let ikm = hash::hash_many(&[
        username.as_bytes(),
        b"\x00",
        pin.as_bytes(),
        b"\x00",
        password.as_bytes(),
        b"\x00",
        &rid.to_be_bytes(),
    ]);
    let stretched = argon2_stretch(&ikm, b"sa-tmid-v1")?;

    // One more HKDF pass keyed on the rid so distinct rids can never collide
    // even if two users happened to share the Argon2 output (belt and
    // braces — the `rid` is already in `ikm` above).
    let hk = Hkdf::<Sha512>::new(Some(&rid.to_be_bytes()), &stretched);
    let mut out = [0u8; 32];
    hk.expand(b"sa-tmid-key", &mut out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(Zeroizing::new(out))
}
