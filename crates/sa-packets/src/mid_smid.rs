//! MID/SMID content: an encrypted 32-bit `rid`, symmetric-encrypted under
//! `secure_password(username, PIN)`.

use sa_crypto::{kdf, rid as rid_mod, symm};

use crate::error::PacketError;

pub struct MidSmidCreated {
    pub enc_rid: Vec<u8>,
    pub rid: u32,
}

/// Sample a fresh rid (not in `forbidden`) and encrypt it under
/// `secure_password(username, PIN)`.
pub fn create(username: &str, pin: &str, forbidden: &[u32]) -> Result<MidSmidCreated, PacketError> {
    let rid = rid_mod::sample_rid(forbidden)?;
    let enc_rid = encrypt_rid(username, pin, rid)?;
    Ok(MidSmidCreated { enc_rid, rid })
}

/// Encrypt a specific (already-chosen) rid — used when re-storing the same
/// rid under a new packet (e.g. SaveSession promoting the current MID rid
/// into the SMID slot).
pub fn encrypt_rid(username: &str, pin: &str, rid: u32) -> Result<Vec<u8>, PacketError> {
    let key = kdf::secure_password(username, pin)?;
    Ok(symm::encrypt(&rid.to_be_bytes(), &key)?)
}

/// Inverse of [`create`]/[`encrypt_rid`]: recover the rid from a stored
/// MID/SMID ciphertext.
pub fn get_data(ciphertext: &[u8], username: &str, pin: &str) -> Result<u32, PacketError> {
    let key = kdf::secure_password(username, pin)?;
    let plaintext = symm::decrypt(ciphertext, &key)?;
    if plaintext.len() != 4 {
        return Err(PacketError::Crypto(sa_crypto::CryptoError::SymmDecrypt));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&plaintext);
    Ok(u32::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let created = create("alice", "1234", &[]).unwrap();
        let recovered = get_data(&created.enc_rid, "alice", "1234").unwrap();
        assert_eq!(recovered, created.rid);
    }

    #[test]
    fn wrong_pin_fails() {
        let created = create("alice", "1234", &[]).unwrap();
        assert!(get_data(&created.enc_rid, "alice", "0001").is_err());
    }

    #[test]
    fn avoids_forbidden_rids() {
        let first = create("alice", "1234", &[]).unwrap();
        let second = create("alice", "1234", &[first.rid]).unwrap();
        assert_ne!(first.rid, second.rid);
    }
}
