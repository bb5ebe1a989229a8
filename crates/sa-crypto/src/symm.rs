//! AES-256 symmetric encryption with a deterministic, password-derived IV.
//!
//! Unlike the AEAD schemes elsewhere in this family of codebases, packet
//! ciphertexts here carry no nonce on the wire — the IV is re-derived from
//! the same stretched password used for the key on every decrypt, which is
//! what makes MID/SMID/TMID content recoverable from nothing but
//! `(username, PIN[, password, rid])`. This trades semantic security for
//! determinism on purpose: two packets encrypted under the same derived
//! password always produce the same ciphertext, which is fine here because
//! a given `(key)` is only ever used to wrap exactly one rid or one
//! DataMap generation (see `sa_crypto::kdf`).
//!
//! Wire format: raw AES-256-CBC ciphertext, PKCS#7 padded. No nonce, no tag
//! — integrity comes from the packet store's signature check, not from this
//! layer.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::CryptoError;
use crate::hash;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Derive a 16-byte IV from the encryption key alone, so the same key
/// always yields the same IV (determinism is the point, see module docs).
fn derive_iv(key: &[u8; 32]) -> [u8; 16] {
    let digest = hash::hash_many(&[b"sa-aes-iv-v1", key]);
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&digest[..16]);
    iv
}

/// Encrypt `plaintext` under `key` (32 bytes). Returns PKCS#7-padded
/// AES-256-CBC ciphertext with no prepended nonce.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    let iv = derive_iv(key);
    let enc = Aes256CbcEnc::new(key.into(), &iv.into());
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Inverse of [`encrypt`].
pub fn decrypt(ciphertext: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    let iv = derive_iv(key);
    let dec = Aes256CbcDec::new(key.into(), &iv.into());
    dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::SymmDecrypt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = [7u8; 32];
        let ct = encrypt(b"hello rid", &key).unwrap();
        let pt = decrypt(&ct, &key).unwrap();
        assert_eq!(pt, b"hello rid");
    }

    #[test]
    fn deterministic_under_same_key() {
        let key = [3u8; 32];
        let ct1 = encrypt(b"abc", &key).unwrap();
        let ct2 = encrypt(b"abc", &key).unwrap();
        assert_eq!(ct1, ct2);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let key = [1u8; 32];
        let other = [2u8; 32];
        let ct = encrypt(b"secret rid value", &key).unwrap();
        assert!(decrypt(&ct, &other).is_err());
    }
}
