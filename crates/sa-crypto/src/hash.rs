//! SHA-512 hashing — the one fixed hash algorithm used throughout the
//! packet graph (MID/SMID/TMID name derivation, signature-packet names).

use sha2::{Digest, Sha512};

/// `H(data) -> 64 bytes`. Fixed algorithm, no negotiation.
pub fn hash(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut buf = [0u8; 64];
    buf.copy_from_slice(&out);
    buf
}

/// Convenience: hash several slices as if they were concatenated, without
/// allocating the concatenation first.
pub fn hash_many(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let out = hasher.finalize();
    let mut buf = [0u8; 64];
    buf.copy_from_slice(&out);
    buf
}

/// Name of a signature packet: `H(public_key || signature)`.
pub fn signature_packet_name(public_key_der: &[u8], signature: &[u8]) -> [u8; 64] {
    hash_many(&[public_key_der, signature])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash(b"alice"), hash(b"alice"));
        assert_ne!(hash(b"alice"), hash(b"bob"));
    }

    #[test]
    fn hash_many_matches_concatenation() {
        let concat = hash(b"foobar");
        let split = hash_many(&[b"foo", b"bar"]);
        assert_eq!(concat, split);
    }
}
