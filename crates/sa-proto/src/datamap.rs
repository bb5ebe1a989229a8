//! `DataMap` — the serialized root pointer TMID unlocks. Its internal
//! structure is out of scope here: the engine only needs to (a) wrap
//! arbitrary caller-supplied bytes for storage and (b) tell a
//! successfully-decrypted DataMap apart from garbage produced by
//! decrypting with the wrong password, so login can report a password
//! failure on the latter.
//!
//! We do this with a minimal self-describing envelope (magic + version +
//! length-prefixed payload) rather than trusting that *any* byte string is
//! a plausible DataMap — a wrong password decrypting to four bytes of
//! noise should fail the parse check, not silently "succeed" with garbage.

const MAGIC: &[u8; 4] = b"SADM";
const VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMap {
    pub payload: Vec<u8>,
}

impl DataMap {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Serialize to the wire envelope that gets symmetric-encrypted into a
    /// TMID packet.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + self.payload.len());
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Inverse of [`encode`]. Fails (deliberately indistinguishable from a
    /// wrong password) if the envelope header doesn't match.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 5 || &bytes[0..4] != MAGIC || bytes[4] != VERSION {
            return None;
        }
        Some(Self { payload: bytes[5..].to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let dm = DataMap::new(b"serialized datamap bytes".to_vec());
        let encoded = dm.encode();
        let decoded = DataMap::decode(&encoded).unwrap();
        assert_eq!(dm, decoded);
    }

    #[test]
    fn rejects_garbage() {
        assert!(DataMap::decode(b"not a datamap at all").is_none());
    }
}
