//! Identity key record — one per signature-packet kind.

use zeroize::Zeroizing;

use crate::kind::PacketKind;
use crate::packet_name::PacketName;

/// A stored RSA identity: its network name, both halves of the key-pair,
/// and the signature binding the public half to its signer.
///
/// Held only in memory by the session store — never serialized, so the
/// private key never has to cross a `serde` boundary.
#[derive(Clone)]
pub struct IdentityKeyRecord {
    pub kind: PacketKind,
    pub id: PacketName,
    pub private_key_der: Zeroizing<Vec<u8>>,
    pub public_key_der: Vec<u8>,
    pub public_key_signature: Vec<u8>,
}

impl std::fmt::Debug for IdentityKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKeyRecord")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("public_key_der_len", &self.public_key_der.len())
            .finish_non_exhaustive()
    }
}
