//! Signature-packet creation: the 8 identity-key kinds that make up the
//! `SYSTEM_SIGNATURE_CHAIN`, plus MSID (self-signed, minted per share).
//!
//! `create(params) -> result`: for signature kinds, draws a fresh key-pair
//! (supplied by the caller, generated via `sa_crypto::KeyPairPool`),
//! self-signs or signs with the indicated signer's private key, and
//! returns `{name, public_key, private_key, signature, serialized_packet}`.

use sa_crypto::{hash, sign, KeyPair};
use sa_proto::{IdentityKeyRecord, PacketKind, PacketName};
use zeroize::Zeroizing;

use crate::error::PacketError;

/// Everything a freshly created signature packet carries — the
/// `{name, public_key, private_key, signature, serialized_packet}` tuple,
/// plus the kind it was created for.
pub struct SignaturePacket {
    pub record: IdentityKeyRecord,
    /// The bytes stored on the network at `record.id` (the public key —
    /// the private key never leaves the client).
    pub serialized_packet: Vec<u8>,
}

/// Create a signature packet of `kind`.
///
/// `key_pair` is a freshly drawn RSA key-pair (from
/// `sa_crypto::KeyPairPool`). `signer` is `Some(signer_private_key_der)`
/// when `kind.signer_kind()` is `Some(_)` (MAID, PMID, MPID); `None` for
/// the self-signed anonymous kinds and MSID.
pub fn create(
    kind: PacketKind,
    key_pair: KeyPair,
    signer_private_key_der: Option<&[u8]>,
) -> Result<SignaturePacket, PacketError> {
    let public_key_der = key_pair.public_key_der().to_vec();

    let signature = match signer_private_key_der {
        Some(signer_der) => sign::sign_with_der(signer_der, &public_key_der)?,
        None => key_pair.sign(&public_key_der)?,
    };

    let name = PacketName::from_hash(hash::signature_packet_name(&public_key_der, &signature));
    let private_key_der: Zeroizing<Vec<u8>> = key_pair.private_key_der()?;

    let record = IdentityKeyRecord {
        kind,
        id: name,
        private_key_der,
        public_key_der: public_key_der.clone(),
        public_key_signature: signature,
    };

    Ok(SignaturePacket { serialized_packet: public_key_der, record })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn self_signed_packet_name_is_hash_of_key_and_signature() {
        let kp = KeyPair::generate(&mut OsRng).unwrap();
        let packet = create(PacketKind::AnMaid, kp, None).unwrap();
        let expected = hash::signature_packet_name(
            &packet.record.public_key_der,
            &packet.record.public_key_signature,
        );
        assert_eq!(packet.record.id.as_bytes(), &expected);
    }

    #[test]
    fn signed_by_another_identity_verifies() {
        let anmaid_kp = KeyPair::generate(&mut OsRng).unwrap();
        let anmaid = create(PacketKind::AnMaid, anmaid_kp, None).unwrap();

        let maid_kp = KeyPair::generate(&mut OsRng).unwrap();
        let maid = create(PacketKind::Maid, maid_kp, Some(&anmaid.record.private_key_der)).unwrap();

        sign::verify(
            &anmaid.record.public_key_der,
            &maid.record.public_key_der,
            &maid.record.public_key_signature,
        )
        .expect("MAID's public key should verify against ANMAID's signature");
    }
}
