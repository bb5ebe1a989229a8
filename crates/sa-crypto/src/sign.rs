//! RSA sign/verify over SHA-512 digests.
//!
//! Every signature-packet kind (ANMID, ANSMID, ANTMID, ANMAID, ANMPID, MAID,
//! PMID, MPID) is an RSA key-pair; its network name is
//! `H(public_key_der || signature)` (see `sa_crypto::hash::signature_packet_name`).

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::CryptoError;

pub const RSA_KEY_BITS: usize = 2048;

/// An RSA key-pair plus its DER-encoded public half (the bytes that get
/// hashed into the packet name and published on the network).
pub struct KeyPair {
    private: RsaPrivateKey,
    public_der: Vec<u8>,
}

impl KeyPair {
    pub fn generate<R: rand::CryptoRng + rand::RngCore>(rng: &mut R) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(rng, RSA_KEY_BITS)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public_der = RsaPublicKey::from(&private)
            .to_public_key_der()
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?
            .into_vec();
        Ok(Self { private, public_der })
    }

    /// Reconstruct a key-pair from a PKCS#8 DER-encoded private key (as
    /// pulled back out of a [`sa_session`] identity record).
    pub fn from_private_der(der: &[u8]) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let public_der = RsaPublicKey::from(&private)
            .to_public_key_der()
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?
            .into_vec();
        Ok(Self { private, public_der })
    }

    pub fn private_key_der(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let der = self
            .private
            .to_pkcs8_der()
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        Ok(Zeroizing::new(der.as_bytes().to_vec()))
    }

    pub fn public_key_der(&self) -> &[u8] {
        &self.public_der
    }

    /// Sign `msg` with this key-pair's private key. Returns a raw PKCS#1 v1.5
    /// signature over SHA-512(msg).
    pub fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
        sign_with_der(&self.private_key_der()?, msg)
    }
}

/// Sign `msg` using a PKCS#8 DER-encoded private key (used when the signer
/// is a *different* identity than the packet being created, e.g. ANMAID
/// signing MAID).
pub fn sign_with_der(private_der: &[u8], msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let private = RsaPrivateKey::from_pkcs8_der(private_der)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let signing_key = SigningKey::<Sha512>::new(private);
    let mut rng = rand::rngs::OsRng;
    let sig = signing_key.sign_with_rng(&mut rng, msg);
    Ok(sig.to_vec())
}

/// Verify `signature` over `msg` against a DER-encoded public key.
pub fn verify(public_der: &[u8], msg: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let public = RsaPublicKey::from_public_key_der(public_der)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let verifying_key = VerifyingKey::<Sha512>::new(public);
    let sig = Signature::try_from(signature).map_err(|_| CryptoError::SignatureVerification)?;
    verifying_key
        .verify(msg, &sig)
        .map_err(|_| CryptoError::SignatureVerification)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let mut rng = rand::rngs::OsRng;
        let kp = KeyPair::generate(&mut rng).unwrap();
        let sig = kp.sign(b"packet payload").unwrap();
        assert!(verify(kp.public_key_der(), b"packet payload", &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let mut rng = rand::rngs::OsRng;
        let kp = KeyPair::generate(&mut rng).unwrap();
        let sig = kp.sign(b"packet payload").unwrap();
        assert!(verify(kp.public_key_der(), b"different payload", &sig).is_err());
    }

    #[test]
    fn private_der_round_trips_through_from_private_der() {
        let mut rng = rand::rngs::OsRng;
        let kp = KeyPair::generate(&mut rng).unwrap();
        let der = kp.private_key_der().unwrap();
        let reloaded = KeyPair::from_private_der(&der).unwrap();
        assert_eq!(kp.public_key_der(), reloaded.public_key_der());
    }
}
