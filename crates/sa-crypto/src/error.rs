use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Signature verification failed")]
    SignatureVerification,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Symmetric encryption failed")]
    SymmEncrypt,

    #[error("Symmetric decryption failed (bad key, corrupt ciphertext, or tampering)")]
    SymmDecrypt,

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("No rid could be sampled outside the forbidden set after {0} attempts")]
    RidExhausted(usize),

    #[error("Key-pair pool is shut down")]
    PoolShutDown,

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
