use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] sa_crypto::CryptoError),
}
