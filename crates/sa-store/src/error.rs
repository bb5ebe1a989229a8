use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A value is already stored at this name")]
    Nack,

    #[error("No value stored at this name")]
    NotFound,

    #[error("Deletion witness rejected for this packet")]
    DeletionWitnessRejected,

    #[error("Backend error: {0}")]
    Backend(String),
}
