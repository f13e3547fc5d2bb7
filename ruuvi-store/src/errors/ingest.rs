use ruuvi_proto::DecodeError;

use super::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Frame carries no device identity and no source address was given")]
    MissingDeviceId,

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
