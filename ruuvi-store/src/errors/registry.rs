#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Device {mac} is registered as '{existing}' but reported '{reported}'")]
    TypeConflict {
        mac: String,
        existing: String,
        reported: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
