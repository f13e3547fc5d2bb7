#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid time range: start {start} is after end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
