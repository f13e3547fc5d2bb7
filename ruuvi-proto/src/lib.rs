pub mod decoder;
pub mod error;
pub mod gateway;
pub mod models;

pub use decoder::{Decoded, decode, scan_frame};
pub use error::DecodeError;
pub use gateway::GatewayRecord;
pub use models::{CanonicalReading, DataFormat, SensorType};
