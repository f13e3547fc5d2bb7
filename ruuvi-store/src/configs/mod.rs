mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Database, Logger, Query, Settings, SettingsError};
pub use storage::Storage;
