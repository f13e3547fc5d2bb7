mod ingest;
mod query;
mod registry;

pub use ingest::IngestError;
pub use query::QueryError;
pub use registry::RegistryError;
