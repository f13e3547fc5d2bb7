mod aggregate;
mod reading_service;
mod registry;
mod resolution;

pub use aggregate::{bucketize, Bucket, FieldStat};
pub use reading_service::{DeviceSeries, InsertOutcome, QueryRequest, ReadingService, SeriesPoints};
pub use registry::DeviceRegistry;
pub use resolution::{select, Resolution, DEFAULT_POINT_BUDGET, LADDER};
