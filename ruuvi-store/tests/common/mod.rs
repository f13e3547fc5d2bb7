use std::sync::Arc;

use ruuvi_proto::{CanonicalReading, DataFormat};

use ruuvi_store::configs::{Database, SchemaManager, Storage};
use ruuvi_store::services::{ReadingService, DEFAULT_POINT_BUDGET};

pub struct MockStore {
    pub storage: Arc<Storage>,
    pub service: ReadingService,
}

impl MockStore {
    pub async fn new() -> Self {
        let storage = Arc::new(
            Storage::new(
                Database {
                    url: String::from("sqlite::memory:"),
                    clean_start: true,
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        );
        let service = ReadingService::new(storage.clone(), DEFAULT_POINT_BUDGET);

        Self { storage, service }
    }
}

/// An air-quality reading with a few representative fields set.
pub fn air_reading(mac: &str, timestamp: i64) -> CanonicalReading {
    let mut reading = CanonicalReading::new(mac, timestamp, DataFormat::ExtendedV1);
    reading.temperature = Some(22.5);
    reading.humidity = Some(45.0);
    reading.co2 = Some(600);
    reading.pm_2_5 = Some(4.2);
    reading
}

/// A RuuviTag reading in the RAWv2 format.
pub fn tag_reading(mac: &str, timestamp: i64) -> CanonicalReading {
    let mut reading = CanonicalReading::new(mac, timestamp, DataFormat::RawV2);
    reading.temperature = Some(18.0);
    reading.acceleration_z = Some(1.012);
    reading.battery_voltage = Some(2.977);
    reading
}

/// Wraps a bare Ruuvi payload in a BLE advertisement frame with the
/// manufacturer-specific section header.
pub fn advertisement(payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x02, 0x01, 0x06, (payload.len() + 3) as u8, 0xFF, 0x99, 0x04];
    frame.extend_from_slice(payload);
    frame
}
