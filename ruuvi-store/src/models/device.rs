use ruuvi_proto::SensorType;
use serde::{Deserialize, Serialize};

use super::Table;

/// A registered sensor. Created on first reading from an unseen MAC;
/// the sensor type is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    /// Radio MAC, uppercase colon-separated.
    pub mac: String,
    /// "tag" or "air"; see [`Device::kind`].
    pub sensor_type: String,
    /// Unique per type, auto-generated as `{type}{n}` on first sight.
    pub nickname: String,
    pub description: Option<String>,
    /// Radio-pairing identifier (platform BLE address or UUID).
    pub pairing_id: Option<String>,
}

impl Device {
    pub fn kind(&self) -> Option<SensorType> {
        SensorType::parse(&self.sensor_type)
    }
}

#[derive(Clone)]
pub struct DeviceTable;

impl Table for DeviceTable {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mac TEXT NOT NULL UNIQUE,
                sensor_type TEXT NOT NULL,
                nickname TEXT NOT NULL UNIQUE,
                description TEXT,
                pairing_id TEXT
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS devices;")
    }
}
