use ruuvi_proto::{CanonicalReading, DataFormat};
use serde::{Deserialize, Serialize};

use super::Table;

/// One persisted sensor sample. `(device_id, timestamp)` is unique across
/// the whole store; which transport delivered the sample does not matter.
///
/// Physical fields are nullable columns: NULL means the source payload had
/// the field absent, which is distinct from a stored zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub device_id: i64,
    /// Unix seconds.
    pub timestamp: i64,
    /// Wire-format code of the decode that produced this row (provenance,
    /// not part of the dedup key).
    pub data_format: i64,

    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub co2: Option<i64>,
    pub pm_1_0: Option<f64>,
    pub pm_2_5: Option<f64>,
    pub pm_4_0: Option<f64>,
    pub pm_10_0: Option<f64>,
    pub voc: Option<i64>,
    pub nox: Option<i64>,
    pub luminosity: Option<f64>,
    pub acceleration_x: Option<f64>,
    pub acceleration_y: Option<f64>,
    pub acceleration_z: Option<f64>,
    pub movement_counter: Option<i64>,
    pub battery_voltage: Option<f64>,
    pub tx_power: Option<i64>,
    pub rssi: Option<i64>,
}

impl Reading {
    /// Builds a row for insertion (`id` is assigned by the store).
    pub fn from_canonical(device_id: i64, reading: &CanonicalReading) -> Self {
        Self {
            id: 0,
            device_id,
            timestamp: reading.timestamp,
            data_format: reading.format.code() as i64,
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
            co2: reading.co2.map(i64::from),
            pm_1_0: reading.pm_1_0,
            pm_2_5: reading.pm_2_5,
            pm_4_0: reading.pm_4_0,
            pm_10_0: reading.pm_10_0,
            voc: reading.voc.map(i64::from),
            nox: reading.nox.map(i64::from),
            luminosity: reading.luminosity,
            acceleration_x: reading.acceleration_x,
            acceleration_y: reading.acceleration_y,
            acceleration_z: reading.acceleration_z,
            movement_counter: reading.movement_counter.map(i64::from),
            battery_voltage: reading.battery_voltage,
            tx_power: reading.tx_power.map(i64::from),
            rssi: reading.rssi.map(i64::from),
        }
    }

    pub fn format(&self) -> Option<DataFormat> {
        u8::try_from(self.data_format).ok().and_then(DataFormat::from_code)
    }
}

#[derive(Clone)]
pub struct ReadingTable;

impl Table for ReadingTable {
    fn name(&self) -> &'static str {
        "readings"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                data_format INTEGER NOT NULL,
                temperature REAL,
                humidity REAL,
                pressure REAL,
                co2 INTEGER,
                pm_1_0 REAL,
                pm_2_5 REAL,
                pm_4_0 REAL,
                pm_10_0 REAL,
                voc INTEGER,
                nox INTEGER,
                luminosity REAL,
                acceleration_x REAL,
                acceleration_y REAL,
                acceleration_z REAL,
                movement_counter INTEGER,
                battery_voltage REAL,
                tx_power INTEGER,
                rssi INTEGER,
                UNIQUE (device_id, timestamp),
                FOREIGN KEY (device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS readings;")
    }
}
