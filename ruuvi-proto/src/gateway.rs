//! Adapter for pre-decoded gateway `/history` tag records.
//!
//! Gateway, MQTT and cloud collaborators deliver JSON that already carries
//! physical units, so these records bypass the binary decoder and map
//! straight onto [`CanonicalReading`].

use serde::Deserialize;

use crate::error::DecodeError;
use crate::models::{CanonicalReading, DataFormat, SensorType};

/// One tag entry of a gateway `/history` response, wire field names as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayRecord {
    #[serde(rename = "dataFormat")]
    pub data_format: u8,
    /// Unix seconds at which the gateway heard the advertisement.
    pub timestamp: i64,
    #[serde(rename = "measurementSequenceNumber", default)]
    pub measurement_sequence: Option<u32>,

    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,

    #[serde(rename = "CO2", default)]
    pub co2: Option<u16>,
    #[serde(rename = "VOC", default)]
    pub voc: Option<u16>,
    #[serde(rename = "NOx", default)]
    pub nox: Option<u16>,
    #[serde(rename = "PM1.0", default)]
    pub pm_1_0: Option<f64>,
    #[serde(rename = "PM2.5", default)]
    pub pm_2_5: Option<f64>,
    #[serde(rename = "PM4.0", default)]
    pub pm_4_0: Option<f64>,
    #[serde(rename = "PM10.0", default)]
    pub pm_10_0: Option<f64>,

    #[serde(rename = "accelX", default)]
    pub acceleration_x: Option<f64>,
    #[serde(rename = "accelY", default)]
    pub acceleration_y: Option<f64>,
    #[serde(rename = "accelZ", default)]
    pub acceleration_z: Option<f64>,
    #[serde(rename = "movementCounter", default)]
    pub movement_counter: Option<u8>,
    #[serde(rename = "voltage", default)]
    pub battery_voltage: Option<f64>,
    #[serde(rename = "txPower", default)]
    pub tx_power: Option<i8>,

    #[serde(default)]
    pub rssi: Option<i16>,
}

impl GatewayRecord {
    /// Normalizes into the canonical representation for the given device.
    ///
    /// Fields that do not belong to the format's sensor type are cleared:
    /// a reading is either tag-shaped or air-shaped, never both.
    pub fn into_reading(self, device_id: impl Into<String>) -> Result<CanonicalReading, DecodeError> {
        let format = DataFormat::from_code(self.data_format)
            .ok_or(DecodeError::UnsupportedFormat(self.data_format))?;

        let mut reading = CanonicalReading::new(device_id, self.timestamp, format);
        reading.temperature = self.temperature;
        reading.humidity = self.humidity;
        reading.pressure = self.pressure;
        reading.rssi = self.rssi;

        match format.sensor_type() {
            SensorType::Air => {
                reading.co2 = self.co2;
                reading.voc = self.voc;
                reading.nox = self.nox;
                reading.pm_1_0 = self.pm_1_0;
                reading.pm_2_5 = self.pm_2_5;
                reading.pm_4_0 = self.pm_4_0;
                reading.pm_10_0 = self.pm_10_0;
            }
            SensorType::Tag => {
                reading.acceleration_x = self.acceleration_x;
                reading.acceleration_y = self.acceleration_y;
                reading.acceleration_z = self.acceleration_z;
                reading.movement_counter = self.movement_counter;
                reading.battery_voltage = self.battery_voltage;
                reading.tx_power = self.tx_power;
            }
        }

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_record_maps_wire_names() {
        let record: GatewayRecord = serde_json::from_str(
            r#"{
                "dataFormat": 225,
                "timestamp": 1712345678,
                "measurementSequenceNumber": 4711,
                "temperature": 23.06,
                "humidity": 57.13,
                "pressure": 97614,
                "CO2": 545,
                "VOC": 57,
                "NOx": 1,
                "PM1.0": 19.2,
                "PM2.5": 20.5,
                "PM4.0": 20.9,
                "PM10.0": 21.1,
                "rssi": -68
            }"#,
        )
        .unwrap();

        let reading = record.into_reading("AA:BB:CC:DD:EE:FF").unwrap();
        assert_eq!(reading.sensor_type, SensorType::Air);
        assert_eq!(reading.format, DataFormat::ExtendedV1);
        assert_eq!(reading.timestamp, 1712345678);
        assert_eq!(reading.co2, Some(545));
        assert_eq!(reading.pm_2_5, Some(20.5));
        assert_eq!(reading.rssi, Some(-68));
        assert_eq!(reading.acceleration_x, None);
    }

    #[test]
    fn tag_record_keeps_missing_fields_absent() {
        let record: GatewayRecord = serde_json::from_str(
            r#"{
                "dataFormat": 5,
                "timestamp": 1712345000,
                "temperature": 0.0,
                "accelX": 0.004,
                "accelY": -0.004,
                "accelZ": 1.036,
                "movementCounter": 66,
                "voltage": 2.977,
                "txPower": 4
            }"#,
        )
        .unwrap();

        let reading = record.into_reading("CB:B8:33:4C:88:4F").unwrap();
        assert_eq!(reading.sensor_type, SensorType::Tag);
        // Zero is a value; missing keys stay absent.
        assert_eq!(reading.temperature, Some(0.0));
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.movement_counter, Some(66));
        assert_eq!(reading.co2, None);
    }

    #[test]
    fn unknown_format_is_an_error() {
        let record: GatewayRecord =
            serde_json::from_str(r#"{"dataFormat": 8, "timestamp": 0}"#).unwrap();
        assert_eq!(
            record.into_reading("AA:BB:CC:DD:EE:FF").unwrap_err(),
            DecodeError::UnsupportedFormat(8)
        );
    }
}
