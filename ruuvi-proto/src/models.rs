use serde::{Deserialize, Serialize};

/// Device family a reading originates from. Determines which optional
/// fields of a [`CanonicalReading`] are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    /// RuuviTag: motion and power fields.
    Tag,
    /// Ruuvi Air: air-quality fields.
    Air,
}

impl SensorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Tag => "tag",
            SensorType::Air => "air",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tag" => Some(SensorType::Tag),
            "air" => Some(SensorType::Air),
            _ => None,
        }
    }
}

/// Wire format of a decoded advertisement, retained for provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    /// RuuviTag RAWv1 (format 3).
    RawV1,
    /// RuuviTag RAWv2 (format 5).
    RawV2,
    /// Ruuvi Air BLE4 broadcast (format 6).
    Format6,
    /// Ruuvi Air extended (format 0xE1 / 225).
    ExtendedV1,
}

impl DataFormat {
    pub const fn code(self) -> u8 {
        match self {
            DataFormat::RawV1 => 0x03,
            DataFormat::RawV2 => 0x05,
            DataFormat::Format6 => 0x06,
            DataFormat::ExtendedV1 => 0xE1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x03 => Some(DataFormat::RawV1),
            0x05 => Some(DataFormat::RawV2),
            0x06 => Some(DataFormat::Format6),
            0xE1 => Some(DataFormat::ExtendedV1),
            _ => None,
        }
    }

    pub const fn sensor_type(self) -> SensorType {
        match self {
            DataFormat::RawV1 | DataFormat::RawV2 => SensorType::Tag,
            DataFormat::Format6 | DataFormat::ExtendedV1 => SensorType::Air,
        }
    }

    /// Shortest payload (format byte included) the decoder accepts.
    pub const fn min_len(self) -> usize {
        match self {
            DataFormat::RawV1 => 5,
            DataFormat::RawV2 | DataFormat::Format6 => 24,
            DataFormat::ExtendedV1 => 29,
        }
    }
}

/// One normalized sensor sample, independent of the transport and wire
/// format that produced it.
///
/// Every physical field is optional: a sentinel (or missing key) in the
/// source stays `None` here. Zero and absent are distinct values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalReading {
    /// Stable identifier of the physical sensor (radio MAC, uppercase).
    pub device_id: String,
    /// Unix seconds; with `device_id` forms the dedup key.
    pub timestamp: i64,
    pub sensor_type: SensorType,
    pub format: DataFormat,

    /// °C
    pub temperature: Option<f64>,
    /// % RH
    pub humidity: Option<f64>,
    /// Pa
    pub pressure: Option<f64>,

    // Ruuvi Air fields
    /// ppm, 0-40000
    pub co2: Option<u16>,
    /// µg/m³
    pub pm_1_0: Option<f64>,
    /// µg/m³
    pub pm_2_5: Option<f64>,
    /// µg/m³
    pub pm_4_0: Option<f64>,
    /// µg/m³
    pub pm_10_0: Option<f64>,
    /// index, 0-500
    pub voc: Option<u16>,
    /// index, 1-500
    pub nox: Option<u16>,
    /// lux
    pub luminosity: Option<f64>,

    // RuuviTag fields
    /// G
    pub acceleration_x: Option<f64>,
    /// G
    pub acceleration_y: Option<f64>,
    /// G
    pub acceleration_z: Option<f64>,
    /// increments on detected motion
    pub movement_counter: Option<u8>,
    /// V
    pub battery_voltage: Option<f64>,
    /// dBm
    pub tx_power: Option<i8>,

    /// received signal strength, dBm (set by the transport, not the payload)
    pub rssi: Option<i16>,
}

impl CanonicalReading {
    /// Empty reading for the given identity; all physical fields absent.
    pub fn new(device_id: impl Into<String>, timestamp: i64, format: DataFormat) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            sensor_type: format.sensor_type(),
            format,
            temperature: None,
            humidity: None,
            pressure: None,
            co2: None,
            pm_1_0: None,
            pm_2_5: None,
            pm_4_0: None,
            pm_10_0: None,
            voc: None,
            nox: None,
            luminosity: None,
            acceleration_x: None,
            acceleration_y: None,
            acceleration_z: None,
            movement_counter: None,
            battery_voltage: None,
            tx_power: None,
            rssi: None,
        }
    }
}
