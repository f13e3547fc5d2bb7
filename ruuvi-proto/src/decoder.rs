//! Decoders for Ruuvi BLE advertisement payloads.
//!
//! Each wire format gets one pure routine: bytes in, [`Decoded`] out.
//! Sentinel raw values decode to `None`, never to zero; scale and bias
//! apply only to non-sentinel values.

use crate::error::DecodeError;
use crate::models::{CanonicalReading, DataFormat};

/// Sensor values parsed from one advertisement payload.
///
/// Identity (device, receive time, signal strength) is the caller's to
/// supply; formats 5 and 0xE1 embed the sender MAC and it is surfaced
/// here when present.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub format: DataFormat,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub co2: Option<u16>,
    pub pm_1_0: Option<f64>,
    pub pm_2_5: Option<f64>,
    pub pm_4_0: Option<f64>,
    pub pm_10_0: Option<f64>,
    pub voc: Option<u16>,
    pub nox: Option<u16>,
    pub luminosity: Option<f64>,
    pub acceleration_x: Option<f64>,
    pub acceleration_y: Option<f64>,
    pub acceleration_z: Option<f64>,
    pub movement_counter: Option<u8>,
    pub battery_voltage: Option<f64>,
    pub tx_power: Option<i8>,
    /// MAC embedded in the payload, uppercase colon-separated.
    pub mac: Option<String>,
    /// Per-device counter; informational only, never a dedup key.
    pub measurement_sequence: Option<u32>,
}

impl Decoded {
    fn empty(format: DataFormat) -> Self {
        Self {
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
            mac: None,
            measurement_sequence: None,
        }
    }

    /// Attaches identity, producing the canonical representation.
    /// The measurement sequence is provenance only and is dropped here.
    pub fn into_reading(
        self,
        device_id: impl Into<String>,
        timestamp: i64,
        rssi: Option<i16>,
    ) -> CanonicalReading {
        let mut reading = CanonicalReading::new(device_id, timestamp, self.format);
        reading.temperature = self.temperature;
        reading.humidity = self.humidity;
        reading.pressure = self.pressure;
        reading.co2 = self.co2;
        reading.pm_1_0 = self.pm_1_0;
        reading.pm_2_5 = self.pm_2_5;
        reading.pm_4_0 = self.pm_4_0;
        reading.pm_10_0 = self.pm_10_0;
        reading.voc = self.voc;
        reading.nox = self.nox;
        reading.luminosity = self.luminosity;
        reading.acceleration_x = self.acceleration_x;
        reading.acceleration_y = self.acceleration_y;
        reading.acceleration_z = self.acceleration_z;
        reading.movement_counter = self.movement_counter;
        reading.battery_voltage = self.battery_voltage;
        reading.tx_power = self.tx_power;
        reading.rssi = rssi;
        reading
    }
}

/// Locates the Ruuvi payload inside a full BLE advertisement frame.
///
/// Scans for the manufacturer-specific section (`FF 99 04`); a frame that
/// already starts with a known format byte is accepted as a bare payload.
pub fn scan_frame(frame: &[u8]) -> Result<&[u8], DecodeError> {
    const MANUFACTURER: [u8; 3] = [0xFF, 0x99, 0x04];

    if frame.len() > MANUFACTURER.len() {
        for idx in 0..frame.len() - MANUFACTURER.len() {
            if frame[idx..idx + 3] == MANUFACTURER {
                return Ok(&frame[idx + 3..]);
            }
        }
    }

    match frame.first().copied().and_then(DataFormat::from_code) {
        Some(_) => Ok(frame),
        None => Err(DecodeError::NoRuuviPayload),
    }
}

/// Decodes one payload, dispatching on the leading format byte.
///
/// Pure and deterministic: the same bytes always yield the same result,
/// and decode errors are permanent (retrying cannot succeed).
pub fn decode(payload: &[u8]) -> Result<Decoded, DecodeError> {
    let &code = payload.first().ok_or(DecodeError::NoRuuviPayload)?;
    let format = DataFormat::from_code(code).ok_or(DecodeError::UnsupportedFormat(code))?;

    if payload.len() < format.min_len() {
        return Err(DecodeError::TruncatedPayload {
            format,
            expected: format.min_len(),
            actual: payload.len(),
        });
    }

    Ok(match format {
        DataFormat::RawV1 => decode_raw_v1(payload),
        DataFormat::RawV2 => decode_raw_v2(payload),
        DataFormat::Format6 => decode_format6(payload),
        DataFormat::ExtendedV1 => decode_extended_v1(payload),
    })
}

fn u16_be(payload: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([payload[offset], payload[offset + 1]])
}

fn s16_be(payload: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([payload[offset], payload[offset + 1]])
}

fn u24_be(payload: &[u8], offset: usize) -> u32 {
    ((payload[offset] as u32) << 16)
        | ((payload[offset + 1] as u32) << 8)
        | payload[offset + 2] as u32
}

fn mac_string(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
    parts.join(":")
}

/// Battery voltage (upper 11 bits, mV + 1600) and TX power (lower 5 bits,
/// 2n - 40 dBm) share one 16-bit field; 0xFFFF means both absent.
fn split_power(raw: u16) -> (Option<f64>, Option<i8>) {
    if raw == 0xFFFF {
        return (None, None);
    }
    let battery = ((raw >> 5) as f64 + 1600.0) / 1000.0;
    let tx = ((raw & 0x1F) as i8) * 2 - 40;
    (Some(battery), Some(tx))
}

/// 9-bit air-quality index: the value byte is the MSB, one flags bit the
/// LSB. 0xFF in the value byte means absent.
fn packed_index(msb: u8, flags: u8, lsb_bit: u8) -> Option<u16> {
    if msb == 0xFF {
        return None;
    }
    Some(((msb as u16) << 1) | ((flags >> lsb_bit) & 1) as u16)
}

/// RuuviTag RAWv1 (format 3).
///
/// 1: humidity (x 0.5 %); 2: temperature integer, sign in bit 7;
/// 3: temperature fraction (/ 100); 4-5: pressure (+ 50000 Pa);
/// 6-11: acceleration x/y/z (signed mG); 12-13: battery/TX power field.
/// Fields past the 5-byte minimum decode only when present.
fn decode_raw_v1(payload: &[u8]) -> Decoded {
    let mut out = Decoded::empty(DataFormat::RawV1);

    out.humidity = Some(payload[1] as f64 * 0.5);

    let magnitude = (payload[2] & 0x7F) as f64 + payload[3] as f64 / 100.0;
    out.temperature = Some(if payload[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    });

    if payload.len() >= 6 {
        out.pressure = Some(u16_be(payload, 4) as f64 + 50000.0);
    }
    if payload.len() >= 12 {
        out.acceleration_x = Some(s16_be(payload, 6) as f64 / 1000.0);
        out.acceleration_y = Some(s16_be(payload, 8) as f64 / 1000.0);
        out.acceleration_z = Some(s16_be(payload, 10) as f64 / 1000.0);
    }
    if payload.len() >= 14 {
        let (battery, tx) = split_power(u16_be(payload, 12));
        out.battery_voltage = battery;
        out.tx_power = tx;
    }

    out
}

/// RuuviTag RAWv2 (format 5), fixed 24-byte layout.
///
/// 1-2: temperature (signed, x 0.005 degC, 0x8000 absent); 3-4: humidity
/// (x 0.0025 %, 0xFFFF absent); 5-6: pressure (+ 50000 Pa, 0xFFFF absent);
/// 7-12: acceleration x/y/z (signed mG, 0x8000 absent); 13-14: power
/// field; 15: movement counter (0xFF absent); 16-17: measurement sequence
/// (0xFFFF absent); 18-23: MAC.
fn decode_raw_v2(payload: &[u8]) -> Decoded {
    let mut out = Decoded::empty(DataFormat::RawV2);

    let temp = s16_be(payload, 1);
    if temp != i16::MIN {
        out.temperature = Some(temp as f64 * 0.005);
    }
    let humidity = u16_be(payload, 3);
    if humidity != 0xFFFF {
        out.humidity = Some(humidity as f64 * 0.0025);
    }
    let pressure = u16_be(payload, 5);
    if pressure != 0xFFFF {
        out.pressure = Some(pressure as f64 + 50000.0);
    }

    for (offset, slot) in [
        (7, &mut out.acceleration_x),
        (9, &mut out.acceleration_y),
        (11, &mut out.acceleration_z),
    ] {
        let raw = s16_be(payload, offset);
        if raw != i16::MIN {
            *slot = Some(raw as f64 / 1000.0);
        }
    }

    let (battery, tx) = split_power(u16_be(payload, 13));
    out.battery_voltage = battery;
    out.tx_power = tx;

    if payload[15] != 0xFF {
        out.movement_counter = Some(payload[15]);
    }
    let sequence = u16_be(payload, 16);
    if sequence != 0xFFFF {
        out.measurement_sequence = Some(sequence as u32);
    }
    out.mac = Some(mac_string(&payload[18..24]));

    out
}

/// Ruuvi Air BLE4 broadcast (format 6).
///
/// 1-2: temperature (signed, x 0.005 degC); 3-4: humidity (x 0.0025 %);
/// 5-6: pressure (+ 50000 Pa); 7-8: PM2.5 (x 0.1 ug/m3); 9-10: CO2 (ppm);
/// 11/12: VOC/NOx MSB (LSB in flags bits 6/7); 15: sequence; 16: flags.
/// The luminosity (13) and sound (14) bytes are not part of the canonical
/// field set and are skipped.
fn decode_format6(payload: &[u8]) -> Decoded {
    let mut out = Decoded::empty(DataFormat::Format6);

    let temp = s16_be(payload, 1);
    if temp != i16::MIN {
        out.temperature = Some(temp as f64 * 0.005);
    }
    let humidity = u16_be(payload, 3);
    if humidity != 0xFFFF {
        out.humidity = Some(humidity as f64 * 0.0025);
    }
    let pressure = u16_be(payload, 5);
    if pressure != 0xFFFF {
        out.pressure = Some(pressure as f64 + 50000.0);
    }
    let pm_2_5 = u16_be(payload, 7);
    if pm_2_5 != 0xFFFF {
        out.pm_2_5 = Some(pm_2_5 as f64 * 0.1);
    }
    let co2 = u16_be(payload, 9);
    if co2 != 0xFFFF {
        out.co2 = Some(co2);
    }

    let flags = payload[16];
    out.voc = packed_index(payload[11], flags, 6);
    out.nox = packed_index(payload[12], flags, 7);
    out.measurement_sequence = Some(payload[15] as u32);

    out
}

/// Ruuvi Air extended (format 0xE1).
///
/// 1-6: temperature/humidity/pressure as RAWv2; 7-14: PM1.0/2.5/4.0/10.0
/// (x 0.1 ug/m3, 0xFFFF absent); 15-16: CO2 (ppm, 0xFFFF absent);
/// 17/18: VOC/NOx MSB (LSB in flags byte 28, bits 6/7, 0xFF absent);
/// 19-21: luminosity (x 0.01 lux, 0xFFFFFF absent); 25-27: sequence
/// (0xFFFFFF absent); 34-39: MAC when the trailing section is present.
fn decode_extended_v1(payload: &[u8]) -> Decoded {
    let mut out = Decoded::empty(DataFormat::ExtendedV1);

    let temp = s16_be(payload, 1);
    if temp != i16::MIN {
        out.temperature = Some(temp as f64 * 0.005);
    }
    let humidity = u16_be(payload, 3);
    if humidity != 0xFFFF {
        out.humidity = Some(humidity as f64 * 0.0025);
    }
    let pressure = u16_be(payload, 5);
    if pressure != 0xFFFF {
        out.pressure = Some(pressure as f64 + 50000.0);
    }

    for (offset, slot) in [
        (7, &mut out.pm_1_0),
        (9, &mut out.pm_2_5),
        (11, &mut out.pm_4_0),
        (13, &mut out.pm_10_0),
    ] {
        let raw = u16_be(payload, offset);
        if raw != 0xFFFF {
            *slot = Some(raw as f64 * 0.1);
        }
    }

    let co2 = u16_be(payload, 15);
    if co2 != 0xFFFF {
        out.co2 = Some(co2);
    }

    let flags = payload[28];
    out.voc = packed_index(payload[17], flags, 6);
    out.nox = packed_index(payload[18], flags, 7);

    let luminosity = u24_be(payload, 19);
    if luminosity != 0xFF_FFFF {
        out.luminosity = Some(luminosity as f64 * 0.01);
    }
    let sequence = u24_be(payload, 25);
    if sequence != 0xFF_FFFF {
        out.measurement_sequence = Some(sequence);
    }
    if payload.len() >= 40 {
        out.mac = Some(mac_string(&payload[34..40]));
    }

    out
}
