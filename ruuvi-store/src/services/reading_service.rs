use std::sync::Arc;

use ruuvi_proto::{decode, scan_frame, CanonicalReading};
use serde::Serialize;

use crate::configs::Storage;
use crate::errors::{IngestError, QueryError};
use crate::models::{Device, Reading};
use crate::repositories::{DeviceRepository, ReadingRepository};

use super::aggregate::{bucketize, Bucket};
use super::registry::DeviceRegistry;
use super::resolution::{select, Resolution};

/// Whether a write landed or hit an already-stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub start: i64,
    pub end: i64,
    /// Nickname or MAC; `None` queries every registered device.
    pub device: Option<String>,
    /// `None` lets the point budget pick.
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Serialize)]
pub enum SeriesPoints {
    Raw(Vec<Reading>),
    Buckets(Vec<Bucket>),
}

/// One device's slice of a query result, timestamp ascending.
#[derive(Debug, Serialize)]
pub struct DeviceSeries {
    pub device: Device,
    pub resolution: Resolution,
    pub points: SeriesPoints,
}

/// Write and read path over the readings table. Writers hand in
/// decoded frames or canonical readings; readers get per-device
/// series at a bounded resolution.
pub struct ReadingService {
    registry: DeviceRegistry,
    devices: DeviceRepository,
    readings: ReadingRepository,
    point_budget: usize,
}

impl ReadingService {
    pub fn new(storage: Arc<Storage>, point_budget: usize) -> Self {
        Self {
            registry: DeviceRegistry::new(storage.clone()),
            devices: DeviceRepository::new(storage.clone()),
            readings: ReadingRepository::new(storage),
            point_budget,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Store one canonical reading, registering its device on first
    /// sight. Duplicate `(device, timestamp)` keys are dropped.
    pub async fn insert(&self, reading: &CanonicalReading) -> Result<InsertOutcome, IngestError> {
        let device = self
            .registry
            .resolve(&reading.device_id, reading.sensor_type)
            .await?;

        let row = Reading::from_canonical(device.id, reading);
        if self.readings.insert(&row).await? {
            Ok(InsertOutcome::Inserted)
        } else {
            tracing::debug!(
                device = %device.nickname,
                timestamp = row.timestamp,
                "dropped duplicate reading"
            );
            Ok(InsertOutcome::Duplicate)
        }
    }

    /// Decode a raw advertisement frame and store it. Identity comes
    /// from the payload's embedded MAC when present, otherwise from
    /// `source`; frames with neither are rejected.
    pub async fn ingest(
        &self,
        frame: &[u8],
        received_at: i64,
        rssi: Option<i16>,
        source: Option<&str>,
    ) -> Result<InsertOutcome, IngestError> {
        let payload = scan_frame(frame)?;
        let decoded = decode(payload)?;

        let mac = decoded
            .mac
            .clone()
            .or_else(|| source.map(str::to_string))
            .ok_or(IngestError::MissingDeviceId)?;

        let reading = decoded.into_reading(mac, received_at, rssi);
        self.insert(&reading).await
    }

    /// Query stored readings over `[start, end]`, one series per
    /// device that has data in range. Devices without samples are
    /// omitted rather than returned empty.
    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<DeviceSeries>, QueryError> {
        if request.start > request.end {
            return Err(QueryError::InvalidRange {
                start: request.start,
                end: request.end,
            });
        }

        let devices = match &request.device {
            Some(name) => vec![self.lookup(name).await?],
            None => self.devices.all().await?,
        };

        let resolution = select(
            request.start,
            request.end,
            request.resolution,
            self.point_budget,
        );

        let mut series = Vec::new();
        for device in devices {
            let rows = self
                .readings
                .find_by_device_and_time_range(device.id, request.start, request.end)
                .await?;
            if rows.is_empty() {
                continue;
            }

            let points = match resolution.bucket_seconds() {
                None => SeriesPoints::Raw(rows),
                Some(width) => SeriesPoints::Buckets(bucketize(&rows, width)),
            };

            series.push(DeviceSeries {
                device,
                resolution,
                points,
            });
        }

        Ok(series)
    }

    pub async fn latest(&self, device: &str) -> Result<Option<Reading>, QueryError> {
        let device = self.lookup(device).await?;
        Ok(self.readings.latest_by_device(device.id).await?)
    }

    pub async fn count(
        &self,
        device: Option<&str>,
        start: i64,
        end: i64,
    ) -> Result<i64, QueryError> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }

        let device_id = match device {
            Some(name) => Some(self.lookup(name).await?.id),
            None => None,
        };
        Ok(self.readings.count_by_time_range(device_id, start, end).await?)
    }

    /// Oldest and newest stored timestamps across all devices.
    pub async fn data_range(&self) -> Result<Option<(i64, i64)>, QueryError> {
        Ok(self.readings.data_range().await?)
    }

    /// Ids of devices with at least one stored reading. Registered
    /// devices that never delivered data do not appear.
    pub async fn device_ids(&self) -> Result<Vec<i64>, QueryError> {
        Ok(self.readings.device_ids().await?)
    }

    /// Resolves a device selector, trying nickname first then MAC.
    async fn lookup(&self, name: &str) -> Result<Device, QueryError> {
        if let Some(device) = self.devices.find_by_nickname(name).await? {
            return Ok(device);
        }
        if let Some(device) = self.devices.find_by_mac(name).await? {
            return Ok(device);
        }
        Err(QueryError::UnknownDevice(name.to_string()))
    }
}
