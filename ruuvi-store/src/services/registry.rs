use std::sync::Arc;

use ruuvi_proto::SensorType;

use crate::configs::Storage;
use crate::errors::RegistryError;
use crate::models::Device;
use crate::repositories::DeviceRepository;

/// Auto-registration attempts before giving up on a nickname race.
const REGISTER_RETRIES: usize = 3;

/// Maps a MAC address and its reported sensor type to a registered
/// device, creating the device on first sight.
pub struct DeviceRegistry {
    storage: Arc<Storage>,
    devices: DeviceRepository,
}

impl DeviceRegistry {
    pub fn new(storage: Arc<Storage>) -> Self {
        let devices = DeviceRepository::new(storage.clone());
        Self { storage, devices }
    }

    /// Look up the device for `mac`, registering it with a generated
    /// nickname when unseen. A device's sensor type is fixed at first
    /// registration; a frame reporting a different type is rejected.
    pub async fn resolve(
        &self,
        mac: &str,
        sensor_type: SensorType,
    ) -> Result<Device, RegistryError> {
        let mac = mac.to_ascii_uppercase();

        for _ in 0..REGISTER_RETRIES {
            if let Some(device) = self.devices.find_by_mac(&mac).await? {
                return self.check_type(device, sensor_type);
            }

            let nickname = self.next_nickname(sensor_type).await?;
            let device = Device {
                id: 0,
                mac: mac.clone(),
                sensor_type: sensor_type.as_str().to_string(),
                nickname: nickname.clone(),
                description: None,
                pairing_id: None,
            };

            let mut tx = self.storage.get_pool().begin().await?;
            match self.devices.create(&device, &mut tx).await {
                Ok(id) => {
                    tx.commit().await?;
                    tracing::info!(mac = %mac, nickname = %nickname, "registered new device");
                    return Ok(Device { id, ..device });
                }
                Err(err) if is_unique_violation(&err) => {
                    // Lost a race on the mac or nickname column. Roll
                    // back and re-resolve from the current table state.
                    tx.rollback().await?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Retries exhausted, the mac row must exist by now.
        match self.devices.find_by_mac(&mac).await? {
            Some(device) => self.check_type(device, sensor_type),
            None => Err(sqlx::Error::RowNotFound.into()),
        }
    }

    /// Change a device's nickname, keeping identity and type intact.
    pub async fn rename(&self, device: &Device, nickname: &str) -> Result<Device, RegistryError> {
        let updated = Device {
            nickname: nickname.to_string(),
            ..device.clone()
        };
        self.devices.update(&updated).await?;
        Ok(updated)
    }

    pub async fn describe(
        &self,
        device: &Device,
        description: Option<&str>,
    ) -> Result<Device, RegistryError> {
        let updated = Device {
            description: description.map(str::to_string),
            ..device.clone()
        };
        self.devices.update(&updated).await?;
        Ok(updated)
    }

    pub async fn find_by_mac(&self, mac: &str) -> Result<Option<Device>, RegistryError> {
        Ok(self.devices.find_by_mac(mac).await?)
    }

    pub async fn find_by_nickname(&self, nickname: &str) -> Result<Option<Device>, RegistryError> {
        Ok(self.devices.find_by_nickname(nickname).await?)
    }

    pub async fn all(&self) -> Result<Vec<Device>, RegistryError> {
        Ok(self.devices.all().await?)
    }

    fn check_type(&self, device: Device, reported: SensorType) -> Result<Device, RegistryError> {
        if device.kind() == Some(reported) {
            Ok(device)
        } else {
            Err(RegistryError::TypeConflict {
                mac: device.mac,
                existing: device.sensor_type,
                reported: reported.as_str().to_string(),
            })
        }
    }

    /// First free `air{n}` or `tag{n}` nickname, counting from 1.
    async fn next_nickname(&self, sensor_type: SensorType) -> Result<String, sqlx::Error> {
        let prefix = sensor_type.as_str();
        for n in 1.. {
            let candidate = format!("{prefix}{n}");
            if self.devices.find_by_nickname(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        unreachable!()
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}
