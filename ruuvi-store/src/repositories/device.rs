use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Device;

pub struct DeviceRepository {
    storage: Arc<Storage>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl DeviceRepository {
    // Create new device record
    pub async fn create(
        &self,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO devices (mac, sensor_type, nickname, description, pairing_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&item.mac)
        .bind(&item.sensor_type)
        .bind(&item.nickname)
        .bind(&item.description)
        .bind(&item.pairing_id)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn find_by_mac(&self, mac: &str) -> Result<Option<Device>, Error> {
        let device: Option<Device> =
            sqlx::query_as("SELECT * FROM devices WHERE mac = $1 COLLATE NOCASE")
                .bind(mac)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(device)
    }

    pub async fn find_by_nickname(&self, nickname: &str) -> Result<Option<Device>, Error> {
        let device: Option<Device> =
            sqlx::query_as("SELECT * FROM devices WHERE nickname = $1 COLLATE NOCASE")
                .bind(nickname)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(device)
    }

    pub async fn all(&self) -> Result<Vec<Device>, Error> {
        let devices: Vec<Device> = sqlx::query_as("SELECT * FROM devices ORDER BY id ASC")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(devices)
    }

    // Update mutable metadata; mac and sensor_type are immutable.
    pub async fn update(&self, item: &Device) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE devices
            SET nickname = $1, description = $2, pairing_id = $3
            WHERE id = $4
            "#,
        )
        .bind(&item.nickname)
        .bind(&item.description)
        .bind(&item.pairing_id)
        .bind(item.id)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }
}
