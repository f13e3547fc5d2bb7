use std::sync::Arc;

use sqlx::Error;

use crate::configs::Storage;
use crate::models::Reading;

pub struct ReadingRepository {
    storage: Arc<Storage>,
}

impl ReadingRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl ReadingRepository {
    /// Compare-and-insert on the `(device_id, timestamp)` key. Returns
    /// `true` when the row was written, `false` when the key already
    /// existed (the stored row is left untouched, first writer wins).
    pub async fn insert(&self, item: &Reading) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO readings (
                device_id, timestamp, data_format,
                temperature, humidity, pressure,
                co2, pm_1_0, pm_2_5, pm_4_0, pm_10_0, voc, nox, luminosity,
                acceleration_x, acceleration_y, acceleration_z,
                movement_counter, battery_voltage, tx_power, rssi
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            ON CONFLICT (device_id, timestamp) DO NOTHING
            "#,
        )
        .bind(item.device_id)
        .bind(item.timestamp)
        .bind(item.data_format)
        .bind(item.temperature)
        .bind(item.humidity)
        .bind(item.pressure)
        .bind(item.co2)
        .bind(item.pm_1_0)
        .bind(item.pm_2_5)
        .bind(item.pm_4_0)
        .bind(item.pm_10_0)
        .bind(item.voc)
        .bind(item.nox)
        .bind(item.luminosity)
        .bind(item.acceleration_x)
        .bind(item.acceleration_y)
        .bind(item.acceleration_z)
        .bind(item.movement_counter)
        .bind(item.battery_voltage)
        .bind(item.tx_power)
        .bind(item.rssi)
        .execute(self.storage.get_pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Readings for one device within `[start, end]`, ascending.
    pub async fn find_by_device_and_time_range(
        &self,
        device_id: i64,
        start: i64,
        end: i64,
    ) -> Result<Vec<Reading>, Error> {
        let readings: Vec<Reading> = sqlx::query_as(
            r#"
            SELECT * FROM readings
            WHERE device_id = $1 AND timestamp >= $2 AND timestamp <= $3
            ORDER BY timestamp ASC
            "#,
        )
        .bind(device_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(readings)
    }

    pub async fn latest_by_device(&self, device_id: i64) -> Result<Option<Reading>, Error> {
        let reading: Option<Reading> = sqlx::query_as(
            r#"
            SELECT * FROM readings
            WHERE device_id = $1
            ORDER BY timestamp DESC
            LIMIT 1
            "#,
        )
        .bind(device_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(reading)
    }

    pub async fn count_by_time_range(
        &self,
        device_id: Option<i64>,
        start: i64,
        end: i64,
    ) -> Result<i64, Error> {
        let count: (i64,) = match device_id {
            Some(device_id) => {
                sqlx::query_as(
                    r#"
                    SELECT COUNT(*) FROM readings
                    WHERE device_id = $1 AND timestamp >= $2 AND timestamp <= $3
                    "#,
                )
                .bind(device_id)
                .bind(start)
                .bind(end)
                .fetch_one(self.storage.get_pool())
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM readings WHERE timestamp >= $1 AND timestamp <= $2",
                )
                .bind(start)
                .bind(end)
                .fetch_one(self.storage.get_pool())
                .await?
            }
        };

        Ok(count.0)
    }

    /// Timestamps of the oldest and newest stored readings.
    pub async fn data_range(&self) -> Result<Option<(i64, i64)>, Error> {
        let row: (Option<i64>, Option<i64>) =
            sqlx::query_as("SELECT MIN(timestamp), MAX(timestamp) FROM readings")
                .fetch_one(self.storage.get_pool())
                .await?;

        Ok(match row {
            (Some(first), Some(last)) => Some((first, last)),
            _ => None,
        })
    }

    /// Distinct devices that have at least one stored reading.
    pub async fn device_ids(&self) -> Result<Vec<i64>, Error> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT DISTINCT device_id FROM readings ORDER BY device_id ASC")
                .fetch_all(self.storage.get_pool())
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
