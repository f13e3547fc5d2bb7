use std::sync::Arc;

use crate::configs::{Settings, Storage};
use crate::services::ReadingService;

pub mod configs;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;

/// Opens the store described by `settings` and reports its state.
pub async fn run(settings: &Arc<Settings>) {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), Default::default())
            .await
            .expect("Failed to open database."),
    );

    let service = ReadingService::new(storage, settings.query.point_budget);

    let devices = service.registry().all().await.expect("Failed to list devices.");
    tracing::info!("store holds {} registered device(s)", devices.len());
    for device in &devices {
        tracing::info!(
            mac = %device.mac,
            kind = %device.sensor_type,
            "device '{}'",
            device.nickname
        );
    }

    match service.data_range().await.expect("Failed to read data range.") {
        Some((first, last)) => tracing::info!("readings span {first}..{last} (unix seconds)"),
        None => tracing::info!("no readings stored yet"),
    }
}
