use time::macros::datetime;

use ruuvi_store::services::{QueryRequest, Resolution, SeriesPoints};

use crate::common::{air_reading, tag_reading, MockStore};

mod common;

async fn bucket_starts(store: &MockStore, start: i64, end: i64) -> Vec<i64> {
    let series = store
        .service
        .query(&QueryRequest {
            start,
            end,
            device: None,
            resolution: Some(Resolution::OneMinute),
        })
        .await
        .unwrap();
    match &series[0].points {
        SeriesPoints::Buckets(buckets) => buckets.iter().map(|b| b.start).collect(),
        SeriesPoints::Raw(_) => panic!("expected buckets"),
    }
}

#[tokio::test]
async fn test_bucket_edges_ignore_the_requested_range() {
    let store = MockStore::new().await;
    let base = datetime!(2025-06-01 00:00:00 UTC).unix_timestamp();

    // One sample every 20 seconds across ten minutes.
    for n in 0..30 {
        store
            .service
            .insert(&air_reading("AA:00:00:00:00:01", base + n * 20))
            .await
            .unwrap();
    }

    // Shifting the window start must not shift the bucket edges,
    // only drop the samples that fell out of range.
    let aligned = bucket_starts(&store, base, base + 600).await;
    let shifted = bucket_starts(&store, base + 130, base + 600).await;

    assert!(aligned.iter().all(|s| s % 60 == 0));
    assert!(shifted.iter().all(|s| s % 60 == 0));
    assert_eq!(&aligned[2..], &shifted[..]);
}

#[tokio::test]
async fn test_auto_resolution_respects_the_budget() {
    let store = MockStore::new().await;
    let base = datetime!(2025-06-01 00:00:00 UTC).unix_timestamp();
    let month = 30 * 86_400;

    // Hourly samples over a month.
    for n in 0..(month / 3_600) {
        store
            .service
            .insert(&air_reading("AA:00:00:00:00:01", base + n * 3_600))
            .await
            .unwrap();
    }

    let series = store
        .service
        .query(&QueryRequest {
            start: base,
            end: base + month,
            device: None,
            resolution: None,
        })
        .await
        .unwrap();

    assert_eq!(series[0].resolution, Resolution::SixHours);
    match &series[0].points {
        SeriesPoints::Buckets(buckets) => assert!(buckets.len() <= 500),
        SeriesPoints::Raw(_) => panic!("expected buckets"),
    }

    // A short window comes back raw.
    let series = store
        .service
        .query(&QueryRequest {
            start: base,
            end: base + 400,
            device: None,
            resolution: None,
        })
        .await
        .unwrap();
    assert_eq!(series[0].resolution, Resolution::Raw);
    assert!(matches!(series[0].points, SeriesPoints::Raw(_)));
}

#[tokio::test]
async fn test_field_means_count_only_contributing_samples() {
    let store = MockStore::new().await;
    let base = datetime!(2025-06-01 00:00:00 UTC).unix_timestamp();

    let mut with_co2 = air_reading("AA:00:00:00:00:01", base);
    with_co2.co2 = Some(500);
    store.service.insert(&with_co2).await.unwrap();

    let mut without_co2 = air_reading("AA:00:00:00:00:01", base + 10);
    without_co2.co2 = None;
    store.service.insert(&without_co2).await.unwrap();

    let mut with_more_co2 = air_reading("AA:00:00:00:00:01", base + 20);
    with_more_co2.co2 = Some(700);
    store.service.insert(&with_more_co2).await.unwrap();

    let series = store
        .service
        .query(&QueryRequest {
            start: base,
            end: base + 59,
            device: None,
            resolution: Some(Resolution::OneMinute),
        })
        .await
        .unwrap();

    let buckets = match &series[0].points {
        SeriesPoints::Buckets(buckets) => buckets,
        SeriesPoints::Raw(_) => panic!("expected buckets"),
    };
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].samples, 3);

    let co2 = buckets[0].co2.unwrap();
    assert_eq!(co2.count, 2);
    assert_eq!(co2.mean, 600.0);

    let temperature = buckets[0].temperature.unwrap();
    assert_eq!(temperature.count, 3);

    // No sample in the window carried PM 1.0 at all.
    assert_eq!(buckets[0].pm_1_0, None);
}

#[tokio::test]
async fn test_each_device_gets_its_own_series() {
    let store = MockStore::new().await;
    let base = datetime!(2025-06-01 00:00:00 UTC).unix_timestamp();

    for n in 0..5 {
        store
            .service
            .insert(&air_reading("AA:00:00:00:00:01", base + n))
            .await
            .unwrap();
        store
            .service
            .insert(&tag_reading("BB:00:00:00:00:01", base + n))
            .await
            .unwrap();
    }
    // A third device with data entirely out of range.
    store
        .service
        .insert(&air_reading("AA:00:00:00:00:02", base - 1_000))
        .await
        .unwrap();

    let series = store
        .service
        .query(&QueryRequest {
            start: base,
            end: base + 100,
            device: None,
            resolution: None,
        })
        .await
        .unwrap();

    assert_eq!(series.len(), 2);
    for device_series in &series {
        let rows = match &device_series.points {
            SeriesPoints::Raw(rows) => rows,
            SeriesPoints::Buckets(_) => panic!("expected raw points"),
        };
        assert_eq!(rows.len(), 5);
        assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(rows.iter().all(|r| r.device_id == device_series.device.id));
    }

    // Filtering by nickname narrows the result to one series.
    let series = store
        .service
        .query(&QueryRequest {
            start: base,
            end: base + 100,
            device: Some("tag1".to_string()),
            resolution: None,
        })
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].device.mac, "BB:00:00:00:00:01");
}

#[tokio::test]
async fn test_store_wide_bookkeeping() {
    let store = MockStore::new().await;
    let base = datetime!(2025-06-01 00:00:00 UTC).unix_timestamp();

    assert_eq!(store.service.data_range().await.unwrap(), None);

    store.service.insert(&air_reading("AA:00:00:00:00:01", base)).await.unwrap();
    store.service.insert(&tag_reading("BB:00:00:00:00:01", base + 500)).await.unwrap();

    assert_eq!(store.service.data_range().await.unwrap(), Some((base, base + 500)));
    assert_eq!(store.service.count(None, base, base + 500).await.unwrap(), 2);
    assert_eq!(store.service.count(Some("air1"), base, base + 500).await.unwrap(), 1);
}
