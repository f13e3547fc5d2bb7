use serde::Serialize;

use crate::models::Reading;

/// Mean of one field over a bucket, with the number of samples that
/// actually carried the field. Samples missing the field do not drag
/// the mean, only `count` reveals them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStat {
    pub mean: f64,
    pub count: u32,
}

/// One aggregation window. `start` is the inclusive lower edge,
/// aligned to a multiple of the bucket width since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub start: i64,
    pub samples: u32,
    pub temperature: Option<FieldStat>,
    pub humidity: Option<FieldStat>,
    pub pressure: Option<FieldStat>,
    pub co2: Option<FieldStat>,
    pub pm_1_0: Option<FieldStat>,
    pub pm_2_5: Option<FieldStat>,
    pub pm_4_0: Option<FieldStat>,
    pub pm_10_0: Option<FieldStat>,
    pub voc: Option<FieldStat>,
    pub nox: Option<FieldStat>,
    pub luminosity: Option<FieldStat>,
    pub acceleration_x: Option<FieldStat>,
    pub acceleration_y: Option<FieldStat>,
    pub acceleration_z: Option<FieldStat>,
    pub movement_counter: Option<FieldStat>,
    pub battery_voltage: Option<FieldStat>,
    pub tx_power: Option<FieldStat>,
    pub rssi: Option<FieldStat>,
}

#[derive(Default)]
struct Acc {
    sum: f64,
    count: u32,
}

impl Acc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn push_int(&mut self, value: Option<i64>) {
        self.push(value.map(|v| v as f64));
    }

    fn finish(&self) -> Option<FieldStat> {
        (self.count > 0).then(|| FieldStat {
            mean: self.sum / self.count as f64,
            count: self.count,
        })
    }
}

#[derive(Default)]
struct BucketAcc {
    samples: u32,
    temperature: Acc,
    humidity: Acc,
    pressure: Acc,
    co2: Acc,
    pm_1_0: Acc,
    pm_2_5: Acc,
    pm_4_0: Acc,
    pm_10_0: Acc,
    voc: Acc,
    nox: Acc,
    luminosity: Acc,
    acceleration_x: Acc,
    acceleration_y: Acc,
    acceleration_z: Acc,
    movement_counter: Acc,
    battery_voltage: Acc,
    tx_power: Acc,
    rssi: Acc,
}

impl BucketAcc {
    fn push(&mut self, reading: &Reading) {
        self.samples += 1;
        self.temperature.push(reading.temperature);
        self.humidity.push(reading.humidity);
        self.pressure.push(reading.pressure);
        self.co2.push_int(reading.co2);
        self.pm_1_0.push(reading.pm_1_0);
        self.pm_2_5.push(reading.pm_2_5);
        self.pm_4_0.push(reading.pm_4_0);
        self.pm_10_0.push(reading.pm_10_0);
        self.voc.push_int(reading.voc);
        self.nox.push_int(reading.nox);
        self.luminosity.push(reading.luminosity);
        self.acceleration_x.push(reading.acceleration_x);
        self.acceleration_y.push(reading.acceleration_y);
        self.acceleration_z.push(reading.acceleration_z);
        self.movement_counter.push_int(reading.movement_counter);
        self.battery_voltage.push(reading.battery_voltage);
        self.tx_power.push_int(reading.tx_power);
        self.rssi.push_int(reading.rssi);
    }

    fn finish(self, start: i64) -> Bucket {
        Bucket {
            start,
            samples: self.samples,
            temperature: self.temperature.finish(),
            humidity: self.humidity.finish(),
            pressure: self.pressure.finish(),
            co2: self.co2.finish(),
            pm_1_0: self.pm_1_0.finish(),
            pm_2_5: self.pm_2_5.finish(),
            pm_4_0: self.pm_4_0.finish(),
            pm_10_0: self.pm_10_0.finish(),
            voc: self.voc.finish(),
            nox: self.nox.finish(),
            luminosity: self.luminosity.finish(),
            acceleration_x: self.acceleration_x.finish(),
            acceleration_y: self.acceleration_y.finish(),
            acceleration_z: self.acceleration_z.finish(),
            movement_counter: self.movement_counter.finish(),
            battery_voltage: self.battery_voltage.finish(),
            tx_power: self.tx_power.finish(),
            rssi: self.rssi.finish(),
        }
    }
}

/// Fold timestamp-ascending readings into epoch-aligned buckets of
/// `width` seconds. Bucket edges depend only on the width, so the
/// same sample lands in the same bucket whatever range the caller
/// asked for. Windows without samples are omitted.
pub fn bucketize(readings: &[Reading], width: i64) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut current: Option<(i64, BucketAcc)> = None;

    for reading in readings {
        let start = reading.timestamp.div_euclid(width) * width;
        match &mut current {
            Some((open, acc)) if *open == start => acc.push(reading),
            _ => {
                if let Some((open, acc)) = current.take() {
                    buckets.push(acc.finish(open));
                }
                let mut acc = BucketAcc::default();
                acc.push(reading);
                current = Some((start, acc));
            }
        }
    }

    if let Some((open, acc)) = current {
        buckets.push(acc.finish(open));
    }

    buckets
}
