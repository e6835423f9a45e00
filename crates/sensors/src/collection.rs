//! Ordered fan-out over one vehicle's sensors.

use contracts::{GroundTruth, NamedReading, SensorReadings, StateReporter};
use tracing::{debug, warn};

use crate::storage::{SensorHandle, SensorStorage};

/// Sensor collection
///
/// Holds handles into a [`SensorStorage`] in insertion order. Every lifecycle
/// call walks the handles in that order; handles the storage does not own
/// (stale or foreign) are skipped.
#[derive(Debug, Clone, Default)]
pub struct SensorCollection {
    vehicle: String,
    handles: Vec<SensorHandle>,
}

impl SensorCollection {
    pub fn new(vehicle: impl Into<String>) -> Self {
        Self {
            vehicle: vehicle.into(),
            handles: Vec::new(),
        }
    }

    /// Vehicle name used as the fault label
    pub fn vehicle(&self) -> &str {
        &self.vehicle
    }

    pub fn insert(&mut self, handle: SensorHandle) {
        self.handles.push(handle);
    }

    pub fn handles(&self) -> &[SensorHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    /// Seed every sensor with the initial ground truth.
    ///
    /// Returns the number of sensors that failed to initialize.
    pub fn initialize(&self, storage: &mut SensorStorage, ground_truth: &GroundTruth) -> usize {
        let mut faults = 0;
        for &handle in &self.handles {
            let Some(sensor) = storage.get_mut(handle) else {
                continue;
            };
            if let Err(e) = sensor.initialize(ground_truth) {
                faults += 1;
                warn!(
                    vehicle = %self.vehicle,
                    sensor = %sensor.name(),
                    error = %e,
                    "sensor initialize failed"
                );
                observability::record_sensor_fault(&self.vehicle, sensor.name());
            }
        }
        debug!(
            vehicle = %self.vehicle,
            sensors = self.handles.len(),
            faults,
            "sensor collection initialized"
        );
        faults
    }

    /// Advance every sensor one tick.
    ///
    /// A failing sensor is logged and counted; the others still update.
    /// Returns the number of faults in this tick.
    pub fn update(&self, storage: &mut SensorStorage, ground_truth: &GroundTruth) -> usize {
        let mut faults = 0;
        for &handle in &self.handles {
            let Some(sensor) = storage.get_mut(handle) else {
                continue;
            };
            if let Err(e) = sensor.update(ground_truth) {
                faults += 1;
                warn!(
                    vehicle = %self.vehicle,
                    sensor = %sensor.name(),
                    error = %e,
                    "sensor update failed, keeping previous reading"
                );
                observability::record_sensor_fault(&self.vehicle, sensor.name());
            }
        }
        faults
    }

    pub fn report_state(&self, storage: &SensorStorage, reporter: &mut StateReporter) {
        for &handle in &self.handles {
            if let Some(sensor) = storage.get(handle) {
                sensor.report_state(reporter);
            }
        }
    }

    /// Restore every sensor to its post-initialize state.
    pub fn reset(&self, storage: &mut SensorStorage) {
        for &handle in &self.handles {
            if let Some(sensor) = storage.get_mut(handle) {
                sensor.reset();
            }
        }
    }

    /// Latest reading of every sensor, in insertion order.
    pub fn readings(&self, storage: &SensorStorage, timestamp: u64) -> SensorReadings {
        let entries = self
            .handles
            .iter()
            .filter_map(|&h| storage.get(h))
            .map(|sensor| NamedReading {
                sensor: sensor.name().to_string(),
                reading: sensor.reading(),
            })
            .collect();

        SensorReadings { timestamp, entries }
    }

    /// Resolve a sensor by name.
    pub fn find(&self, storage: &SensorStorage, name: &str) -> Option<SensorHandle> {
        self.handles
            .iter()
            .copied()
            .find(|&h| storage.get(h).is_some_and(|s| s.name() == name))
    }

    /// Sensor names in insertion order
    pub fn names(&self, storage: &SensorStorage) -> Vec<String> {
        self.handles
            .iter()
            .filter_map(|&h| storage.get(h))
            .map(|s| s.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_sensor::{MockSensor, MockSensorConfig};
    use contracts::{BarometerData, SensorReading};

    fn build(
        configs: &[(&str, MockSensorConfig)],
    ) -> (SensorCollection, SensorStorage, Vec<std::sync::Arc<crate::MockCounters>>) {
        let mut storage = SensorStorage::new();
        let mut collection = SensorCollection::new("rover");
        let mut counters = Vec::new();
        for (name, config) in configs {
            let sensor = MockSensor::new(*name, config.clone());
            counters.push(sensor.counters());
            collection.insert(storage.push(Box::new(sensor)));
        }
        (collection, storage, counters)
    }

    fn ticks(reading: &SensorReading) -> f32 {
        match reading {
            SensorReading::Barometer(BarometerData { altitude, .. }) => *altitude,
            _ => -1.0,
        }
    }

    #[test]
    fn test_faulty_sensor_does_not_stop_others() {
        let faulty = MockSensorConfig {
            fail_on_update: true,
            ..Default::default()
        };
        let (collection, mut storage, counters) = build(&[
            ("first", MockSensorConfig::default()),
            ("broken", faulty),
            ("last", MockSensorConfig::default()),
        ]);
        let gt = GroundTruth::default();

        assert_eq!(collection.initialize(&mut storage, &gt), 0);
        assert_eq!(collection.update(&mut storage, &gt), 1);
        assert_eq!(collection.update(&mut storage, &gt), 1);

        assert_eq!(counters[0].updates(), 2);
        assert_eq!(counters[1].updates(), 0);
        assert_eq!(counters[2].updates(), 2);
    }

    #[test]
    fn test_readings_follow_insertion_order() {
        let (collection, mut storage, _) = build(&[
            ("zeta", MockSensorConfig::default()),
            ("alpha", MockSensorConfig::default()),
        ]);
        collection.initialize(&mut storage, &GroundTruth::default());

        let readings = collection.readings(&storage, 42);
        let names: Vec<_> = readings.entries.iter().map(|e| e.sensor.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(readings.timestamp, 42);
        assert_eq!(collection.names(&storage), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_reset_restores_post_initialize_state() {
        let (collection, mut storage, counters) = build(&[("s", MockSensorConfig::default())]);
        let gt = GroundTruth::default();
        collection.initialize(&mut storage, &gt);
        collection.update(&mut storage, &gt);
        collection.update(&mut storage, &gt);

        let before = collection.readings(&storage, 0);
        assert_eq!(ticks(&before.entries[0].reading), 2.0);

        collection.reset(&mut storage);
        let after = collection.readings(&storage, 0);
        assert_eq!(ticks(&after.entries[0].reading), 0.0);
        assert_eq!(counters[0].resets(), 1);
        // reset does not rebuild
        assert_eq!(counters[0].initializes(), 1);
    }

    #[test]
    fn test_find_by_name() {
        let (collection, storage, _) = build(&[
            ("gps", MockSensorConfig::default()),
            ("imu", MockSensorConfig::default()),
        ]);
        let handle = collection.find(&storage, "imu").unwrap();
        assert_eq!(handle.index(), 1);
        assert!(collection.find(&storage, "lidar").is_none());
    }

    #[test]
    fn test_foreign_handles_are_skipped() {
        let (mut collection, mut storage, counters) =
            build(&[("own", MockSensorConfig::default())]);
        let mut other = SensorStorage::new();
        let foreign = MockSensor::new("foreign", MockSensorConfig::default());
        collection.insert(other.push(Box::new(foreign)));

        collection.update(&mut storage, &GroundTruth::default());
        assert_eq!(counters[0].updates(), 1);
        assert_eq!(collection.readings(&storage, 0).len(), 1);
    }

    #[test]
    fn test_report_state_fans_out() {
        let (collection, mut storage, _) = build(&[
            ("a", MockSensorConfig::default()),
            ("b", MockSensorConfig::default()),
        ]);
        collection.initialize(&mut storage, &GroundTruth::default());

        let mut reporter = StateReporter::new();
        collection.report_state(&storage, &mut reporter);
        let text = reporter.into_string();
        assert!(text.find("a\n").unwrap() < text.find("b\n").unwrap());
    }
}
