//! Published state snapshot and sensor readings.

use std::fmt::Debug;
use std::sync::Arc;

use arc_swap::ArcSwap;
use contracts::{KinematicsState, SensorReadings};

/// Vehicle-type-specific state snapshot.
pub trait VehicleState: Debug + Clone + Send + Sync + 'static {
    fn kinematics(&self) -> &KinematicsState;

    /// Simulated time, nanoseconds
    fn timestamp(&self) -> u64;
}

/// Latest snapshot and readings of one vehicle.
///
/// Each is swapped in as a whole; readers always get the most recently
/// completed write, never a partially updated record.
pub struct StateCell<S> {
    snapshot: ArcSwap<S>,
    readings: ArcSwap<SensorReadings>,
}

impl<S: VehicleState> StateCell<S> {
    pub fn new(initial: S) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(initial),
            readings: ArcSwap::from_pointee(SensorReadings::default()),
        }
    }

    pub fn publish(&self, snapshot: S) {
        self.snapshot.store(Arc::new(snapshot));
    }

    pub fn load(&self) -> Arc<S> {
        self.snapshot.load_full()
    }

    pub fn publish_readings(&self, readings: SensorReadings) {
        self.readings.store(Arc::new(readings));
    }

    pub fn readings(&self) -> Arc<SensorReadings> {
        self.readings.load_full()
    }
}
