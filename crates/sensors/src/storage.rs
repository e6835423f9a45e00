//! Owning arena for one vehicle's sensors.

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::SensorModel;

static NEXT_STORAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_storage_id() -> u64 {
    NEXT_STORAGE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Non-owning reference to a sensor inside a [`SensorStorage`].
///
/// A handle is only valid for the storage (and generation) that issued it;
/// after `clear()` every previously issued handle resolves to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle {
    storage: u64,
    index: usize,
}

impl SensorHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Single owner of a vehicle's sensor models.
pub struct SensorStorage {
    id: u64,
    sensors: Vec<Box<dyn SensorModel>>,
}

impl Default for SensorStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SensorStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorStorage")
            .field("id", &self.id)
            .field(
                "sensors",
                &self.sensors.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SensorStorage {
    pub fn new() -> Self {
        Self {
            id: next_storage_id(),
            sensors: Vec::new(),
        }
    }

    /// Take ownership of `sensor` and return its handle.
    pub fn push(&mut self, sensor: Box<dyn SensorModel>) -> SensorHandle {
        self.sensors.push(sensor);
        SensorHandle {
            storage: self.id,
            index: self.sensors.len() - 1,
        }
    }

    pub fn get(&self, handle: SensorHandle) -> Option<&dyn SensorModel> {
        if !self.owns(handle) {
            return None;
        }
        Some(self.sensors[handle.index].as_ref())
    }

    pub fn get_mut(&mut self, handle: SensorHandle) -> Option<&mut Box<dyn SensorModel>> {
        if !self.owns(handle) {
            return None;
        }
        Some(&mut self.sensors[handle.index])
    }

    /// Whether `handle` was issued by this storage in its current generation.
    pub fn owns(&self, handle: SensorHandle) -> bool {
        handle.storage == self.id && handle.index < self.sensors.len()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Drop every sensor and invalidate outstanding handles.
    pub fn clear(&mut self) {
        self.sensors.clear();
        self.id = next_storage_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_sensor::{MockSensor, MockSensorConfig};

    #[test]
    fn handles_are_scoped_to_their_storage() {
        let mut a = SensorStorage::new();
        let mut b = SensorStorage::new();

        let ha = a.push(Box::new(MockSensor::new("a", MockSensorConfig::default())));
        let hb = b.push(Box::new(MockSensor::new("b", MockSensorConfig::default())));

        assert_eq!(a.get(ha).map(|s| s.name()), Some("a"));
        assert!(a.get(hb).is_none());
        assert!(!b.owns(ha));
    }

    #[test]
    fn clear_invalidates_handles() {
        let mut storage = SensorStorage::new();
        let handle = storage.push(Box::new(MockSensor::new("s", MockSensorConfig::default())));
        storage.clear();

        assert!(storage.is_empty());
        assert!(storage.get(handle).is_none());

        // A fresh sensor at the same index is not reachable through the stale handle
        storage.push(Box::new(MockSensor::new("t", MockSensorConfig::default())));
        assert!(storage.get(handle).is_none());
    }
}
