//! Mock sensor implementation
//!
//! Implements `SensorModel` with observable counters and injectable faults.
//! Used for testing the collection, the factory and the vehicle lifecycle
//! without relying on the ground-truth models.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{
    BarometerData, ContractError, GroundTruth, Result, SensorModel, SensorReading,
    SensorSetting, StateReporter,
};
use tracing::trace;

use crate::factory::SensorConstructor;

/// Mock sensor configuration
#[derive(Debug, Clone, Default)]
pub struct MockSensorConfig {
    /// Fail every `update` call
    pub fail_on_update: bool,
    /// Fail `initialize`
    pub fail_on_initialize: bool,
}

/// Call counters shared between a mock sensor and the test observing it.
#[derive(Debug, Default)]
pub struct MockCounters {
    pub initializes: AtomicU64,
    pub updates: AtomicU64,
    pub resets: AtomicU64,
}

impl MockCounters {
    pub fn initializes(&self) -> u64 {
        self.initializes.load(Ordering::Relaxed)
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }
}

/// Mock sensor
///
/// Reports a barometer reading whose `altitude` is the number of successful
/// updates since the last initialize or reset, so tests can tell a freshly
/// reset sensor from a ticking one.
pub struct MockSensor {
    name: String,
    config: MockSensorConfig,
    counters: Arc<MockCounters>,
    ticks: u64,
    timestamp: u64,
}

impl MockSensor {
    /// Create new mock sensor
    pub fn new(name: impl Into<String>, config: MockSensorConfig) -> Self {
        Self::with_counters(name, config, Arc::new(MockCounters::default()))
    }

    /// Create mock sensor reporting into shared counters
    pub fn with_counters(
        name: impl Into<String>,
        config: MockSensorConfig,
        counters: Arc<MockCounters>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            counters,
            ticks: 0,
            timestamp: 0,
        }
    }

    pub fn counters(&self) -> Arc<MockCounters> {
        self.counters.clone()
    }

    /// Factory constructor building mock sensors that share `counters`.
    ///
    /// The `fail` param (non-zero) turns on update faults per setting.
    pub fn constructor(counters: Arc<MockCounters>) -> SensorConstructor {
        Arc::new(move |setting: &SensorSetting| -> Result<Box<dyn SensorModel>> {
            let config = MockSensorConfig {
                fail_on_update: setting.params.get("fail").is_some_and(|v| *v != 0.0),
                fail_on_initialize: false,
            };
            Ok(Box::new(MockSensor::with_counters(
                setting.name.clone(),
                config,
                counters.clone(),
            )))
        })
    }
}

impl SensorModel for MockSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> &str {
        "mock"
    }

    fn initialize(&mut self, ground_truth: &GroundTruth) -> Result<()> {
        self.counters.initializes.fetch_add(1, Ordering::Relaxed);
        if self.config.fail_on_initialize {
            return Err(ContractError::sensor_fault(&self.name, "injected initialize fault"));
        }
        self.ticks = 0;
        self.timestamp = ground_truth.timestamp;
        Ok(())
    }

    fn update(&mut self, ground_truth: &GroundTruth) -> Result<()> {
        if self.config.fail_on_update {
            return Err(ContractError::sensor_fault(&self.name, "injected update fault"));
        }
        self.counters.updates.fetch_add(1, Ordering::Relaxed);
        self.ticks += 1;
        self.timestamp = ground_truth.timestamp;
        trace!(sensor = %self.name, ticks = self.ticks, "mock sensor updated");
        Ok(())
    }

    fn report_state(&self, reporter: &mut StateReporter) {
        reporter.start_heading(&self.name);
        reporter.write_value("ticks", self.ticks);
        reporter.end_heading();
    }

    fn reset(&mut self) {
        self.counters.resets.fetch_add(1, Ordering::Relaxed);
        self.ticks = 0;
    }

    fn reading(&self) -> SensorReading {
        SensorReading::Barometer(BarometerData {
            timestamp: self.timestamp,
            altitude: self.ticks as f32,
            pressure: 0.0,
            qnh: 0.0,
        })
    }
}
