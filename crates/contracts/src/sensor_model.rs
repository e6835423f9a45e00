//! SensorModel trait - Virtual sensor abstraction
//!
//! Defines the lifecycle every sensor attached to a vehicle goes through.
//! Built-in models and test doubles implement the same interface, so the
//! sensor collection drives them without knowing their concrete type.

use crate::{GroundTruth, Result, SensorReading, StateReporter};

/// Sensor model trait
///
/// A sensor is owned by exactly one vehicle's sensor storage and is only
/// touched from that vehicle's tick context (or while the vehicle is fenced
/// for re-initialization), hence `Send` but not `Sync`.
///
/// # Lifecycle
///
/// 1. `initialize` with the vehicle's initial ground truth
/// 2. `update` once per simulation tick
/// 3. `reset` returns to the post-initialize state without reconstruction
///
/// # Example
///
/// ```ignore
/// let mut sensor: Box<dyn SensorModel> = factory_output.pop().unwrap();
/// sensor.initialize(&ground_truth)?;
/// sensor.update(&ground_truth)?;
/// let reading = sensor.reading();
/// ```
pub trait SensorModel: Send {
    /// Sensor name, unique within its vehicle
    fn name(&self) -> &str;

    /// Type key the factory built this sensor from
    fn sensor_type(&self) -> &str;

    /// Capture the initial ground truth and produce a first reading.
    ///
    /// Calling it again fully re-seeds the sensor.
    fn initialize(&mut self, ground_truth: &GroundTruth) -> Result<()>;

    /// Advance one tick.
    ///
    /// An error here is a sensor fault: the collection logs it and keeps
    /// the previous reading.
    fn update(&mut self, ground_truth: &GroundTruth) -> Result<()>;

    /// Append a human-readable dump of the current output.
    fn report_state(&self, reporter: &mut StateReporter);

    /// Restore the post-initialize state.
    fn reset(&mut self);

    /// Latest output
    fn reading(&self) -> SensorReading;
}
