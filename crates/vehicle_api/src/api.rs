//! VehicleApi trait - the per-vehicle control and telemetry surface.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use contracts::{
    Environment, GeoPoint, KinematicsState, Result, SensorReading, SensorReadings,
    StateReporter, VehicleSetting, VehicleType,
};
use sensors::SensorFactory;

use crate::wire::{VehicleControls, VehicleStateSnapshot};

/// Arming status as seen by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmState {
    /// Vehicle type has no arming; `arm_disarm` is a placeholder
    NotModeled,
    Armed,
    Disarmed,
}

/// Vehicle API trait
///
/// One instance per simulated vehicle, shared between the simulation tick
/// thread and the transport tasks. All methods take `&self`; every
/// implementation synchronizes internally.
///
/// # Threading
///
/// - `update_state` / `update`: tick thread only
/// - `set_controls` / `get_*` / `enable_api_control` / `arm_disarm`: any thread
/// - `initialize` / `reset`: any thread, fenced against the tick on the same vehicle
pub trait VehicleApi: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    fn vehicle_type(&self) -> VehicleType;

    /// Rebuild the sensors from `setting` and publish the initial snapshot.
    ///
    /// Keeps `factory` for later re-initialization. Safe to call repeatedly;
    /// on error the previous sensors stay in place.
    fn initialize(
        &self,
        setting: &VehicleSetting,
        factory: Arc<dyn SensorFactory>,
        kinematics: &KinematicsState,
        environment: &Environment,
    ) -> Result<()>;

    /// Advance the sensors one tick against the latest published snapshot.
    fn update(&self);

    /// Append the sensors' state dump. No vehicle state side effect.
    fn report_state(&self, reporter: &mut StateReporter);

    /// Toggling in either direction resets the latched command.
    fn enable_api_control(&self, enabled: bool);

    fn is_api_control_enabled(&self) -> bool;

    /// Arm or disarm. Vehicles without arming report success.
    fn arm_disarm(&self, arm: bool) -> bool;

    fn arm_state(&self) -> ArmState;

    /// Fixed at first initialization
    fn get_home_geo_point(&self) -> GeoPoint;

    /// Latch a new command under the vehicle's control policy.
    fn set_controls(&self, controls: VehicleControls) -> Result<()>;

    /// Last accepted command
    fn get_controls(&self) -> VehicleControls;

    /// Publish a fresh snapshot (tick thread).
    fn update_state(&self, state: VehicleStateSnapshot) -> Result<()>;

    /// Bumped by every successful `initialize` and every `reset`
    fn generation(&self) -> u64;

    /// Publish `state` only if no `initialize` / `reset` happened since
    /// `generation` was read. Returns `Ok(false)` when the snapshot was
    /// dropped for that reason.
    fn update_state_since(&self, generation: u64, state: VehicleStateSnapshot) -> Result<bool>;

    /// Latest published snapshot
    fn get_state(&self) -> VehicleStateSnapshot;

    /// Latest published readings of every sensor
    fn sensor_readings(&self) -> Arc<SensorReadings>;

    /// Latest published reading of one sensor
    fn get_sensor_reading(&self, sensor: &str) -> Result<SensorReading> {
        self.sensor_readings()
            .get(sensor)
            .cloned()
            .ok_or_else(|| contracts::ContractError::sensor_not_found(self.name(), sensor))
    }

    /// Sensor names in insertion order
    fn sensor_names(&self) -> Vec<String>;

    /// Reset sensors and vehicle-specific latched state, then republish the
    /// post-initialize snapshot and readings.
    fn reset(&self);
}
