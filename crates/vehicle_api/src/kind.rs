//! Per-vehicle-type behavior plugged into `VehicleApiBase`.

use contracts::{GeoPoint, KinematicsState, VehicleType};

use crate::control::ControlCommand;
use crate::state::VehicleState;
use crate::wire::{VehicleControls, VehicleStateSnapshot};

/// Whether a vehicle type models arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingModel {
    /// `arm_disarm` is a placeholder that always succeeds
    NotModeled,
    /// A latched armed flag, cleared on reset
    Latched,
}

/// Vehicle type definition
///
/// Supplies the command and snapshot types plus the few behaviors that
/// differ between vehicle types. Everything else is shared by
/// [`VehicleApiBase`](crate::VehicleApiBase).
pub trait VehicleKind: Send + Sync + 'static {
    type Controls: ControlCommand;
    type State: VehicleState;

    const VEHICLE_TYPE: VehicleType;
    const ARMING: ArmingModel;

    /// Reset also clears the latched command
    const RESET_CLEARS_CONTROLS: bool = false;

    /// Snapshot published right after (re-)initialization.
    fn initial_state(kinematics: &KinematicsState, home: GeoPoint, timestamp: u64) -> Self::State;

    fn wrap_controls(controls: Self::Controls) -> VehicleControls;
    fn unwrap_controls(controls: VehicleControls) -> Option<Self::Controls>;

    fn wrap_state(state: Self::State) -> VehicleStateSnapshot;
    fn unwrap_state(state: VehicleStateSnapshot) -> Option<Self::State>;
}
