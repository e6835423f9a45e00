//! Car: throttle / steering / brake plus gearbox flags.

use serde::{Deserialize, Serialize};

use contracts::{GeoPoint, KinematicsState, Result, VehicleType};

use crate::base::VehicleApiBase;
use crate::control::{ControlCommand, ControlRange};
use crate::kind::{ArmingModel, VehicleKind};
use crate::state::VehicleState;
use crate::wire::{VehicleControls, VehicleStateSnapshot};

pub const THROTTLE: ControlRange = ControlRange::new("throttle", -1.0, 1.0);
pub const STEERING: ControlRange = ControlRange::new("steering", -1.0, 1.0);
pub const BRAKE: ControlRange = ControlRange::new("brake", 0.0, 1.0);

/// Redline reported in every snapshot
pub const MAX_RPM: f32 = 7500.0;

/// Bounded scalars are required on the wire; gearbox flags may be omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarControls {
    pub throttle: f32,
    pub steering: f32,
    pub brake: f32,
    #[serde(default)]
    pub handbrake: bool,
    #[serde(default)]
    pub is_manual_gear: bool,
    #[serde(default)]
    pub manual_gear: i32,
    #[serde(default = "default_gear_immediate")]
    pub gear_immediate: bool,
}

fn default_gear_immediate() -> bool {
    true
}

impl Default for CarControls {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            steering: 0.0,
            brake: 0.0,
            handbrake: false,
            is_manual_gear: false,
            manual_gear: 0,
            gear_immediate: default_gear_immediate(),
        }
    }
}

impl CarControls {
    pub fn new(throttle: f32, steering: f32) -> Self {
        Self {
            throttle,
            steering,
            ..Self::default()
        }
    }
}

impl ControlCommand for CarControls {
    fn clamped(&self) -> Self {
        Self {
            throttle: THROTTLE.clamp(self.throttle),
            steering: STEERING.clamp(self.steering),
            brake: BRAKE.clamp(self.brake),
            ..*self
        }
    }

    fn validate(&self) -> Result<()> {
        THROTTLE.check(self.throttle)?;
        STEERING.check(self.steering)?;
        BRAKE.check(self.brake)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    /// m/s
    pub speed: f32,
    pub gear: i32,
    pub rpm: f32,
    pub maxrpm: f32,
    pub handbrake: bool,
    pub kinematics_estimated: KinematicsState,
    pub timestamp: u64,
}

impl VehicleState for CarState {
    fn kinematics(&self) -> &KinematicsState {
        &self.kinematics_estimated
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

pub struct Car;

impl VehicleKind for Car {
    type Controls = CarControls;
    type State = CarState;

    const VEHICLE_TYPE: VehicleType = VehicleType::Car;
    const ARMING: ArmingModel = ArmingModel::NotModeled;
    const RESET_CLEARS_CONTROLS: bool = true;

    fn initial_state(kinematics: &KinematicsState, _home: GeoPoint, timestamp: u64) -> CarState {
        CarState {
            speed: kinematics.linear_velocity.norm(),
            gear: 0,
            rpm: 0.0,
            maxrpm: MAX_RPM,
            handbrake: false,
            kinematics_estimated: *kinematics,
            timestamp,
        }
    }

    fn wrap_controls(controls: CarControls) -> VehicleControls {
        VehicleControls::Car(controls)
    }

    fn unwrap_controls(controls: VehicleControls) -> Option<CarControls> {
        match controls {
            VehicleControls::Car(c) => Some(c),
            _ => None,
        }
    }

    fn wrap_state(state: CarState) -> VehicleStateSnapshot {
        VehicleStateSnapshot::Car(state)
    }

    fn unwrap_state(state: VehicleStateSnapshot) -> Option<CarState> {
        match state {
            VehicleStateSnapshot::Car(s) => Some(s),
            _ => None,
        }
    }
}

pub type CarApi = VehicleApiBase<Car>;
