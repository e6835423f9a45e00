//! Warthog ground rover: unicycle velocity commands.

use serde::{Deserialize, Serialize};

use contracts::{GeoPoint, KinematicsState, Result, VehicleType};

use crate::base::VehicleApiBase;
use crate::control::{ControlCommand, ControlRange};
use crate::kind::{ArmingModel, VehicleKind};
use crate::state::VehicleState;
use crate::wire::{VehicleControls, VehicleStateSnapshot};

pub const LINEAR_VEL: ControlRange = ControlRange::new("linear_vel", -5.0, 5.0);
pub const ANGULAR_VEL: ControlRange = ControlRange::new("angular_vel", -2.0, 2.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarthogControls {
    /// m/s, [-5, 5]
    pub linear_vel: f32,
    /// rad/s, [-2, 2]
    pub angular_vel: f32,
}

impl WarthogControls {
    pub fn new(linear_vel: f32, angular_vel: f32) -> Self {
        Self {
            linear_vel,
            angular_vel,
        }
    }
}

impl ControlCommand for WarthogControls {
    fn clamped(&self) -> Self {
        Self {
            linear_vel: LINEAR_VEL.clamp(self.linear_vel),
            angular_vel: ANGULAR_VEL.clamp(self.angular_vel),
        }
    }

    fn validate(&self) -> Result<()> {
        LINEAR_VEL.check(self.linear_vel)?;
        ANGULAR_VEL.check(self.angular_vel)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WarthogState {
    pub linear_vel: f32,
    pub angular_vel: f32,
    pub kinematics_estimated: KinematicsState,
    pub timestamp: u64,
}

impl VehicleState for WarthogState {
    fn kinematics(&self) -> &KinematicsState {
        &self.kinematics_estimated
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

pub struct Warthog;

impl VehicleKind for Warthog {
    type Controls = WarthogControls;
    type State = WarthogState;

    const VEHICLE_TYPE: VehicleType = VehicleType::Warthog;
    const ARMING: ArmingModel = ArmingModel::NotModeled;

    fn initial_state(
        kinematics: &KinematicsState,
        _home: GeoPoint,
        timestamp: u64,
    ) -> WarthogState {
        WarthogState {
            linear_vel: 0.0,
            angular_vel: 0.0,
            kinematics_estimated: *kinematics,
            timestamp,
        }
    }

    fn wrap_controls(controls: WarthogControls) -> VehicleControls {
        VehicleControls::Warthog(controls)
    }

    fn unwrap_controls(controls: VehicleControls) -> Option<WarthogControls> {
        match controls {
            VehicleControls::Warthog(c) => Some(c),
            _ => None,
        }
    }

    fn wrap_state(state: WarthogState) -> VehicleStateSnapshot {
        VehicleStateSnapshot::Warthog(state)
    }

    fn unwrap_state(state: VehicleStateSnapshot) -> Option<WarthogState> {
        match state {
            VehicleStateSnapshot::Warthog(s) => Some(s),
            _ => None,
        }
    }
}

pub type WarthogApi = VehicleApiBase<Warthog>;
