//! Multirotor: roll / pitch / yaw-rate / throttle commands with arming.

use serde::{Deserialize, Serialize};

use contracts::{GeoPoint, KinematicsState, Result, VehicleType};

use crate::base::VehicleApiBase;
use crate::control::{ControlCommand, ControlRange};
use crate::kind::{ArmingModel, VehicleKind};
use crate::state::VehicleState;
use crate::wire::{VehicleControls, VehicleStateSnapshot};

pub const ROLL: ControlRange = ControlRange::new("roll", -0.5, 0.5);
pub const PITCH: ControlRange = ControlRange::new("pitch", -0.5, 0.5);
#[allow(clippy::approx_constant)]
pub const YAW_RATE: ControlRange = ControlRange::new("yaw_rate", -3.14, 3.14);
pub const THROTTLE: ControlRange = ControlRange::new("throttle", 0.0, 1.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultirotorControls {
    /// rad
    pub roll: f32,
    /// rad
    pub pitch: f32,
    /// rad/s
    pub yaw_rate: f32,
    /// [0, 1]
    pub throttle: f32,
}

impl ControlCommand for MultirotorControls {
    fn clamped(&self) -> Self {
        Self {
            roll: ROLL.clamp(self.roll),
            pitch: PITCH.clamp(self.pitch),
            yaw_rate: YAW_RATE.clamp(self.yaw_rate),
            throttle: THROTTLE.clamp(self.throttle),
        }
    }

    fn validate(&self) -> Result<()> {
        ROLL.check(self.roll)?;
        PITCH.check(self.pitch)?;
        YAW_RATE.check(self.yaw_rate)?;
        THROTTLE.check(self.throttle)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandedState {
    #[default]
    Landed,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultirotorState {
    pub kinematics_estimated: KinematicsState,
    pub gps_location: GeoPoint,
    pub landed_state: LandedState,
    pub timestamp: u64,
}

impl VehicleState for MultirotorState {
    fn kinematics(&self) -> &KinematicsState {
        &self.kinematics_estimated
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

pub struct Multirotor;

impl VehicleKind for Multirotor {
    type Controls = MultirotorControls;
    type State = MultirotorState;

    const VEHICLE_TYPE: VehicleType = VehicleType::Multirotor;
    const ARMING: ArmingModel = ArmingModel::Latched;

    fn initial_state(
        kinematics: &KinematicsState,
        home: GeoPoint,
        timestamp: u64,
    ) -> MultirotorState {
        MultirotorState {
            kinematics_estimated: *kinematics,
            gps_location: home.offset_by(kinematics.pose.position),
            landed_state: LandedState::Landed,
            timestamp,
        }
    }

    fn wrap_controls(controls: MultirotorControls) -> VehicleControls {
        VehicleControls::Multirotor(controls)
    }

    fn unwrap_controls(controls: VehicleControls) -> Option<MultirotorControls> {
        match controls {
            VehicleControls::Multirotor(c) => Some(c),
            _ => None,
        }
    }

    fn wrap_state(state: MultirotorState) -> VehicleStateSnapshot {
        VehicleStateSnapshot::Multirotor(state)
    }

    fn unwrap_state(state: VehicleStateSnapshot) -> Option<MultirotorState> {
        match state {
            VehicleStateSnapshot::Multirotor(s) => Some(s),
            _ => None,
        }
    }
}

pub type MultirotorApi = VehicleApiBase<Multirotor>;
