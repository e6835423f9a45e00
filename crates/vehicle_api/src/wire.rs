//! Type-erased commands and snapshots carried across the `VehicleApi` trait.

use serde::{Deserialize, Serialize};

use contracts::{KinematicsState, VehicleType};

use crate::state::VehicleState;
use crate::vehicles::car::{CarControls, CarState};
use crate::vehicles::multirotor::{MultirotorControls, MultirotorState};
use crate::vehicles::warthog::{WarthogControls, WarthogState};

/// Control command of any vehicle type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "vehicle_type", rename_all = "snake_case")]
pub enum VehicleControls {
    Warthog(WarthogControls),
    Car(CarControls),
    Multirotor(MultirotorControls),
}

impl VehicleControls {
    pub fn vehicle_type(&self) -> VehicleType {
        match self {
            Self::Warthog(_) => VehicleType::Warthog,
            Self::Car(_) => VehicleType::Car,
            Self::Multirotor(_) => VehicleType::Multirotor,
        }
    }
}

/// State snapshot of any vehicle type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "vehicle_type", rename_all = "snake_case")]
pub enum VehicleStateSnapshot {
    Warthog(WarthogState),
    Car(CarState),
    Multirotor(MultirotorState),
}

impl VehicleStateSnapshot {
    pub fn vehicle_type(&self) -> VehicleType {
        match self {
            Self::Warthog(_) => VehicleType::Warthog,
            Self::Car(_) => VehicleType::Car,
            Self::Multirotor(_) => VehicleType::Multirotor,
        }
    }

    pub fn kinematics(&self) -> &KinematicsState {
        match self {
            Self::Warthog(s) => s.kinematics(),
            Self::Car(s) => s.kinematics(),
            Self::Multirotor(s) => s.kinematics(),
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Warthog(s) => s.timestamp(),
            Self::Car(s) => s.timestamp(),
            Self::Multirotor(s) => s.timestamp(),
        }
    }
}
