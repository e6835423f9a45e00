//! Concrete vehicle types.

pub mod car;
pub mod multirotor;
pub mod warthog;

use std::sync::Arc;

use contracts::{Environment, KinematicsState, Result, VehicleSetting, VehicleType};
use sensors::SensorFactory;

use crate::api::VehicleApi;
use crate::base::VehicleApiBase;

/// Build and initialize the Vehicle API matching `setting.vehicle_type`.
///
/// The initial kinematics come from `spawn_pose` (origin when absent).
pub fn build_vehicle(
    setting: &VehicleSetting,
    factory: Arc<dyn SensorFactory>,
    environment: &Environment,
) -> Result<Arc<dyn VehicleApi>> {
    let kinematics = setting
        .spawn_pose
        .map(KinematicsState::at_pose)
        .unwrap_or_default();

    let api: Arc<dyn VehicleApi> = match setting.vehicle_type {
        VehicleType::Warthog => Arc::new(VehicleApiBase::<warthog::Warthog>::new(
            setting,
            factory,
            &kinematics,
            environment,
        )?),
        VehicleType::Car => Arc::new(VehicleApiBase::<car::Car>::new(
            setting,
            factory,
            &kinematics,
            environment,
        )?),
        VehicleType::Multirotor => Arc::new(VehicleApiBase::<multirotor::Multirotor>::new(
            setting,
            factory,
            &kinematics,
            environment,
        )?),
    };
    Ok(api)
}
