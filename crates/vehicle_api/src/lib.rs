//! # Vehicle API
//!
//! Per-vehicle control and telemetry surface.
//!
//! Responsibilities:
//! - `VehicleApi` trait shared by every vehicle type
//! - `VehicleApiBase<K>`: sensors, latched command and published snapshot
//! - Vehicle kinds: warthog, car, multirotor
//! - `ApiProvider`: name → vehicle registry

pub mod api;
pub mod base;
pub mod control;
pub mod kind;
pub mod provider;
pub mod state;
pub mod vehicles;
pub mod wire;

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use api::{ArmState, VehicleApi};
pub use base::VehicleApiBase;
pub use control::{ControlCommand, ControlLatch, ControlMode, ControlRange};
pub use kind::{ArmingModel, VehicleKind};
pub use provider::{ApiProvider, VehicleBuildError};
pub use state::{StateCell, VehicleState};
pub use vehicles::build_vehicle;
pub use vehicles::car::{Car, CarApi, CarControls, CarState};
pub use vehicles::multirotor::{
    LandedState, Multirotor, MultirotorApi, MultirotorControls, MultirotorState,
};
pub use vehicles::warthog::{Warthog, WarthogApi, WarthogControls, WarthogState};
pub use wire::{VehicleControls, VehicleStateSnapshot};

// A panic while holding one of these locks leaves plain data behind, so the
// guard is recovered instead of propagating the poison.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
