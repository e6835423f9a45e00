//! # Contracts
//!
//! Shared interface contracts, defining inter-crate data structures and traits.
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Simulated time is a monotonic `u64` in nanoseconds, stamped by the tick thread
//! - Frames are NED, units SI

mod error;
mod geo;
mod kinematics;
mod reporter;
mod sensor;
mod sensor_model;
mod settings;

pub use error::*;
pub use geo::GeoPoint;
pub use kinematics::*;
pub use reporter::StateReporter;
pub use sensor::*;
pub use sensor_model::SensorModel;
pub use settings::*;
