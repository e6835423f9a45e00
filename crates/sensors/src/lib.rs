//! # Sensors
//!
//! Virtual sensor composition for a single vehicle.
//!
//! Responsibilities:
//! - Own a vehicle's sensor models (`SensorStorage`)
//! - Fan lifecycle calls out in insertion order (`SensorCollection`)
//! - Build sensors from declarative settings (`SensorFactory`)
//! - Provide ground-truth models: gps, imu, barometer, magnetometer, distance
//! - Provide a mock sensor for tests

pub mod collection;
pub mod factory;
pub mod mock_sensor;
pub mod models;
pub mod params;
pub mod storage;

pub use collection::SensorCollection;
pub use factory::{DefaultSensorFactory, SensorConstructor, SensorFactory};
pub use mock_sensor::{MockCounters, MockSensor, MockSensorConfig};
pub use params::ParamReader;
pub use storage::{SensorHandle, SensorStorage};
