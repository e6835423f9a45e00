//! Built-in ground-truth sensor models.
//!
//! Each module exposes `SENSOR_TYPE` and a `build` constructor registered by
//! [`DefaultSensorFactory::with_builtin`](crate::DefaultSensorFactory::with_builtin).

pub mod barometer;
pub mod distance;
pub mod gps;
pub mod imu;
pub mod magnetometer;
