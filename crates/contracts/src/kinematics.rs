//! Kinematic snapshot types produced by the physics collaborator.
//!
//! Frame convention is NED (x north, y east, z down), units SI.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Unit quaternion (body → world rotation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Build from roll / pitch / yaw (radians, ZYX order)
    pub fn from_euler(roll: f32, pitch: f32, yaw: f32) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();

        Self {
            w: cr * cp * cy + sr * sp * sy,
            x: sr * cp * cy - cr * sp * sy,
            y: cr * sp * cy + sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
        }
    }

    pub fn from_yaw(yaw: f32) -> Self {
        Self::from_euler(0.0, 0.0, yaw)
    }

    pub fn conjugate(&self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Heading around the down axis (radians)
    pub fn yaw(&self) -> f32 {
        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        siny_cosp.atan2(cosy_cosp)
    }

    /// Rotate `v` by this quaternion
    pub fn rotate(&self, v: Vector3) -> Vector3 {
        // v' = v + 2w(u × v) + 2u × (u × v)
        let u = Vector3::new(self.x, self.y, self.z);
        let uv = u.cross(&v);
        let uuv = u.cross(&uv);
        v + uv * (2.0 * self.w) + uuv * 2.0
    }

    /// Rotate a world-frame vector into the body frame
    pub fn rotate_inverse(&self, v: Vector3) -> Vector3 {
        self.conjugate().rotate(v)
    }
}

/// Position + orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

/// Kinematic state of a body at one simulated instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicsState {
    pub pose: Pose,
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
    pub linear_acceleration: Vector3,
    pub angular_acceleration: Vector3,
}

impl KinematicsState {
    pub fn at_pose(pose: Pose) -> Self {
        Self {
            pose,
            ..Self::default()
        }
    }
}

/// Ambient environment around the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub position: Vector3,
    pub geo_point: GeoPoint,
    pub gravity: Vector3,
    /// Pascal
    pub air_pressure: f32,
    /// Kelvin
    pub temperature: f32,
    /// kg/m^3
    pub air_density: f32,
}

impl Environment {
    /// Sea-level standard atmosphere at `geo_point`.
    pub fn standard(geo_point: GeoPoint) -> Self {
        Self {
            position: Vector3::ZERO,
            geo_point,
            gravity: Vector3::new(0.0, 0.0, 9.80665),
            air_pressure: 101_325.0,
            temperature: 288.15,
            air_density: 1.225,
        }
    }

    /// Move to a local NED `position` relative to `home`.
    ///
    /// Geo point follows the flat-earth offset; pressure, temperature and
    /// density follow the ISA troposphere model.
    pub fn set_position(&mut self, home: GeoPoint, position: Vector3) {
        const SEA_LEVEL_PRESSURE: f32 = 101_325.0;
        const SEA_LEVEL_TEMPERATURE: f32 = 288.15;
        const LAPSE_RATE: f32 = 0.0065;
        const GAS_CONSTANT: f32 = 287.053;

        self.position = position;
        self.geo_point = home.offset_by(position);

        let altitude = self.geo_point.altitude;
        self.temperature = SEA_LEVEL_TEMPERATURE - LAPSE_RATE * altitude;
        let ratio = self.temperature / SEA_LEVEL_TEMPERATURE;
        self.air_pressure = SEA_LEVEL_PRESSURE * ratio.powf(5.255_88);
        self.air_density = self.air_pressure / (GAS_CONSTANT * self.temperature);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::standard(GeoPoint::default())
    }
}

/// Everything a sensor model may observe for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundTruth {
    pub kinematics: KinematicsState,
    pub environment: Environment,
    /// Simulated time, nanoseconds
    pub timestamp: u64,
}
