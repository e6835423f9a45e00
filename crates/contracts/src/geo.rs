//! Geodetic reference points.

use serde::{Deserialize, Serialize};

use crate::Vector3;

const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// WGS84 latitude / longitude (degrees) and altitude (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self {
            latitude: 47.641468,
            longitude: -122.140165,
            altitude: 122.0,
        }
    }
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64, altitude: f32) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Geo point at a local NED offset from `self` (flat-earth approximation).
    pub fn offset_by(&self, local: Vector3) -> Self {
        let lat_rad = self.latitude.to_radians();
        let d_lat = f64::from(local.x) / EARTH_RADIUS_M;
        let d_lon = f64::from(local.y) / (EARTH_RADIUS_M * lat_rad.cos());

        Self {
            latitude: self.latitude + d_lat.to_degrees(),
            longitude: self.longitude + d_lon.to_degrees(),
            altitude: self.altitude - local.z,
        }
    }
}
