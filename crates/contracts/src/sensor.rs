//! SensorReading - 传感器输出
//!
//! 每个内置传感器类型的最新读数，以及一个 tick 内全部读数的集合。

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, Pose, Quaternion, Vector3};

/// 单个传感器读数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorReading {
    Gps(GpsData),
    Imu(ImuData),
    Barometer(BarometerData),
    Magnetometer(MagnetometerData),
    Distance(DistanceData),
}

impl SensorReading {
    /// Simulated time the reading was produced at (nanoseconds)
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Gps(d) => d.timestamp,
            Self::Imu(d) => d.timestamp,
            Self::Barometer(d) => d.timestamp,
            Self::Magnetometer(d) => d.timestamp,
            Self::Distance(d) => d.timestamp,
        }
    }
}

/// GNSS 定位状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GnssFixType {
    #[default]
    NoFix,
    TimeOnly,
    Fix2d,
    Fix3d,
}

/// GPS 数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsData {
    pub timestamp: u64,
    pub geo_point: GeoPoint,
    /// 水平精度 (m)
    pub eph: f32,
    /// 垂直精度 (m)
    pub epv: f32,
    /// NED 速度 (m/s)
    pub velocity: Vector3,
    pub fix_type: GnssFixType,
    pub is_valid: bool,
}

/// IMU 数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    pub timestamp: u64,
    pub orientation: Quaternion,
    /// 机体坐标系角速度 (rad/s)
    pub angular_velocity: Vector3,
    /// 机体坐标系比力 (m/s^2)
    pub linear_acceleration: Vector3,
}

/// 气压计数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarometerData {
    pub timestamp: u64,
    /// 气压高度 (m)
    pub altitude: f32,
    /// Pa
    pub pressure: f32,
    /// 海平面修正气压 (hPa)
    pub qnh: f32,
}

/// 磁力计数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnetometerData {
    pub timestamp: u64,
    /// 机体坐标系磁场 (gauss)
    pub magnetic_field_body: Vector3,
    pub magnetic_field_covariance: f32,
}

/// 测距数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceData {
    pub timestamp: u64,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// 相对车体的安装位姿
    pub relative_pose: Pose,
}

/// One tick's worth of readings, in sensor insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    pub timestamp: u64,
    pub entries: Vec<NamedReading>,
}

/// Reading tagged with the name of the sensor that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedReading {
    pub sensor: String,
    pub reading: SensorReading,
}

impl SensorReadings {
    pub fn get(&self, sensor: &str) -> Option<&SensorReading> {
        self.entries
            .iter()
            .find(|e| e.sensor == sensor)
            .map(|e| &e.reading)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_serializes_with_type_tag() {
        let reading = SensorReading::Barometer(BarometerData {
            timestamp: 7,
            altitude: 122.0,
            pressure: 99_876.0,
            qnh: 1013.25,
        });
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["type"], "barometer");
        assert_eq!(json["timestamp"], 7);
        assert_eq!(reading.timestamp(), 7);
    }

    #[test]
    fn lookup_by_sensor_name() {
        let readings = SensorReadings {
            timestamp: 1,
            entries: vec![NamedReading {
                sensor: "mag".into(),
                reading: SensorReading::Magnetometer(MagnetometerData {
                    timestamp: 1,
                    magnetic_field_body: Vector3::ZERO,
                    magnetic_field_covariance: 0.0,
                }),
            }],
        };
        assert!(readings.get("mag").is_some());
        assert!(readings.get("gps").is_none());
        assert_eq!(readings.len(), 1);
    }
}
