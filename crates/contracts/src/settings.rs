//! SimulationSettings - Config Loader 输出
//!
//! 描述完整的仿真配置：服务端、时钟、原点、车辆及其传感器。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{GeoPoint, Pose};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的仿真配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// RPC 服务端设置
    #[serde(default)]
    pub server: ServerSettings,

    /// 仿真时钟
    #[serde(default)]
    pub clock: ClockSettings,

    /// 仿真原点，车辆未指定 home 点时使用
    #[serde(default)]
    pub origin: GeoPoint,

    /// 车辆定义列表（第一个为默认车辆）
    #[serde(default)]
    pub vehicles: Vec<VehicleSetting>,
}

impl SimulationSettings {
    /// Home point for `vehicle`, falling back to the simulation origin.
    pub fn home_geo_point(&self, vehicle: &VehicleSetting) -> GeoPoint {
        vehicle.home_geo_point.unwrap_or(self.origin)
    }
}

/// RPC 服务端设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// 单行请求的最大字节数，超过则断开连接
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    41451
}

fn default_max_request_bytes() -> usize {
    64 * 1024
}

/// 仿真时钟
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSettings {
    /// tick 频率 (Hz)，必须 > 0
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
        }
    }
}

fn default_tick_rate_hz() -> f64 {
    100.0
}

/// 车辆类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Warthog,
    Car,
    Multirotor,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warthog => "warthog",
            Self::Car => "car",
            Self::Multirotor => "multirotor",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 超出范围的控制量如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPolicy {
    /// 截断到最近的边界
    #[default]
    Clamp,
    /// 拒绝并保留上一条命令
    Reject,
}

/// 车辆配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSetting {
    /// 唯一标识符
    pub name: String,

    /// 车辆类型
    pub vehicle_type: VehicleType,

    #[serde(default)]
    pub control_policy: ControlPolicy,

    /// Home 点 (可选)
    #[serde(default)]
    pub home_geo_point: Option<GeoPoint>,

    /// 初始位姿 (可选)
    #[serde(default)]
    pub spawn_pose: Option<Pose>,

    /// 挂载的传感器列表，按顺序构建
    #[serde(default)]
    pub sensors: Vec<SensorSetting>,
}

impl VehicleSetting {
    pub fn new(name: impl Into<String>, vehicle_type: VehicleType) -> Self {
        Self {
            name: name.into(),
            vehicle_type,
            control_policy: ControlPolicy::default(),
            home_geo_point: None,
            spawn_pose: None,
            sensors: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: ControlPolicy) -> Self {
        self.control_policy = policy;
        self
    }

    pub fn with_sensor(mut self, sensor: SensorSetting) -> Self {
        self.sensors.push(sensor);
        self
    }
}

/// 传感器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSetting {
    /// 车辆内唯一
    pub name: String,

    /// 传感器类型，由 factory 解析
    pub sensor_type: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 类型相关的数值参数
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

fn default_enabled() -> bool {
    true
}

impl SensorSetting {
    pub fn new(name: impl Into<String>, sensor_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sensor_type: sensor_type.into(),
            enabled: true,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
