//! Request / response records of the JSON-lines protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RpcError};

/// One request line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: u64,
    /// Target vehicle; empty means the default vehicle
    #[serde(default)]
    pub vehicle: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, vehicle: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            id,
            vehicle: vehicle.into(),
            method: method.into(),
            params: Value::Null,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// Decoded operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    // ===== Server level =====
    Ping,
    ListVehicles,

    // ===== Per vehicle =====
    /// Raw controls object; the vehicle type tag is filled in by the router
    SetControls(Value),
    GetControls,
    GetState,
    EnableApiControl(bool),
    IsApiControlEnabled,
    ArmDisarm(bool),
    ArmState,
    GetHomeGeoPoint,
    Reset,
    GetSensorReading(String),
    GetSensorReadings,
    ReportState,
}

/// Every method name the server understands
pub const METHODS: &[&str] = &[
    "ping",
    "list_vehicles",
    "set_controls",
    "get_controls",
    "get_state",
    "enable_api_control",
    "is_api_control_enabled",
    "arm_disarm",
    "arm_state",
    "get_home_geo_point",
    "reset",
    "get_sensor_reading",
    "get_sensor_readings",
    "report_state",
];

impl Operation {
    /// Bounded label for `method`: the known name, or `"unknown"`.
    pub fn method_label(method: &str) -> &'static str {
        METHODS.iter().copied().find(|m| *m == method).unwrap_or("unknown")
    }

    /// Decode `method` + `params`.
    pub fn parse(method: &str, params: &Value) -> Result<Self> {
        let op = match method {
            "ping" => Self::Ping,
            "list_vehicles" => Self::ListVehicles,
            "set_controls" => Self::SetControls(object_param(method, params)?),
            "get_controls" => Self::GetControls,
            "get_state" => Self::GetState,
            "enable_api_control" => Self::EnableApiControl(bool_param(method, params, "enabled")?),
            "is_api_control_enabled" => Self::IsApiControlEnabled,
            "arm_disarm" => Self::ArmDisarm(bool_param(method, params, "arm")?),
            "arm_state" => Self::ArmState,
            "get_home_geo_point" => Self::GetHomeGeoPoint,
            "reset" => Self::Reset,
            "get_sensor_reading" => {
                Self::GetSensorReading(str_param(method, params, "sensor")?.to_string())
            }
            "get_sensor_readings" => Self::GetSensorReadings,
            "report_state" => Self::ReportState,
            other => return Err(RpcError::unknown_method(other)),
        };
        Ok(op)
    }

    /// Server-level operations ignore the `vehicle` field.
    pub fn is_server_level(&self) -> bool {
        matches!(self, Self::Ping | Self::ListVehicles)
    }
}

fn object_param(method: &str, params: &Value) -> Result<Value> {
    match params {
        Value::Object(_) => Ok(params.clone()),
        _ => Err(RpcError::invalid_params(method, "expected an object")),
    }
}

fn bool_param(method: &str, params: &Value, key: &str) -> Result<bool> {
    params
        .get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| RpcError::invalid_params(method, format!("missing bool '{key}'")))
}

fn str_param<'a>(method: &str, params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params(method, format!("missing string '{key}'")))
}

/// Error detail of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// Outcome carried next to the request id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseBody {
    Ok { value: Value },
    Error { error: ErrorBody },
}

/// One response line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: u64,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl RpcResponse {
    pub fn ok(id: u64, value: Value) -> Self {
        Self {
            id,
            body: ResponseBody::Ok { value },
        }
    }

    pub fn error(id: u64, error: &RpcError) -> Self {
        Self {
            id,
            body: ResponseBody::Error {
                error: ErrorBody {
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                },
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.body, ResponseBody::Ok { .. })
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Ok { value } => Some(value),
            ResponseBody::Error { .. } => None,
        }
    }

    pub fn error_body(&self) -> Option<&ErrorBody> {
        match &self.body {
            ResponseBody::Ok { .. } => None,
            ResponseBody::Error { error } => Some(error),
        }
    }
}
