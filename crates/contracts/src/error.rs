//! Layered error definitions
//!
//! Categorized by source: configuration / routing / validation / sensor

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Sensor setting names a type no factory constructor is registered for
    #[error("unknown sensor type '{sensor_type}' for sensor '{sensor}'")]
    UnknownSensorType { sensor: String, sensor_type: String },

    /// Sensor setting has a bad parameter
    #[error("malformed setting for sensor '{sensor}': {message}")]
    MalformedSensor { sensor: String, message: String },

    // ===== Routing Errors =====
    /// No vehicle registered under this name
    #[error("vehicle not found: '{vehicle}'")]
    VehicleNotFound { vehicle: String },

    /// Vehicle name already taken in the registry
    #[error("vehicle already registered: '{vehicle}'")]
    DuplicateVehicle { vehicle: String },

    // ===== Validation Errors =====
    /// Control field outside its documented range (reject policy)
    #[error("control '{field}' = {value} outside [{min}, {max}]")]
    ControlOutOfRange {
        field: String,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Controls or state built for another vehicle type
    #[error("vehicle '{vehicle}' is a {expected}, got {actual} payload")]
    VehicleTypeMismatch {
        vehicle: String,
        expected: String,
        actual: String,
    },

    /// Snapshot older than the one already published
    #[error("stale snapshot for vehicle '{vehicle}': timestamp {timestamp} < latest {latest}")]
    StaleSnapshot {
        vehicle: String,
        timestamp: u64,
        latest: u64,
    },

    /// Sensor lookup by name failed
    #[error("sensor '{sensor}' not found on vehicle '{vehicle}'")]
    SensorNotFound { vehicle: String, sensor: String },

    // ===== Sensor Errors =====
    /// A single sensor failed during update / report
    #[error("sensor '{sensor}' fault: {message}")]
    SensorFault { sensor: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Coarse error category, used as a wire label and a metrics dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Routing,
    Validation,
    SensorFault,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Routing => "routing",
            Self::Validation => "validation",
            Self::SensorFault => "sensor_fault",
            Self::Internal => "internal",
        }
    }
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown sensor type error
    pub fn unknown_sensor_type(sensor: impl Into<String>, sensor_type: impl Into<String>) -> Self {
        Self::UnknownSensorType {
            sensor: sensor.into(),
            sensor_type: sensor_type.into(),
        }
    }

    /// Create malformed sensor setting error
    pub fn malformed_sensor(sensor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSensor {
            sensor: sensor.into(),
            message: message.into(),
        }
    }

    /// Create routing error
    pub fn vehicle_not_found(vehicle: impl Into<String>) -> Self {
        Self::VehicleNotFound {
            vehicle: vehicle.into(),
        }
    }

    /// Create duplicate registration error
    pub fn duplicate_vehicle(vehicle: impl Into<String>) -> Self {
        Self::DuplicateVehicle {
            vehicle: vehicle.into(),
        }
    }

    /// Create rejected control error
    pub fn control_out_of_range(field: impl Into<String>, value: f32, min: f32, max: f32) -> Self {
        Self::ControlOutOfRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    /// Create sensor lookup error
    pub fn sensor_not_found(vehicle: impl Into<String>, sensor: impl Into<String>) -> Self {
        Self::SensorNotFound {
            vehicle: vehicle.into(),
            sensor: sensor.into(),
        }
    }

    /// Create sensor fault
    pub fn sensor_fault(sensor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SensorFault {
            sensor: sensor.into(),
            message: message.into(),
        }
    }

    /// Create vehicle type mismatch error
    pub fn type_mismatch(
        vehicle: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::VehicleTypeMismatch {
            vehicle: vehicle.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::UnknownSensorType { .. }
            | Self::MalformedSensor { .. } => ErrorKind::Configuration,
            Self::VehicleNotFound { .. } | Self::DuplicateVehicle { .. } => ErrorKind::Routing,
            Self::ControlOutOfRange { .. }
            | Self::VehicleTypeMismatch { .. }
            | Self::StaleSnapshot { .. }
            | Self::SensorNotFound { .. } => ErrorKind::Validation,
            Self::SensorFault { .. } => ErrorKind::SensorFault,
            Self::Io(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ContractError>;
