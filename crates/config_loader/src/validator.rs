//! 配置校验模块
//!
//! 校验规则：
//! - vehicle name 非空且唯一
//! - 每辆车内 sensor name 非空且唯一
//! - sensor_type 非空
//! - 传感器参数为有限数值
//! - tick_rate_hz > 0
//! - server.port != 0, max_request_bytes > 0

use std::collections::HashSet;

use contracts::{ContractError, SimulationSettings};

/// 校验 SimulationSettings 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(settings: &SimulationSettings) -> Result<(), ContractError> {
    validate_vehicle_names(settings)?;
    validate_sensor_settings(settings)?;
    validate_clock(settings)?;
    validate_server(settings)?;
    Ok(())
}

/// 校验 vehicle name 唯一性
fn validate_vehicle_names(settings: &SimulationSettings) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, vehicle) in settings.vehicles.iter().enumerate() {
        if vehicle.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("vehicles[{idx}].name"),
                "vehicle name cannot be empty",
            ));
        }
        if !seen.insert(&vehicle.name) {
            return Err(ContractError::config_validation(
                format!("vehicles[name={}]", vehicle.name),
                "duplicate vehicle name",
            ));
        }
    }
    Ok(())
}

/// 校验传感器配置 (车辆内唯一)
fn validate_sensor_settings(settings: &SimulationSettings) -> Result<(), ContractError> {
    for vehicle in &settings.vehicles {
        let mut seen = HashSet::new();
        for (idx, sensor) in vehicle.sensors.iter().enumerate() {
            if sensor.name.trim().is_empty() {
                return Err(ContractError::config_validation(
                    format!("vehicles[{}].sensors[{idx}].name", vehicle.name),
                    "sensor name cannot be empty",
                ));
            }
            if !seen.insert(&sensor.name) {
                return Err(ContractError::config_validation(
                    format!("vehicles[{}].sensors[name={}]", vehicle.name, sensor.name),
                    "duplicate sensor name",
                ));
            }
            if sensor.sensor_type.trim().is_empty() {
                return Err(ContractError::config_validation(
                    format!("vehicles[{}].sensors[{}].sensor_type", vehicle.name, sensor.name),
                    "sensor_type cannot be empty",
                ));
            }
            if let Some((key, value)) = sensor.params.iter().find(|(_, v)| !v.is_finite()) {
                return Err(ContractError::config_validation(
                    format!(
                        "vehicles[{}].sensors[{}].params.{key}",
                        vehicle.name, sensor.name
                    ),
                    format!("param must be finite, got {value}"),
                ));
            }
        }
    }
    Ok(())
}

/// 校验时钟
fn validate_clock(settings: &SimulationSettings) -> Result<(), ContractError> {
    let rate = settings.clock.tick_rate_hz;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ContractError::config_validation(
            "clock.tick_rate_hz",
            format!("tick_rate_hz must be > 0, got {rate}"),
        ));
    }
    Ok(())
}

/// 校验服务端设置
fn validate_server(settings: &SimulationSettings) -> Result<(), ContractError> {
    let server = &settings.server;
    if server.host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "server.host",
            "host cannot be empty",
        ));
    }
    if server.port == 0 {
        return Err(ContractError::config_validation(
            "server.port",
            "port must be non-zero",
        ));
    }
    if server.max_request_bytes == 0 {
        return Err(ContractError::config_validation(
            "server.max_request_bytes",
            "max_request_bytes must be > 0",
        ));
    }
    Ok(())
}
