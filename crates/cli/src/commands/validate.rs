//! `validate` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::SimulationSettings;
use sensors::DefaultSensorFactory;
use serde::Serialize;
use tracing::info;
use vehicle_api::ApiProvider;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    build_errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    bind_address: String,
    tick_rate_hz: f64,
    vehicle_count: usize,
    sensor_count: usize,
}

impl ValidationResult {
    fn invalid(config_path: String, error: String) -> Self {
        Self {
            valid: false,
            config_path,
            error: Some(error),
            warnings: Vec::new(),
            build_errors: Vec::new(),
            summary: None,
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), build = args.build, "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult::invalid(
            config_path,
            format!("File not found: {}", args.config.display()),
        );
    }

    let settings = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(settings) => settings,
        Err(e) => return ValidationResult::invalid(config_path, e.to_string()),
    };

    // 可选：实际构建一次车辆，暴露未知传感器类型与非法参数
    let build_errors = if args.build {
        build_check(&settings)
    } else {
        Vec::new()
    };

    ValidationResult {
        valid: build_errors.is_empty(),
        config_path,
        error: None,
        warnings: collect_warnings(&settings),
        build_errors,
        summary: Some(ConfigSummary {
            version: format!("{:?}", settings.version),
            bind_address: settings.server.bind_address(),
            tick_rate_hz: settings.clock.tick_rate_hz,
            vehicle_count: settings.vehicles.len(),
            sensor_count: settings.vehicles.iter().map(|v| v.sensors.len()).sum(),
        }),
    }
}

fn build_check(settings: &SimulationSettings) -> Vec<String> {
    let factory = Arc::new(DefaultSensorFactory::with_builtin());
    let (_, failures) = ApiProvider::from_settings(settings, factory);
    failures
        .into_iter()
        .map(|f| format!("Vehicle '{}': {}", f.vehicle, f.error))
        .collect()
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(settings: &SimulationSettings) -> Vec<String> {
    let mut warnings = Vec::new();

    if settings.vehicles.is_empty() {
        warnings.push("No vehicles configured - every request will fail routing".to_string());
    }

    let factory = DefaultSensorFactory::with_builtin();
    for vehicle in &settings.vehicles {
        if vehicle.sensors.is_empty() {
            warnings.push(format!(
                "Vehicle '{}' has no sensors configured",
                vehicle.name
            ));
        }
        for sensor in &vehicle.sensors {
            if !sensor.enabled {
                warnings.push(format!(
                    "Sensor '{}' on vehicle '{}' is disabled",
                    sensor.name, vehicle.name
                ));
            } else if !factory.supports(&sensor.sensor_type) {
                warnings.push(format!(
                    "Sensor '{}' on vehicle '{}' has unknown type '{}'",
                    sensor.name, vehicle.name, sensor.sensor_type
                ));
            }
        }
    }

    if settings.server.host == "0.0.0.0" {
        warnings.push("RPC server listens on all interfaces".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }

    if let Some(ref summary) = result.summary {
        println!("\n  Version: {}", summary.version);
        println!("  RPC server: {}", summary.bind_address);
        println!("  Tick rate: {} Hz", summary.tick_rate_hz);
        println!("  Vehicles: {}", summary.vehicle_count);
        println!("  Sensors: {}", summary.sensor_count);
    }

    if !result.build_errors.is_empty() {
        println!("\n✗ Build errors:");
        for error in &result.build_errors {
            println!("  - {}", error);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n⚠ Warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CONFIG: &str = r#"
[server]
host = "0.0.0.0"

[[vehicles]]
name = "rover"
vehicle_type = "warthog"

[[vehicles]]
name = "car1"
vehicle_type = "car"

[[vehicles.sensors]]
name = "lidar"
sensor_type = "lidar"
"#;

    fn args(path: PathBuf, build: bool) -> ValidateArgs {
        ValidateArgs {
            config: path,
            build,
            json: true,
        }
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, CONFIG).unwrap();

        let result = validate_config(&args(path, false));
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.vehicle_count, 2);
        assert_eq!(summary.sensor_count, 1);

        assert!(result.warnings.iter().any(|w| w.contains("'rover' has no sensors")));
        assert!(result.warnings.iter().any(|w| w.contains("unknown type 'lidar'")));
        assert!(result.warnings.iter().any(|w| w.contains("all interfaces")));
    }

    #[test]
    fn test_build_check_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, CONFIG).unwrap();

        let result = validate_config(&args(path, true));
        assert!(!result.valid);
        assert_eq!(result.build_errors.len(), 1);
        assert!(result.build_errors[0].contains("car1"));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[clock]\ntick_rate_hz = -1.0\n").unwrap();

        let result = validate_config(&args(path, false));
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&args(PathBuf::from("/nonexistent/bridge.toml"), false));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
        assert!(run_validate(&args(PathBuf::from("/nonexistent/bridge.toml"), false)).is_err());
    }
}
