//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::{GeoPoint, SimulationSettings};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    server: ServerInfo,
    tick_rate_hz: f64,
    origin: GeoPoint,
    vehicles: Vec<VehicleInfo>,
}

#[derive(Serialize)]
struct ServerInfo {
    bind_address: String,
    max_request_bytes: usize,
}

#[derive(Serialize)]
struct VehicleInfo {
    name: String,
    vehicle_type: String,
    control_policy: String,
    home: GeoPoint,
    sensor_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensors: Vec<SensorInfo>,
}

#[derive(Serialize)]
struct SensorInfo {
    name: String,
    sensor_type: String,
    enabled: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, f64>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let settings = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&settings, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&settings, args);
    }

    Ok(())
}

fn build_config_info(settings: &SimulationSettings, args: &InfoArgs) -> ConfigInfo {
    let vehicles = settings
        .vehicles
        .iter()
        .map(|v| VehicleInfo {
            name: v.name.clone(),
            vehicle_type: v.vehicle_type.to_string(),
            control_policy: format!("{:?}", v.control_policy).to_lowercase(),
            home: settings.home_geo_point(v),
            sensor_count: v.sensors.len(),
            sensors: if args.sensors {
                v.sensors
                    .iter()
                    .map(|s| SensorInfo {
                        name: s.name.clone(),
                        sensor_type: s.sensor_type.clone(),
                        enabled: s.enabled,
                        params: s.params.clone(),
                    })
                    .collect()
            } else {
                Vec::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", settings.version),
        server: ServerInfo {
            bind_address: settings.server.bind_address(),
            max_request_bytes: settings.server.max_request_bytes,
        },
        tick_rate_hz: settings.clock.tick_rate_hz,
        origin: settings.origin,
        vehicles,
    }
}

fn print_config_info(settings: &SimulationSettings, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Vehicle Bridge Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔌 Server");
    println!("   ├─ Version: {:?}", settings.version);
    println!("   ├─ Bind: {}", settings.server.bind_address());
    println!("   ├─ Max request: {} bytes", settings.server.max_request_bytes);
    println!("   └─ Tick rate: {} Hz", settings.clock.tick_rate_hz);

    let origin = &settings.origin;
    println!("\n📍 Origin");
    println!(
        "   └─ lat {:.6}, lon {:.6}, alt {:.1} m",
        origin.latitude, origin.longitude, origin.altitude
    );

    println!("\n🚗 Vehicles ({})", settings.vehicles.len());
    for (i, vehicle) in settings.vehicles.iter().enumerate() {
        let is_last = i == settings.vehicles.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };
        let default_marker = if i == 0 { " [default]" } else { "" };

        println!(
            "   {} {} ({}, {:?}){}",
            prefix, vehicle.name, vehicle.vehicle_type, vehicle.control_policy, default_marker
        );

        if args.sensors && !vehicle.sensors.is_empty() {
            println!("   {}  📡 Sensors ({}):", child_prefix, vehicle.sensors.len());
            for (j, sensor) in vehicle.sensors.iter().enumerate() {
                let sensor_is_last = j == vehicle.sensors.len() - 1;
                let sensor_prefix = if sensor_is_last { "└─" } else { "├─" };
                let state = if sensor.enabled { "" } else { ", disabled" };
                println!(
                    "   {}     {} {} ({}{})",
                    child_prefix, sensor_prefix, sensor.name, sensor.sensor_type, state
                );
            }
        } else {
            println!("   {}  └─ {} sensors", child_prefix, vehicle.sensors.len());
        }
    }

    println!();
}
