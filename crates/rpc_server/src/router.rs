//! RequestRouter - resolves the target vehicle and marshals one operation.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use contracts::{ContractError, StateReporter};
use vehicle_api::{ApiProvider, VehicleApi, VehicleControls};

use crate::error::{Result, RpcError};
use crate::request::{Operation, RpcRequest, RpcResponse};

/// Version reported by `ping`
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stateless request router over a shared registry
#[derive(Debug, Clone)]
pub struct RequestRouter {
    provider: Arc<ApiProvider>,
}

impl RequestRouter {
    pub fn new(provider: Arc<ApiProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<ApiProvider> {
        &self.provider
    }

    /// Decode one request line and handle it.
    ///
    /// Undecodable lines produce an error response; the id is recovered when
    /// the line is at least a JSON object with a numeric `id`.
    pub fn handle_line(&self, line: &str) -> RpcResponse {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => return malformed(0, e),
        };
        let id = value.get("id").and_then(Value::as_u64).unwrap_or(0);

        match serde_json::from_value::<RpcRequest>(value) {
            Ok(request) => self.handle(request),
            Err(e) => malformed(id, e),
        }
    }

    /// Handle one decoded request.
    pub fn handle(&self, request: RpcRequest) -> RpcResponse {
        let start = Instant::now();
        let result = self.dispatch(&request);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        let method = Operation::method_label(&request.method);
        observability::record_rpc_request(method, result.is_ok(), latency_ms);

        match result {
            Ok(value) => RpcResponse::ok(request.id, value),
            Err(e) => {
                if let RpcError::Contract(ContractError::VehicleNotFound { .. }) = &e {
                    observability::record_routing_error();
                    warn!(
                        id = request.id,
                        vehicle = %request.vehicle,
                        method = %request.method,
                        "request for unknown vehicle"
                    );
                } else {
                    debug!(
                        id = request.id,
                        vehicle = %request.vehicle,
                        method = %request.method,
                        error = %e,
                        "request failed"
                    );
                }
                RpcResponse::error(request.id, &e)
            }
        }
    }

    fn dispatch(&self, request: &RpcRequest) -> Result<Value> {
        let op = Operation::parse(&request.method, &request.params)?;
        let vehicle =
            || -> Result<Arc<dyn VehicleApi>> { Ok(self.provider.get(&request.vehicle)?) };

        match op {
            Operation::Ping => Ok(json!({ "version": SERVER_VERSION })),
            Operation::ListVehicles => encode(self.provider.names()),

            Operation::SetControls(params) => {
                let vehicle = vehicle()?;
                let controls = decode_controls(vehicle.as_ref(), params)?;
                vehicle.set_controls(controls)?;
                Ok(Value::Null)
            }
            Operation::GetControls => encode(vehicle()?.get_controls()),
            Operation::GetState => encode(vehicle()?.get_state()),
            Operation::EnableApiControl(enabled) => {
                vehicle()?.enable_api_control(enabled);
                Ok(Value::Null)
            }
            Operation::IsApiControlEnabled => Ok(json!(vehicle()?.is_api_control_enabled())),
            Operation::ArmDisarm(arm) => Ok(json!(vehicle()?.arm_disarm(arm))),
            Operation::ArmState => encode(vehicle()?.arm_state()),
            Operation::GetHomeGeoPoint => encode(vehicle()?.get_home_geo_point()),
            Operation::Reset => {
                vehicle()?.reset();
                Ok(Value::Null)
            }
            Operation::GetSensorReading(sensor) => encode(vehicle()?.get_sensor_reading(&sensor)?),
            Operation::GetSensorReadings => encode(&*vehicle()?.sensor_readings()),
            Operation::ReportState => {
                let mut reporter = StateReporter::new();
                vehicle()?.report_state(&mut reporter);
                Ok(Value::String(reporter.into_string()))
            }
        }
    }
}

/// Controls for `vehicle`. A missing `vehicle_type` tag defaults to the
/// target's own type.
fn decode_controls(vehicle: &dyn VehicleApi, mut params: Value) -> Result<VehicleControls> {
    if let Value::Object(map) = &mut params {
        map.entry("vehicle_type")
            .or_insert_with(|| Value::String(vehicle.vehicle_type().as_str().to_string()));
    }
    serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_params("set_controls", e.to_string()))
}

fn encode<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn malformed(id: u64, e: serde_json::Error) -> RpcResponse {
    RpcResponse::error(id, &RpcError::malformed(e.to_string()))
}
