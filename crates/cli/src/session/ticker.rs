//! Simulation tick thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use observability::TickMetricsAggregator;
use tracing::{debug, info, warn};
use vehicle_api::{ApiProvider, ArmState, VehicleApi, VehicleStateSnapshot};

use super::integrator::{self, StepInputs};

/// Handle to the running tick thread
pub struct Ticker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<TickMetricsAggregator>,
}

impl Ticker {
    /// Start ticking every vehicle in `provider` at `tick_rate_hz`.
    pub fn spawn(provider: Arc<ApiProvider>, tick_rate_hz: f64) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let period = Duration::from_secs_f64(1.0 / tick_rate_hz);

        let handle = thread::Builder::new()
            .name("sim-tick".to_string())
            .spawn(move || tick_loop(&provider, period, &flag))?;

        Ok(Self { running, handle })
    }

    /// Stop the thread and return its aggregated tick metrics.
    pub fn stop(self) -> TickMetricsAggregator {
        self.running.store(false, Ordering::SeqCst);
        match self.handle.join() {
            Ok(metrics) => metrics,
            Err(_) => {
                warn!("tick thread panicked");
                TickMetricsAggregator::default()
            }
        }
    }
}

fn tick_loop(
    provider: &ApiProvider,
    period: Duration,
    running: &AtomicBool,
) -> TickMetricsAggregator {
    let vehicles = provider.all();
    let mut metrics = TickMetricsAggregator::new();
    let period_ns = period.as_nanos() as u64;
    let dt = period.as_secs_f32();
    let mut tick: u64 = 0;

    info!(
        vehicles = vehicles.len(),
        period_ms = period.as_secs_f64() * 1000.0,
        "tick thread started"
    );

    let mut next = Instant::now();
    while running.load(Ordering::Relaxed) {
        let start = Instant::now();
        tick += 1;
        let timestamp = tick * period_ns;

        for vehicle in &vehicles {
            tick_vehicle(vehicle.as_ref(), dt, timestamp);
        }

        let elapsed = start.elapsed();
        let overrun = elapsed > period;
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        observability::record_tick_duration_ms(duration_ms);
        if overrun {
            observability::record_tick_overrun();
            debug!(tick, duration_ms, "tick overran its period");
        }
        metrics.update(duration_ms, overrun);

        next += period;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // fell behind; restart the schedule instead of bursting
            next = now;
        }
    }

    info!(ticks = tick, "tick thread stopped");
    metrics
}

/// One vehicle tick: integrate, publish the snapshot, update the sensors.
pub fn tick_vehicle(vehicle: &dyn VehicleApi, dt: f32, timestamp: u64) {
    let (generation, next) = advance(vehicle, dt, timestamp);
    publish(vehicle, generation, next);
    vehicle.update();
}

/// Next snapshot, tagged with the generation it was computed from
fn advance(vehicle: &dyn VehicleApi, dt: f32, timestamp: u64) -> (u64, VehicleStateSnapshot) {
    // generation 先于 state 读取，reset 后算出的旧快照会被丢弃
    let generation = vehicle.generation();
    let inputs = StepInputs {
        api_control: vehicle.is_api_control_enabled(),
        armed: vehicle.arm_state() == ArmState::Armed,
        home: vehicle.get_home_geo_point(),
    };
    let next = integrator::step(
        &vehicle.get_state(),
        &vehicle.get_controls(),
        inputs,
        dt,
        timestamp,
    );
    (generation, next)
}

fn publish(vehicle: &dyn VehicleApi, generation: u64, next: VehicleStateSnapshot) -> bool {
    match vehicle.update_state_since(generation, next) {
        Ok(published) => published,
        Err(e) => {
            warn!(vehicle = %vehicle.name(), error = %e, "snapshot not published");
            false
        }
    }
}
