//! Session statistics.

use std::time::Duration;

use observability::MetricsSummary;
use rpc_server::ServerMetricsSnapshot;
use serde::Serialize;

/// Statistics from a serve session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Wall-clock duration of the session
    pub duration: Duration,

    /// Vehicles registered
    pub vehicles: usize,

    /// Vehicles skipped at build time
    pub failed_vehicles: usize,

    pub server: ServerMetricsSnapshot,

    pub ticks: MetricsSummary,
}

/// Flattened form for JSON logs
#[derive(Serialize)]
struct StatsRecord {
    duration_secs: f64,
    vehicles: usize,
    failed_vehicles: usize,
    connections: u64,
    responses_ok: u64,
    responses_error: u64,
    ticks: u64,
    tick_overruns: u64,
    ticks_per_sec: f64,
}

impl SessionStats {
    /// Achieved tick rate
    pub fn ticks_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.ticks.total_ticks as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&StatsRecord {
            duration_secs: self.duration.as_secs_f64(),
            vehicles: self.vehicles,
            failed_vehicles: self.failed_vehicles,
            connections: self.server.total_connections,
            responses_ok: self.server.ok_count,
            responses_error: self.server.error_count,
            ticks: self.ticks.total_ticks,
            tick_overruns: self.ticks.overruns,
            ticks_per_sec: self.ticks_per_sec(),
        })
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Session Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Vehicles: {}", self.vehicles);
        println!("   └─ Skipped vehicles: {}", self.failed_vehicles);

        println!("\n🔌 RPC Server");
        println!("   ├─ Connections: {}", self.server.total_connections);
        println!("   ├─ OK responses: {}", self.server.ok_count);
        println!("   ├─ Error responses: {}", self.server.error_count);
        println!("   └─ Oversized requests: {}", self.server.oversized_count);

        println!("\n⏱️  Tick Thread");
        println!("   ├─ Ticks: {}", self.ticks.total_ticks);
        println!("   ├─ Rate: {:.2} Hz", self.ticks_per_sec());
        println!(
            "   ├─ Overruns: {} ({:.2}%)",
            self.ticks.overruns, self.ticks.overrun_rate
        );
        println!("   └─ Duration (ms): {}", self.ticks.tick_duration_ms);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_per_sec() {
        let mut stats = SessionStats {
            duration: Duration::from_secs(2),
            ..SessionStats::default()
        };
        stats.ticks.total_ticks = 200;
        assert!((stats.ticks_per_sec() - 100.0).abs() < 1e-9);

        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        assert_eq!(json["ticks"], 200);
    }

    #[test]
    fn test_zero_duration() {
        assert_eq!(SessionStats::default().ticks_per_sec(), 0.0);
    }
}
