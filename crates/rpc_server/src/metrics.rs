//! Server metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters shared by the accept loop and every connection task
#[derive(Debug, Default)]
pub struct ServerMetrics {
    /// Currently open connections
    active_connections: AtomicUsize,
    /// Connections accepted since start
    total_connections: AtomicU64,
    /// Requests answered with status ok
    ok_count: AtomicU64,
    /// Requests answered with status error
    error_count: AtomicU64,
    /// Connections closed for an over-limit line
    oversized_count: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Record an accepted connection, returns the new active count
    pub fn connection_opened(&self) -> usize {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a closed connection, returns the new active count
    pub fn connection_closed(&self) -> usize {
        self.active_connections.fetch_sub(1, Ordering::Relaxed) - 1
    }

    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    pub fn ok_count(&self) -> u64 {
        self.ok_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn inc_response(&self, ok: bool) {
        if ok {
            self.ok_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn oversized_count(&self) -> u64 {
        self.oversized_count.load(Ordering::Relaxed)
    }

    pub fn inc_oversized(&self) {
        self.oversized_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> ServerMetricsSnapshot {
        ServerMetricsSnapshot {
            active_connections: self.active_connections(),
            total_connections: self.total_connections(),
            ok_count: self.ok_count(),
            error_count: self.error_count(),
            oversized_count: self.oversized_count(),
        }
    }
}

/// Snapshot of server metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerMetricsSnapshot {
    pub active_connections: usize,
    pub total_connections: u64,
    pub ok_count: u64,
    pub error_count: u64,
    pub oversized_count: u64,
}
