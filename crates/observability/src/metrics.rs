//! Vehicle Bridge 指标收集模块
//!
//! RPC 请求、路由错误、传感器故障与 tick 耗时的指标记录与统计。

use metrics::{counter, gauge, histogram};

/// 记录一次 RPC 请求
///
/// `method` 只接受固定的方法名集合 (未知方法记为 "unknown")，
/// 客户端原始字符串不能作为 label。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_rpc_request;
///
/// let response = router.handle(request);
/// record_rpc_request(method_label(&request.method), response.is_ok(), elapsed_ms);
/// ```
pub fn record_rpc_request(method: &'static str, success: bool, latency_ms: f64) {
    let status = if success { "ok" } else { "error" };
    counter!(
        "vehicle_bridge_rpc_requests_total",
        "method" => method,
        "status" => status
    )
    .increment(1);

    histogram!("vehicle_bridge_rpc_latency_ms", "method" => method).record(latency_ms);
}

/// 记录路由失败 (未注册的车辆名)，车辆名只写日志
pub fn record_routing_error() {
    counter!("vehicle_bridge_routing_errors_total").increment(1);
}

/// 记录传感器故障
pub fn record_sensor_fault(vehicle: &str, sensor: &str) {
    counter!(
        "vehicle_bridge_sensor_faults_total",
        "vehicle" => vehicle.to_string(),
        "sensor" => sensor.to_string()
    )
    .increment(1);
}

/// 记录一次 tick 的耗时
pub fn record_tick_duration_ms(duration_ms: f64) {
    counter!("vehicle_bridge_ticks_total").increment(1);
    histogram!("vehicle_bridge_tick_duration_ms").record(duration_ms);
}

/// 记录 tick 超时 (耗时超过 tick 周期)
pub fn record_tick_overrun() {
    counter!("vehicle_bridge_tick_overruns_total").increment(1);
}

/// 记录当前活动连接数
pub fn record_active_connections(count: usize) {
    gauge!("vehicle_bridge_active_connections").set(count as f64);
}

/// 记录已注册车辆数
pub fn record_vehicle_count(count: usize) {
    gauge!("vehicle_bridge_vehicles").set(count as f64);
}

/// Tick 指标聚合器
///
/// 在内存中聚合 tick 线程的指标，便于会话结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct TickMetricsAggregator {
    /// 总 tick 数
    pub total_ticks: u64,

    /// 超时 tick 数
    pub overruns: u64,

    /// tick 耗时统计 (毫秒)
    pub duration_stats: RunningStats,
}

impl TickMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, duration_ms: f64, overrun: bool) {
        self.total_ticks += 1;
        if overrun {
            self.overruns += 1;
        }
        self.duration_stats.push(duration_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_ticks: self.total_ticks,
            overruns: self.overruns,
            overrun_rate: if self.total_ticks > 0 {
                self.overruns as f64 / self.total_ticks as f64 * 100.0
            } else {
                0.0
            },
            tick_duration_ms: StatsSummary::from(&self.duration_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_ticks: u64,
    pub overruns: u64,
    pub overrun_rate: f64,
    pub tick_duration_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Tick Metrics Summary ===")?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(
            f,
            "Overruns: {} ({:.2}%)",
            self.overruns, self.overrun_rate
        )?;
        writeln!(f, "Tick duration (ms): {}", self.tick_duration_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
