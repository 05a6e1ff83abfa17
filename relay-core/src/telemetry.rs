//! 性能监控协议（telemetry）
//!
//! 定义宿主监控的最小对接面：核心只写入命名计时样本并读取
//! “是否开启详细剖析”的开关，绝不读回计时数据。
//!
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// 性能监控：接收命名计时样本的只写汇（write-only sink）
pub trait PerformanceMonitor: Send + Sync {
    /// 是否开启详细剖析；关闭时上层可完全跳过计时
    fn detailed_profiling_enabled(&self) -> bool;

    /// 记录一条命名计时样本（毫秒）
    fn record_timing(&self, label: &str, duration_ms: f64);
}

/// 单标签的计时聚合
#[derive(Clone, Copy, Debug)]
pub struct TimingWindow {
    pub samples: u64,
    pub total_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl TimingWindow {
    pub fn average_ms(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_ms / self.samples as f64
        }
    }
}

/// 内存版性能监控实现
///
/// 按标签聚合样本数/总耗时/最小/最大，适用于测试环境、示例与本地开发。
#[derive(Default)]
pub struct InMemoryPerformanceMonitor {
    profiling: AtomicBool,
    timings: DashMap<String, TimingWindow>,
}

impl InMemoryPerformanceMonitor {
    pub fn new(profiling: bool) -> Self {
        Self {
            profiling: AtomicBool::new(profiling),
            timings: DashMap::new(),
        }
    }

    pub fn set_profiling(&self, enabled: bool) {
        self.profiling.store(enabled, Ordering::SeqCst);
    }

    /// 某标签的聚合视图；从未记录过的标签返回 `None`
    pub fn timing(&self, label: &str) -> Option<TimingWindow> {
        self.timings.get(label).map(|w| *w)
    }
}

impl PerformanceMonitor for InMemoryPerformanceMonitor {
    fn detailed_profiling_enabled(&self) -> bool {
        self.profiling.load(Ordering::SeqCst)
    }

    fn record_timing(&self, label: &str, duration_ms: f64) {
        self.timings
            .entry(label.to_string())
            .and_modify(|w| {
                w.samples += 1;
                w.total_ms += duration_ms;
                w.min_ms = w.min_ms.min(duration_ms);
                w.max_ms = w.max_ms.max(duration_ms);
            })
            .or_insert(TimingWindow {
                samples: 1,
                total_ms: duration_ms,
                min_ms: duration_ms,
                max_ms: duration_ms,
            });
    }
}
