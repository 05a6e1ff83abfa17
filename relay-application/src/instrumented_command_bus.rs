//! 日志装饰器（InstrumentedCommandBus）
//!
//! 透明包装任意 `CommandBus`：
//! - 结果原样返回（装饰器透明性：内层返回什么，外层就返回什么；
//!   内层外逸的 panic 在此不捕获，故障归一是调度器（内层）的职责）；
//! - 每次调度追加一条执行记录（成功与失败都记），
//!   历史环形有界，满员后最旧先逐出；
//! - 剖析开启时，每次调度恰好上报一次 `(命令名, 耗时毫秒)`；
//! - 统计视图每次从执行日志现算，不单独持久化。
//!
use crate::{
    command::Command, command_bus::CommandBus, context::DispatchContext, error::AppError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relay_core::PerformanceMonitor;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// 执行历史的默认上限
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// 单次调度的执行记录
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionRecord {
    /// 命令类型名（`Command::NAME`）
    pub command: &'static str,
    /// 调度开始时刻
    pub started_at: DateTime<Utc>,
    /// 执行耗时
    pub duration: Duration,
    /// 是否成功
    pub succeeded: bool,
    /// 失败时的错误文本
    pub error: Option<String>,
}

/// 单命令类型的聚合统计
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct CommandTypeStats {
    pub executions: usize,
    pub succeeded: usize,
    pub avg_duration_ms: f64,
}

/// 执行日志的聚合视图（每次调用从日志现算）
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 成功率百分比；日志为空时为 0，避免除零
    pub success_rate: f64,
    pub per_command: BTreeMap<&'static str, CommandTypeStats>,
}

/// 带执行日志与耗时上报的命令总线装饰器
pub struct InstrumentedCommandBus<B> {
    inner: B,
    monitor: Arc<dyn PerformanceMonitor>,
    history: Mutex<VecDeque<ExecutionRecord>>,
    max_history: usize,
}

impl<B> InstrumentedCommandBus<B>
where
    B: CommandBus,
{
    pub fn new(inner: B, monitor: Arc<dyn PerformanceMonitor>) -> Self {
        Self::with_max_history(inner, monitor, DEFAULT_MAX_HISTORY)
    }

    /// 指定执行历史上限；`max_history` 为 0 时不保留任何记录
    pub fn with_max_history(
        inner: B,
        monitor: Arc<dyn PerformanceMonitor>,
        max_history: usize,
    ) -> Self {
        Self {
            inner,
            monitor,
            history: Mutex::new(VecDeque::with_capacity(max_history)),
            max_history,
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// 执行历史的按时间顺序克隆（最旧在前），不改动日志本身
    pub fn execution_history(&self) -> Vec<ExecutionRecord> {
        self.lock_history().iter().cloned().collect()
    }

    /// 清空执行历史；对在途调度无影响
    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    /// 从执行日志现算聚合统计
    pub fn stats(&self) -> ExecutionStats {
        let history = self.lock_history();

        let total = history.len();
        let succeeded = history.iter().filter(|r| r.succeeded).count();
        let failed = total - succeeded;
        let success_rate = if total == 0 {
            0.0
        } else {
            succeeded as f64 / total as f64 * 100.0
        };

        let mut totals: BTreeMap<&'static str, (CommandTypeStats, Duration)> = BTreeMap::new();
        for record in history.iter() {
            let entry = totals.entry(record.command).or_default();
            entry.0.executions += 1;
            if record.succeeded {
                entry.0.succeeded += 1;
            }
            entry.1 += record.duration;
        }

        let per_command = totals
            .into_iter()
            .map(|(command, (mut stats, total_duration))| {
                stats.avg_duration_ms =
                    total_duration.as_secs_f64() * 1000.0 / stats.executions as f64;
                (command, stats)
            })
            .collect();

        ExecutionStats {
            total,
            succeeded,
            failed,
            success_rate,
            per_command,
        }
    }

    fn record(&self, entry: ExecutionRecord) {
        if self.max_history == 0 {
            return;
        }

        let mut history = self.lock_history();
        if history.len() == self.max_history {
            history.pop_front();
        }
        history.push_back(entry);
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, VecDeque<ExecutionRecord>> {
        // 锁仅保护内部记录，从不跨处理器代码持有；中毒时取回内部值继续
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<B> CommandBus for InstrumentedCommandBus<B>
where
    B: CommandBus,
{
    async fn dispatch<C>(&self, ctx: &DispatchContext, cmd: C) -> Result<C::Output, AppError>
    where
        C: Command,
    {
        let profiling = self.monitor.detailed_profiling_enabled();
        let started_at = Utc::now();
        let start = Instant::now();

        let result = self.inner.dispatch(ctx, cmd).await;

        let duration = start.elapsed();
        if profiling {
            self.monitor
                .record_timing(C::NAME, duration.as_secs_f64() * 1000.0);
        }

        self.record(ExecutionRecord {
            command: C::NAME,
            started_at,
            duration,
            succeeded: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_handler::CommandHandler;
    use crate::inmemory_command_bus::InMemoryCommandBus;
    use crate::registry::CommandHandlerRegistry;
    use relay_core::telemetry::InMemoryPerformanceMonitor;

    #[derive(Debug)]
    struct Step {
        seq: usize,
        fail: bool,
    }
    impl Command for Step {
        const NAME: &'static str = "Step";
        type Output = usize;
    }

    struct StepHandler;

    #[async_trait]
    impl CommandHandler<Step> for StepHandler {
        async fn handle(&self, _ctx: &DispatchContext, cmd: Step) -> Result<usize, AppError> {
            if cmd.fail {
                return Err(AppError::Rejected(format!("step {} rejected", cmd.seq)));
            }
            Ok(cmd.seq)
        }
    }

    #[derive(Debug)]
    struct Other;
    impl Command for Other {
        const NAME: &'static str = "Other";
        type Output = ();
    }

    struct OtherHandler;

    #[async_trait]
    impl CommandHandler<Other> for OtherHandler {
        async fn handle(&self, _ctx: &DispatchContext, _cmd: Other) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn inner_bus() -> InMemoryCommandBus {
        let registry = CommandHandlerRegistry::new();
        registry.register::<Step, _>(Arc::new(StepHandler)).unwrap();
        registry
            .register::<Other, _>(Arc::new(OtherHandler))
            .unwrap();
        InMemoryCommandBus::new(Arc::new(registry))
    }

    fn instrumented(
        profiling: bool,
        max_history: usize,
    ) -> (
        InstrumentedCommandBus<InMemoryCommandBus>,
        Arc<InMemoryPerformanceMonitor>,
    ) {
        let monitor = Arc::new(InMemoryPerformanceMonitor::new(profiling));
        let bus = InstrumentedCommandBus::with_max_history(inner_bus(), monitor.clone(), max_history);
        (bus, monitor)
    }

    #[tokio::test]
    async fn decorator_is_transparent_for_success_and_failure() {
        let (bus, _monitor) = instrumented(false, 10);
        let ctx = DispatchContext::default();

        let out = bus.dispatch(&ctx, Step { seq: 7, fail: false }).await;
        assert_eq!(out.unwrap(), 7);

        let err = bus
            .dispatch(&ctx, Step { seq: 8, fail: true })
            .await
            .unwrap_err();
        // 内层失败文本原样透出
        assert_eq!(err.to_string(), "step 8 rejected");
    }

    #[tokio::test]
    async fn every_dispatch_appends_one_record() {
        let (bus, _monitor) = instrumented(false, 10);
        let ctx = DispatchContext::default();

        let _ = bus.dispatch(&ctx, Step { seq: 1, fail: false }).await;
        let _ = bus.dispatch(&ctx, Step { seq: 2, fail: true }).await;

        let history = bus.execution_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].command, "Step");
        assert!(history[0].succeeded);
        assert!(history[0].error.is_none());
        assert!(!history[1].succeeded);
        assert_eq!(history[1].error.as_deref(), Some("step 2 rejected"));
    }

    #[tokio::test]
    async fn history_evicts_oldest_first() {
        let (bus, _monitor) = instrumented(false, 5);
        let ctx = DispatchContext::default();

        for seq in 1..=10 {
            let _ = bus.dispatch(&ctx, Step { seq, fail: true }).await;
        }

        let history = bus.execution_history();
        assert_eq!(history.len(), 5);
        // 仅保留第 6..=10 次，按时间顺序最旧在前
        for (i, record) in history.iter().enumerate() {
            assert_eq!(record.command, "Step");
            assert_eq!(
                record.error.as_deref(),
                Some(format!("step {} rejected", i + 6).as_str())
            );
        }

        bus.clear_history();
        assert!(bus.execution_history().is_empty());
        assert_eq!(bus.stats().total, 0);
    }

    #[tokio::test]
    async fn stats_derive_success_rate_and_per_command_breakdown() {
        let (bus, _monitor) = instrumented(false, 10);
        let ctx = DispatchContext::default();

        let _ = bus.dispatch(&ctx, Step { seq: 1, fail: false }).await;
        let _ = bus.dispatch(&ctx, Step { seq: 2, fail: false }).await;
        let _ = bus.dispatch(&ctx, Step { seq: 3, fail: true }).await;
        let _ = bus.dispatch(&ctx, Other).await;

        let stats = bus.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 1);
        assert!((stats.success_rate - 75.0).abs() < 0.1);

        let step = &stats.per_command["Step"];
        assert_eq!(step.executions, 3);
        assert_eq!(step.succeeded, 2);
        assert!(step.avg_duration_ms >= 0.0);
        assert_eq!(stats.per_command["Other"].executions, 1);
    }

    #[tokio::test]
    async fn two_successes_one_failure_is_two_thirds() {
        let (bus, _monitor) = instrumented(false, 10);
        let ctx = DispatchContext::default();

        let _ = bus.dispatch(&ctx, Step { seq: 1, fail: false }).await;
        let _ = bus.dispatch(&ctx, Step { seq: 2, fail: false }).await;
        let _ = bus.dispatch(&ctx, Step { seq: 3, fail: true }).await;

        let stats = bus.stats();
        assert!((stats.success_rate - 66.666).abs() < 0.1);
    }

    #[tokio::test]
    async fn empty_history_reports_zero_rate() {
        let (bus, _monitor) = instrumented(false, 10);
        let stats = bus.stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.per_command.is_empty());
    }

    #[tokio::test]
    async fn timing_forwarded_once_per_dispatch_when_profiling() {
        let (bus, monitor) = instrumented(true, 10);
        let ctx = DispatchContext::default();

        let _ = bus.dispatch(&ctx, Step { seq: 1, fail: false }).await;
        let _ = bus.dispatch(&ctx, Step { seq: 2, fail: true }).await;

        // 成功与失败都各上报一次
        assert_eq!(monitor.timing("Step").unwrap().samples, 2);
    }

    #[tokio::test]
    async fn no_timing_when_profiling_disabled() {
        let (bus, monitor) = instrumented(false, 10);
        let ctx = DispatchContext::default();

        let _ = bus.dispatch(&ctx, Step { seq: 1, fail: false }).await;

        assert!(monitor.timing("Step").is_none());
        // 剖析关闭不影响执行日志
        assert_eq!(bus.execution_history().len(), 1);
    }

    #[tokio::test]
    async fn records_are_serializable() {
        let (bus, _monitor) = instrumented(false, 10);
        let ctx = DispatchContext::default();

        let _ = bus.dispatch(&ctx, Step { seq: 1, fail: false }).await;

        let json = serde_json::to_string(&bus.execution_history()).unwrap();
        assert!(json.contains("\"command\":\"Step\""));
    }
}
