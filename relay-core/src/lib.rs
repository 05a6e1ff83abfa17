//! 请求主干核心库（relay-core）
//!
//! 提供应用层请求主干的叶子构件，不依赖任何上层语义：
//! - 事件聚合器（`eventing`）：按类型键注册订阅者的发布/订阅系统
//! - 限流器（`limiter`）：按键固定窗口配额 + 全局有界并发门
//! - 性能监控协议（`telemetry`）：对接宿主的计时采集器
//! - 统一错误类型（`error`）
//!
//! 本 crate 仅定义协议与进程内运行时，不绑定网络传输与持久化，
//! 以便在不同宿主（服务端、工具链、测试环境）中直接复用。
//!
//! 典型用法：
//! 1. 以 `RateLimiterConfig` 构建 `RateLimiter`，在入口处做准入控制；
//! 2. 用 `EventAggregator` 解耦模块间通知，订阅者按插入顺序串行收到事件；
//! 3. 将宿主的监控对接到 `PerformanceMonitor`，供上层装饰器上报耗时。
//!
pub mod error;
pub mod eventing;
pub mod limiter;
pub mod telemetry;

pub use error::{CoreError, CoreResult};
pub use eventing::EventAggregator;
pub use limiter::{ConcurrencySlot, RateLimiter, RateLimiterConfig};
pub use telemetry::PerformanceMonitor;
