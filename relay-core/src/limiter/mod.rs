//! 限流器（limiter）
//!
//! 同一组件上的两套独立准入机制：
//! - 按键固定窗口配额：`try_acquire` 以布尔值表达准入/拒绝，调用方可廉价分支；
//! - 全局有界并发门：`acquire_slot` 挂起等待许可，返回 RAII 租约，
//!   任何退出路径（成功/失败/取消）都会归还恰好一个槽位。
//!
//! 按键窗口桶惰性创建且不自动回收，资源增长可通过 `known_keys` 观测。
//!
pub mod config;
pub mod rate_limiter;

pub use config::RateLimiterConfig;
pub use rate_limiter::{ConcurrencySlot, RateLimiter};
