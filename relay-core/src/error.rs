//! 核心层统一错误定义
//!
//! 聚焦限流与并发槽的最小必要集合，
//! 便于在上层（应用层/宿主）统一转换与分支处理。
//! 事件订阅者的故障被聚合器就地隔离记录，不在此建模。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CoreError {
    // --- 限流器 ---
    /// 限流器已释放：任何后续调用均为致命错误，绝不静默忽略
    #[error("rate limiter disposed")]
    LimiterDisposed,
    /// 并发槽等待期间取消信号触发；与配额拒绝（布尔 false）严格区分
    #[error("slot acquisition cancelled")]
    Cancelled,
    /// 配置非法（如零配额/零窗口/零并发）
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

/// 统一 Result 类型别名
pub type CoreResult<T> = Result<T, CoreError>;

/// 从 `catch_unwind` 捕获的 panic 载荷中提取可读原因。
///
/// panic 载荷约定为 `&str` 或 `String`（`panic!` 宏的两种形态），
/// 其余类型统一归并为 "unknown panic"。
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
