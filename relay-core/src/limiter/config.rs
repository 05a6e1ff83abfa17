//! 限流器配置
//!
use crate::error::{CoreError, CoreResult};
use bon::Builder;
use std::time::Duration;

/// 限流器配置
///
/// 三个参数彼此独立：窗口配额约束单键的请求频率，
/// 并发上限约束全局同时在途的操作数。
#[derive(Builder, Clone, Copy, Debug)]
pub struct RateLimiterConfig {
    /// 单键单窗口内允许的最大请求数
    #[builder(default = 100)]
    pub max_requests: u32,
    /// 固定窗口长度
    #[builder(default = Duration::from_secs(60))]
    pub window: Duration,
    /// 全局并发槽位数
    #[builder(default = 10)]
    pub max_concurrent: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RateLimiterConfig {
    /// 构建期校验；零值配置会让准入语义退化为全拒绝或无界
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_requests == 0 {
            return Err(CoreError::InvalidConfig {
                reason: "max_requests must be greater than zero".to_string(),
            });
        }
        if self.window.is_zero() {
            return Err(CoreError::InvalidConfig {
                reason: "window must be greater than zero".to_string(),
            });
        }
        if self.max_concurrent == 0 {
            return Err(CoreError::InvalidConfig {
                reason: "max_concurrent must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
