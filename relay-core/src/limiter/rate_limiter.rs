//! 按键固定窗口限流 + 全局有界并发门
//!
//! - 窗口桶存放于 `DashMap`，单键的读改写在分片条目锁内完成，
//!   并发 `try_acquire` 不会在同一窗口内超发；
//! - 并发门基于 `tokio::sync::Semaphore`，许可计数原子递减，
//!   `ConcurrencySlot` 以 RAII 方式在任何退出路径归还槽位；
//! - 等待许可为协作式挂起（`await`），不占用线程忙等；
//! - `dispose` 幂等，之后的任何调用都返回 `LimiterDisposed`。
//!
use crate::error::{CoreError, CoreResult};
use crate::limiter::RateLimiterConfig;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 单键窗口桶：窗口起点 + 剩余配额
#[derive(Clone, Copy, Debug)]
struct WindowBucket {
    started_at: Instant,
    remaining: u32,
}

/// 并发槽租约
///
/// 由 `acquire_slot` 的调用方独占持有；`Drop` 时归还恰好一个槽位，
/// 覆盖成功、失败与取消的所有退出路径。
#[must_use = "dropping the slot immediately releases the permit"]
#[derive(Debug)]
pub struct ConcurrencySlot {
    _permit: OwnedSemaphorePermit,
}

/// 按键限流器
///
/// 两套独立准入机制见模块文档；所有操作在 `dispose` 之后返回
/// [`CoreError::LimiterDisposed`]。
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: DashMap<String, WindowBucket>,
    gate: Arc<Semaphore>,
    disposed: AtomicBool,
}

impl RateLimiter {
    /// 以给定配置构建限流器；非法配置返回 [`CoreError::InvalidConfig`]
    pub fn new(config: RateLimiterConfig) -> CoreResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            windows: DashMap::new(),
            gate: Arc::new(Semaphore::new(config.max_concurrent)),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// 尝试在当前窗口内消费一个配额
    ///
    /// - 无窗口或窗口已过期：开启满额新窗口并消费一个，返回 `Ok(true)`；
    /// - 窗口内仍有余量：递减并返回 `Ok(true)`；
    /// - 余量耗尽：返回 `Ok(false)`（准入拒绝，非错误），调用方不得继续执行受限操作。
    pub fn try_acquire(&self, key: &str) -> CoreResult<bool> {
        self.ensure_open()?;

        let now = Instant::now();
        let mut bucket = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| WindowBucket {
                started_at: now,
                remaining: self.config.max_requests,
            });

        if now.duration_since(bucket.started_at) >= self.config.window {
            bucket.started_at = now;
            bucket.remaining = self.config.max_requests;
        }

        if bucket.remaining > 0 {
            bucket.remaining -= 1;
            Ok(true)
        } else {
            tracing::debug!(key, "rate limit exceeded; admission denied");
            Ok(false)
        }
    }

    /// 查询当前窗口的剩余配额，不消费
    ///
    /// 未见过的键或已过期窗口报告满额 `max_requests`。
    pub fn remaining_quota(&self, key: &str) -> CoreResult<u32> {
        self.ensure_open()?;

        match self.windows.get(key) {
            Some(bucket) if bucket.started_at.elapsed() < self.config.window => {
                Ok(bucket.remaining)
            }
            _ => Ok(self.config.max_requests),
        }
    }

    /// 恢复单键满额并重新开窗
    pub fn reset(&self, key: &str) -> CoreResult<()> {
        self.ensure_open()?;
        // 移除后下次访问视为全新窗口
        self.windows.remove(key);
        Ok(())
    }

    /// 对所有已知键执行 [`reset`](Self::reset)
    pub fn reset_all(&self) -> CoreResult<()> {
        self.ensure_open()?;
        self.windows.clear();
        Ok(())
    }

    /// 当前已知键数量（窗口桶不自动回收，用于观测资源增长）
    pub fn known_keys(&self) -> usize {
        self.windows.len()
    }

    /// 当前空闲的并发槽位数
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    /// 挂起等待一个并发槽
    ///
    /// - 持有槽位数少于 `max_concurrent` 时立即返回租约；
    /// - 否则协作式挂起，直到有槽位释放或取消信号触发；
    /// - 取消先于获得槽位时返回 [`CoreError::Cancelled`]，不消耗任何槽位。
    pub async fn acquire_slot(&self, token: &CancellationToken) -> CoreResult<ConcurrencySlot> {
        self.ensure_open()?;

        if token.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        tokio::select! {
            _ = token.cancelled() => Err(CoreError::Cancelled),
            permit = self.gate.clone().acquire_owned() => match permit {
                Ok(permit) => Ok(ConcurrencySlot { _permit: permit }),
                // dispose 会关闭信号量，等待中的调用在此醒来
                Err(_) => Err(CoreError::LimiterDisposed),
            },
        }
    }

    /// 释放限流器；幂等，可安全多次调用
    ///
    /// 关闭并发门并清空窗口表；等待中的 `acquire_slot` 以
    /// [`CoreError::LimiterDisposed`] 失败返回。
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.gate.close();
            self.windows.clear();
            tracing::debug!("rate limiter disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_disposed() {
            Err(CoreError::LimiterDisposed)
        } else {
            Ok(())
        }
    }
}
