//! 进程内命令调度器（InMemoryCommandBus）
//!
//! 调度边界的故障归一：
//! - 未注册处理器 → `HandlerNotFound`（配置故障，不重试）；
//! - 处理器 panic → 在边界捕获，归一为 `ExecutionFailed`，绝不外逸；
//! - 处理器自身返回的 `Err` 原样传递（失败文本不做任何改写）。
//!
use crate::{
    command::Command, command_bus::CommandBus, context::DispatchContext, error::AppError,
    registry::CommandHandlerRegistry,
};
use async_trait::async_trait;
use futures_util::FutureExt;
use relay_core::error::panic_message;
use std::any::TypeId;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// 基于注册表的进程内 CommandBus 实现
///
/// 注册表由宿主在组装期构建并注入；调度器只做解析与调用。
pub struct InMemoryCommandBus {
    registry: Arc<CommandHandlerRegistry>,
}

impl InMemoryCommandBus {
    pub fn new(registry: Arc<CommandHandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandHandlerRegistry {
        &self.registry
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C>(&self, ctx: &DispatchContext, cmd: C) -> Result<C::Output, AppError>
    where
        C: Command,
    {
        let Some(invoke) = self.registry.resolve(TypeId::of::<C>()) else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        let outcome = AssertUnwindSafe((invoke)(Box::new(cmd), ctx))
            .catch_unwind()
            .await;

        let output = match outcome {
            // 处理器自身的失败（含 Rejected）经 `?` 原样传递
            Ok(result) => result?,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::warn!(
                    command = C::NAME,
                    reason = %reason,
                    "command handler panicked; converted to failure"
                );
                return Err(AppError::ExecutionFailed(reason));
            }
        };

        match output.downcast::<C::Output>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(AppError::TypeMismatch {
                expected: C::NAME,
                found: "unknown",
            }),
        }
    }
}
