use crate::{command::Command, context::DispatchContext, error::AppError};
use async_trait::async_trait;

/// 命令处理器
///
/// - 以 `Err(AppError::Rejected(..))` 表达业务规则层面的预期失败，
///   调度器会原样传递失败文本；
/// - 可通过 `ctx.cancellation` 观察取消请求；调度器本身不做轮询；
/// - 重试策略（若需要）由处理器自行负责。
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &DispatchContext, cmd: C) -> Result<C::Output, AppError>;
}
