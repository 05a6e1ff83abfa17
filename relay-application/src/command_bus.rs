use crate::{command::Command, context::DispatchContext, error::AppError};
use async_trait::async_trait;

/// 命令总线（Command Bus）
///
/// - 负责根据命令的具体类型路由到对应的处理器；
/// - 每次调度至多调用一个处理器，自身不做重试；
/// - 该 trait 带有泛型方法，通常以具体实现类型注入使用（含装饰器组合）。
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// 分发命令到对应处理器，返回命令的产出
    ///
    /// - `ctx`：调度上下文（取消信号、关联追踪）
    /// - `cmd`：具体命令实例
    async fn dispatch<C>(&self, ctx: &DispatchContext, cmd: C) -> Result<C::Output, AppError>
    where
        C: Command;
}
