use tokio_util::sync::CancellationToken;

/// 调度上下文（Dispatch Context）
///
/// 承载一次命令调度所需的横切信息：
/// - 取消信号（`cancellation`）：处理器可在长操作中观察；
///   调度器只负责传递，不代为轮询；
/// - 关联标识（`correlation_id`）：用于日志与链路追踪的串联。
///
/// `Default` 给出一个永不取消的全新令牌。
#[derive(Clone, Debug, Default)]
pub struct DispatchContext {
    /// 取消信号：处理器观察用
    pub cancellation: CancellationToken,
    /// 关联追踪标识（可选）
    pub correlation_id: Option<String>,
}

impl DispatchContext {
    /// 以给定取消令牌构建上下文
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            correlation_id: None,
        }
    }
}
