use relay_core::CoreError;

/// 应用层统一错误类型
///
/// 故障分级（由近及远恢复）：
/// - `HandlerNotFound`：配置故障，表明组装期缺少绑定，绝不重试；
/// - `ExecutionFailed`：处理器的非预期故障，在调度边界捕获并归一；
/// - `Rejected`：处理器主动表达的业务失败，文本原样传递、绝不改写；
/// - `Core`：来自核心层（限流/取消/已释放）的错误，供处理器用 `?` 上抛。
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("No handler registered for {0}")]
    HandlerNotFound(&'static str),

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("{0}")]
    Rejected(String),

    #[error("handler already registered: command={command}")]
    AlreadyRegistered { command: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
