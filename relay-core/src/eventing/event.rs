/// 事件（Event）
///
/// 描述“已经发生的事实”的不可变值对象，除类型与载荷外没有其它标识。
/// - 只携带数据，不携带行为；
/// - 与命令相对：事件表达过去，命令表达意图；
/// - 建议保持语义化的“名词+过去分词”命名，如 `UserCreated`、`OrderClosed`。
///
/// 关联常量：
/// - `NAME`：事件的稳定名称，用于日志与故障隔离标记。避免依赖 `type_name::<T>()`。
pub trait Event: Send + Sync + 'static {
    /// 事件的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}
