/// 应用层命令（Command）
///
/// 表达“意图”的不可变值对象，只携带领域数据，不携带行为。
/// - 每个命令类型在组装期绑定至多一个处理器；
/// - 建议保持语义化的“动宾结构”命名，如 `CreateUser`、`CloseOrder`。
///
/// 关联项：
/// - `NAME`：命令的稳定名称，用于错误文本、执行日志与计时标签。
///   避免依赖 `type_name::<T>()`。
/// - `Output`：命令产出的结果类型；无结果的命令使用 `()`。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 命令产出的结果类型（无结果时为 `()`）
    type Output: Send + 'static;
}
