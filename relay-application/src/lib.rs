//! 应用层命令管线（relay-application）
//!
//! 在 `relay-core` 之上提供请求主干的应用层构件：
//! - 命令协议（`command`/`command_handler`/`command_bus`）
//! - 处理器注册表（`registry`）：以类型标识为键，组装期绑定，至多一个处理器
//! - 进程内调度器（`inmemory_command_bus`）：解析并调用处理器，
//!   把所有故障归一为 `Result`
//! - 日志装饰器（`instrumented_command_bus`）：透明委托调度，
//!   记录执行历史、聚合统计并上报耗时
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod context;
pub mod error;
pub mod inmemory_command_bus;
pub mod instrumented_command_bus;
pub mod registry;

pub use command::Command;
pub use command_bus::CommandBus;
pub use command_handler::CommandHandler;
pub use context::DispatchContext;
pub use error::AppError;
pub use inmemory_command_bus::InMemoryCommandBus;
pub use instrumented_command_bus::InstrumentedCommandBus;
pub use registry::CommandHandlerRegistry;
