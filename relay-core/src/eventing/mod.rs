//! 事件子系统（eventing）
//!
//! 提供进程内事件发布/订阅的抽象与运行时：
//! - `Event`：事件协议（稳定名称 + 不可变载荷）；
//! - `EventSubscriber`：统一的订阅者抽象，对象处理器与闭包回调共用一条调用路径；
//! - `EventAggregator`：按类型键维护订阅表，串行有序投递，故障隔离。
//!
//! 该模块不做排队与重试，投递语义为“对当前已注册订阅者至多一次”。
//!
pub mod aggregator;
pub mod event;
pub mod subscriber;

pub use aggregator::EventAggregator;
pub use event::Event;
pub use subscriber::{EventSubscriber, FnSubscriber};
