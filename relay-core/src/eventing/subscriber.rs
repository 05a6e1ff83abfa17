//! 事件订阅者（EventSubscriber）
//!
//! 对象处理器与闭包回调统一收敛为同一个抽象，
//! 使聚合器的存储与调用路径保持单一形态。
//!
use crate::eventing::Event;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// 事件订阅者：处理某一类型的事件
///
/// 返回 `Err` 表示处理失败；聚合器会记录并继续投递后续订阅者，
/// 不会向发布方传播。
#[async_trait]
pub trait EventSubscriber<E>: Send + Sync
where
    E: Event,
{
    async fn on_event(&self, event: &E) -> anyhow::Result<()>;
}

/// 闭包回调适配器
///
/// 将 `Fn(E) -> Future` 形态的回调包装为 [`EventSubscriber`]，
/// 订阅/退订以返回的 `Arc` 引用作为身份标识。
pub struct FnSubscriber<E, F> {
    callback: F,
    _event: PhantomData<fn(E)>,
}

impl<E, F> FnSubscriber<E, F> {
    pub fn new(callback: F) -> Arc<Self> {
        Arc::new(Self {
            callback,
            _event: PhantomData,
        })
    }
}

#[async_trait]
impl<E, F, Fut> EventSubscriber<E> for FnSubscriber<E, F>
where
    E: Event + Clone,
    F: Fn(E) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn on_event(&self, event: &E) -> anyhow::Result<()> {
        (self.callback)(event.clone()).await
    }
}
