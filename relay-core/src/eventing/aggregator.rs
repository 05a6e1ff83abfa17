//! 事件聚合器（EventAggregator）
//!
//! 基于 `DashMap<TypeId, Vec<Registration>>` 的进程内发布/订阅注册表：
//! - `subscribe`/`unsubscribe`：以 `Arc` 指针身份幂等注册与退订；
//! - `publish`：对发布时刻的订阅快照按插入顺序逐个 `await` 投递；
//! - `publish_detached`：派生分离任务触发投递，调用方不等待完成；
//! - 故障隔离：单个订阅者的错误或 panic 仅记录日志，不阻断其余订阅者。
//!
//! 投递期间绝不持有内部锁，订阅者代码中的阻塞/订阅操作不会与聚合器死锁。
//!
use crate::error::panic_message;
use crate::eventing::{Event, EventSubscriber, FnSubscriber};
use dashmap::DashMap;
use futures_util::FutureExt;
use std::any::{Any, TypeId};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

type SubscriberFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

type SubscriberFn =
    Arc<dyn for<'a> Fn(&'a (dyn Any + Send + Sync)) -> SubscriberFuture<'a> + Send + Sync>;

/// 单条订阅：`key` 为订阅者 `Arc` 的数据指针，用作幂等与退订的身份标识
struct Registration {
    key: usize,
    invoke: SubscriberFn,
}

/// 类型键控的发布/订阅聚合器
///
/// `Clone` 共享同一份订阅表，可安全跨任务传递。
#[derive(Clone, Default)]
pub struct EventAggregator {
    subscribers: Arc<DashMap<TypeId, Vec<Registration>>>,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册订阅者
    ///
    /// 同一 `Arc` 引用对同一事件类型的重复注册为无操作（幂等）；
    /// 投递顺序为插入顺序。
    pub fn subscribe<E, S>(&self, subscriber: &Arc<S>)
    where
        E: Event,
        S: EventSubscriber<E> + Send + Sync + 'static,
    {
        let key = subscriber_key(subscriber);
        let mut entry = self.subscribers.entry(TypeId::of::<E>()).or_default();

        if entry.iter().any(|r| r.key == key) {
            return;
        }

        let invoke: SubscriberFn = {
            let subscriber = subscriber.clone();

            Arc::new(move |any_event| {
                let subscriber = subscriber.clone();

                Box::pin(async move {
                    // 正常情况下这里的 downcast 永远不会失败（键与闭包同一泛型 E）
                    match any_event.downcast_ref::<E>() {
                        Some(event) => subscriber.on_event(event).await,
                        None => Err(anyhow::anyhow!("event payload type mismatch")),
                    }
                })
            })
        };

        entry.push(Registration { key, invoke });
    }

    /// 以闭包注册订阅者，返回可用于退订的 `Arc` 引用
    pub fn subscribe_fn<E, F, Fut>(&self, callback: F) -> Arc<FnSubscriber<E, F>>
    where
        E: Event + Clone,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let subscriber = FnSubscriber::new(callback);
        self.subscribe::<E, _>(&subscriber);
        subscriber
    }

    /// 退订；未注册的引用为无操作
    pub fn unsubscribe<E, S>(&self, subscriber: &Arc<S>)
    where
        E: Event,
        S: EventSubscriber<E> + Send + Sync + 'static,
    {
        let key = subscriber_key(subscriber);

        if let Some(mut entry) = self.subscribers.get_mut(&TypeId::of::<E>()) {
            entry.retain(|r| r.key != key);
        }
    }

    /// 当前某事件类型的订阅数（组装期断言用）
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscribers
            .get(&TypeId::of::<E>())
            .map(|regs| regs.len())
            .unwrap_or(0)
    }

    /// 发布事件并等待全部订阅者处理完成
    ///
    /// - 在任何调用发生前对订阅表做快照：投递期间的订阅/退订不影响本次发布；
    /// - 按订阅顺序逐个 `await`，对单次发布保证全序；
    /// - 单个订阅者返回 `Err` 或 panic 只记 `warn` 日志，其余订阅者照常执行。
    pub async fn publish<E>(&self, event: E)
    where
        E: Event + Clone,
    {
        let snapshot: Vec<SubscriberFn> = self
            .subscribers
            .get(&TypeId::of::<E>())
            .map(|regs| regs.iter().map(|r| r.invoke.clone()).collect())
            .unwrap_or_default();

        for (index, invoke) in snapshot.into_iter().enumerate() {
            let outcome = AssertUnwindSafe((invoke)(&event)).catch_unwind().await;

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        event = E::NAME,
                        subscriber = index,
                        reason = %err,
                        "event subscriber failed; continuing with remaining subscribers"
                    );
                }
                Err(payload) => {
                    tracing::warn!(
                        event = E::NAME,
                        subscriber = index,
                        reason = %panic_message(payload.as_ref()),
                        "event subscriber panicked; continuing with remaining subscribers"
                    );
                }
            }
        }
    }

    /// 触发式发布（fire-and-forget）
    ///
    /// 派生分离任务执行 [`publish`](Self::publish)，调用方对完成与顺序均无可观测保证；
    /// 订阅者故障仅能通过隔离日志观测。运行时关闭时未完成的投递可能被丢弃，
    /// 不提供 flush-on-exit 语义。
    pub fn publish_detached<E>(&self, event: E)
    where
        E: Event + Clone,
    {
        let aggregator = self.clone();

        tokio::spawn(async move {
            aggregator.publish(event).await;
        });
    }
}

fn subscriber_key<S>(subscriber: &Arc<S>) -> usize {
    Arc::as_ptr(subscriber) as *const () as usize
}
