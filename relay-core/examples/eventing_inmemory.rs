use async_trait::async_trait;
use relay_core::eventing::{Event, EventAggregator, EventSubscriber};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct UserCreated {
    name: String,
}

impl Event for UserCreated {
    const NAME: &'static str = "UserCreated";
}

struct WelcomeMailer;

#[async_trait]
impl EventSubscriber<UserCreated> for WelcomeMailer {
    async fn on_event(&self, event: &UserCreated) -> anyhow::Result<()> {
        println!("mailer: welcome, {}!", event.name);
        Ok(())
    }
}

struct AuditLog;

#[async_trait]
impl EventSubscriber<UserCreated> for AuditLog {
    async fn on_event(&self, event: &UserCreated) -> anyhow::Result<()> {
        println!("audit: user created: {}", event.name);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let aggregator = EventAggregator::new();

    let mailer = Arc::new(WelcomeMailer);
    let audit = Arc::new(AuditLog);
    aggregator.subscribe::<UserCreated, _>(&mailer);
    aggregator.subscribe::<UserCreated, _>(&audit);

    // 闭包订阅者与对象订阅者走同一条调用路径
    let metrics = aggregator.subscribe_fn(|event: UserCreated| async move {
        println!("metrics: +1 signup ({})", event.name);
        anyhow::Ok(())
    });

    aggregator
        .publish(UserCreated {
            name: "Alice".into(),
        })
        .await;

    // 退订后不再收到事件
    aggregator.unsubscribe::<UserCreated, _>(&metrics);
    aggregator
        .publish(UserCreated { name: "Bob".into() })
        .await;
}
