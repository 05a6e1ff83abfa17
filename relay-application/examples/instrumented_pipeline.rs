use async_trait::async_trait;
use relay_application::{
    AppError, Command, CommandBus, CommandHandler, CommandHandlerRegistry, DispatchContext,
    InMemoryCommandBus, InstrumentedCommandBus,
};
use relay_core::telemetry::InMemoryPerformanceMonitor;
use std::sync::Arc;

#[derive(Debug)]
struct CreateUser {
    name: String,
}

impl Command for CreateUser {
    const NAME: &'static str = "CreateUser";
    type Output = u64;
}

struct CreateUserHandler;

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(&self, _ctx: &DispatchContext, cmd: CreateUser) -> Result<u64, AppError> {
        if cmd.name.is_empty() {
            return Err(AppError::Rejected("user name must not be empty".into()));
        }
        println!("CreateUser: name={}", cmd.name);
        Ok(7)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(CommandHandlerRegistry::new());
    registry.register::<CreateUser, _>(Arc::new(CreateUserHandler))?;

    let monitor = Arc::new(InMemoryPerformanceMonitor::new(true));
    let bus = InstrumentedCommandBus::new(InMemoryCommandBus::new(registry), monitor.clone());

    let ctx = DispatchContext::default();
    let id = bus
        .dispatch(
            &ctx,
            CreateUser {
                name: "Alice".into(),
            },
        )
        .await?;
    println!("created user id={id}");

    // 业务失败：处理器的失败文本原样透出
    if let Err(err) = bus.dispatch(&ctx, CreateUser { name: String::new() }).await {
        eprintln!("rejected as expected: {err}");
    }

    let stats = bus.stats();
    println!(
        "dispatched={} succeeded={} failed={} success_rate={:.1}%",
        stats.total, stats.succeeded, stats.failed, stats.success_rate
    );
    if let Some(window) = monitor.timing("CreateUser") {
        println!(
            "CreateUser timings: samples={} avg={:.3}ms",
            window.samples,
            window.average_ms()
        );
    }

    Ok(())
}
