use relay_core::{RateLimiter, RateLimiterConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let limiter = Arc::new(RateLimiter::new(
        RateLimiterConfig::builder()
            .max_requests(3)
            .window(Duration::from_secs(1))
            .max_concurrent(2)
            .build(),
    )?);

    // 固定窗口配额：同键第 4 次请求在窗口内被拒绝
    for attempt in 1..=4 {
        let admitted = limiter.try_acquire("client-42")?;
        println!("attempt {attempt}: admitted={admitted}");
    }
    println!(
        "remaining quota: {}",
        limiter.remaining_quota("client-42")?
    );

    // 有界并发门：同一时刻至多 2 个工作任务持有槽位
    let mut workers = Vec::new();
    for id in 0..4 {
        let limiter = limiter.clone();
        workers.push(tokio::spawn(async move {
            let token = CancellationToken::new();
            let _slot = limiter.acquire_slot(&token).await.unwrap();
            println!("worker {id}: slot held");
            tokio::time::sleep(Duration::from_millis(100)).await;
            // 槽位随 _slot 析构自动归还
        }));
    }
    for worker in workers {
        worker.await?;
    }

    limiter.dispose();
    assert!(limiter.try_acquire("client-42").is_err());
    println!("limiter disposed");

    Ok(())
}
