use std::time::Duration;

use tokio::time::sleep;

use rally_core::{WaitGroup, WaitGroupFactory, storage_from_dsn};

/// worker：一定時間後に done() を打つだけのデモタスク
async fn run_worker(wait_group: WaitGroup, name: &'static str, delay: Duration) {
    sleep(delay).await;
    match wait_group.done().await {
        Ok(()) => println!("worker {name}: done"),
        Err(e) => eprintln!("worker {name}: {e}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // 例: rally-cli sqlite:///tmp/rally.db?table_name=demo
    let dsn = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "memory:".to_string());
    let storage = storage_from_dsn(&dsn)?;
    let factory = WaitGroupFactory::new(storage);

    let wait_group = factory.create().await?;
    println!("created wait group: {}", wait_group.uid());

    // 3 workers, staggered finishes
    wait_group.add(3).await?;
    println!("registered 3 units of work");

    tokio::spawn(run_worker(
        wait_group.clone(),
        "a",
        Duration::from_millis(300),
    ));
    tokio::spawn(run_worker(
        wait_group.clone(),
        "b",
        Duration::from_millis(600),
    ));
    tokio::spawn(run_worker(
        wait_group.clone(),
        "c",
        Duration::from_millis(900),
    ));

    // another handle onto the same record, the way a second process would get one
    let waiter = factory.restore(wait_group.uid().clone()).await?;
    let satisfied = waiter
        .wait(Some(Duration::from_secs(10)), Duration::from_millis(100))
        .await?;

    if satisfied {
        println!("all work finished");
    } else {
        println!("timed out, counter = {}", waiter.counter().await?);
    }

    let record = waiter.record().await?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
