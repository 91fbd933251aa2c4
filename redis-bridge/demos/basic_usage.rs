//! Walk through the three execution contexts against the in-memory backend.
//!
//! Run with `cargo run --example basic_usage`.

use redis_bridge::driver::Resp2Driver;
use redis_bridge::testing::MemoryBackend;
use redis_bridge::{BridgeConfig, BridgeResult, StandaloneClient};

fn main() -> BridgeResult<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let client = StandaloneClient::connect(
        Resp2Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )?;

    // Immediate execution: results are realized on return.
    client.strings().set("user:1:name", "ada")?;
    let name = client.strings().get("user:1:name")?.immediate()?;
    println!("stored name: {:?}", name);

    // Pipeline: calls are buffered, handles resolve at sync.
    client.open_pipeline()?;
    let first = client.strings().incr("visits")?.deferred()?;
    let second = client.strings().incr("visits")?.deferred()?;
    client.sync()?;
    println!("visits after pipeline: {} then {}", first.take()?, second.take()?);

    // Transaction: same deferred shape, atomic commit.
    client.multi()?;
    let balance = client.strings().incr_by("balance", 100)?.deferred()?;
    let audit = client
        .lists()
        .rpush("audit", ["credited 100"])?
        .deferred()?;
    let results = client.exec()?;
    println!(
        "committed {} commands; balance={}, audit entries={}",
        results.len(),
        balance.take()?,
        audit.take()?
    );

    // Unsupported combinations fail with a typed error instead of reaching
    // the server.
    match client.cluster().nodes() {
        Err(err) => println!("cluster query on standalone: {err}"),
        Ok(_) => unreachable!(),
    }

    client.close();
    Ok(())
}
