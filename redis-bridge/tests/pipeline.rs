//! Pipeline lifecycle against the in-memory backend.

use redis_bridge::driver::{Resp2Driver, Resp3Driver};
use redis_bridge::testing::MemoryBackend;
use redis_bridge::{BridgeConfig, BridgeError, ExecMode, StandaloneClient, Value};

fn client() -> StandaloneClient<Resp2Driver<MemoryBackend>> {
    StandaloneClient::connect(
        Resp2Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )
    .expect("facade")
}

#[test]
fn sync_resolves_everything_in_order() {
    let client = client();
    client.open_pipeline().unwrap();
    assert_eq!(client.mode(), ExecMode::Pipeline);

    let first = client.strings().incr("n").unwrap().deferred().unwrap();
    let second = client.strings().incr("n").unwrap().deferred().unwrap();
    let third = client.strings().get("missing").unwrap().deferred().unwrap();

    let values = client.sync().unwrap();
    assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Nil]);
    assert_eq!(first.take().unwrap(), 1);
    assert_eq!(second.take().unwrap(), 2);
    assert_eq!(third.take().unwrap(), None);
    assert_eq!(client.mode(), ExecMode::Normal);
}

#[test]
fn reading_before_sync_is_a_caller_error() {
    let client = client();
    client.open_pipeline().unwrap();
    let handle = client.strings().incr("n").unwrap().deferred().unwrap();
    assert!(!handle.is_resolved());
    assert!(matches!(handle.take(), Err(BridgeError::Unresolved)));
    client.sync().unwrap();
    assert_eq!(handle.take().unwrap(), 1);
}

#[test]
fn a_handle_is_consumed_exactly_once() {
    let client = client();
    client.open_pipeline().unwrap();
    let handle = client.strings().incr("n").unwrap().deferred().unwrap();
    client.sync().unwrap();
    handle.take().unwrap();
    assert!(matches!(handle.take(), Err(BridgeError::InvalidState(_))));
}

#[test]
fn sync_without_a_pipeline_is_an_invalid_state() {
    let client = client();
    assert!(matches!(client.sync(), Err(BridgeError::InvalidState(_))));

    client.multi().unwrap();
    assert!(matches!(client.sync(), Err(BridgeError::InvalidState(_))));
    client.discard().unwrap();
}

#[test]
fn empty_pipeline_syncs_to_nothing() {
    let client = client();
    client.open_pipeline().unwrap();
    assert_eq!(client.sync().unwrap(), Vec::<Value>::new());
}

#[test]
fn mixed_groups_share_one_pipeline() {
    let client = client();
    client.open_pipeline().unwrap();
    let pushed = client.lists().rpush("q", ["a", "b"]).unwrap().deferred().unwrap();
    let fields = client
        .hashes()
        .hset("h", [("f", "v")])
        .unwrap()
        .deferred()
        .unwrap();
    let size = client.server().dbsize().unwrap().deferred().unwrap();

    client.sync().unwrap();
    assert_eq!(pushed.take().unwrap(), 2);
    assert_eq!(fields.take().unwrap(), 1);
    assert_eq!(size.take().unwrap(), 2);
}

#[test]
fn pipelines_work_identically_over_the_extended_backend() {
    let client = StandaloneClient::connect(
        Resp3Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )
    .expect("facade");

    client.open_pipeline().unwrap();
    let incr = client.strings().incr("n").unwrap().deferred().unwrap();
    let flag = client.sets().sadd("s", ["m"]).unwrap().deferred().unwrap();
    let values = client.sync().unwrap();

    assert_eq!(values, vec![Value::Int(1), Value::Int(1)]);
    assert_eq!(incr.take().unwrap(), 1);
    assert_eq!(flag.take().unwrap(), 1);
}
