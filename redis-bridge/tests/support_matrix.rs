//! Which commands are available where: the support rules are declared by the
//! operations groups themselves, so they are checked through the public
//! facades.

use redis_bridge::driver::{Resp2Driver, Resp2Transport};
use redis_bridge::testing::MemoryBackend;
use redis_bridge::{
    BridgeConfig, BridgeError, ClusterClient, SentinelClient, SentinelConfig, StandaloneClient,
    Topology,
};
use std::time::Duration;

fn standalone() -> StandaloneClient<Resp2Driver<MemoryBackend>> {
    StandaloneClient::connect(
        Resp2Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )
    .expect("standalone facade")
}

fn cluster() -> ClusterClient<Resp2Driver<MemoryBackend>> {
    ClusterClient::connect(
        Resp2Driver::new(MemoryBackend::new()),
        &BridgeConfig::new("redis://n1:7000,n2:7001"),
    )
    .expect("cluster facade")
}

fn sentinel() -> SentinelClient<Resp2Driver<MemoryBackend>> {
    let config = BridgeConfig::default()
        .with_sentinel(SentinelConfig::new("main").add_sentinel("127.0.0.1:26379"));
    SentinelClient::connect(Resp2Driver::new(MemoryBackend::new()), &config)
        .expect("sentinel facade")
}

#[test]
fn cluster_management_is_standalone_unsupported() {
    let client = standalone();
    let err = client.cluster().nodes().unwrap_err();
    match err {
        BridgeError::NotSupported { command, topology } => {
            assert_eq!(command.to_string(), "CLUSTER NODES");
            assert_eq!(topology, Topology::Standalone);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(client.cluster().key_slot("user:1").is_err());
}

#[test]
fn sentinel_group_is_only_live_on_the_sentinel_facade() {
    assert!(matches!(
        standalone().sentinel().masters().unwrap_err(),
        BridgeError::NotSupported { .. }
    ));
    assert!(matches!(
        cluster().sentinel().master_addr("main").unwrap_err(),
        BridgeError::NotSupported { .. }
    ));

    // On the sentinel facade the call carries an executor; the in-memory
    // store does not speak SENTINEL, so the failure is an execution error,
    // proof the command was dispatched rather than rejected up front.
    assert!(matches!(
        sentinel().sentinel().masters().unwrap_err(),
        BridgeError::Execution { .. }
    ));
}

#[test]
fn move_db_is_unsupported_on_cluster_only() {
    let client = cluster();
    assert!(matches!(
        client.keys().move_db("k", 2).unwrap_err(),
        BridgeError::NotSupported { .. }
    ));

    let client = standalone();
    client.strings().set("k", "v").unwrap();
    assert!(client.keys().move_db("k", 2).unwrap().immediate().unwrap());
}

#[test]
fn blocking_pop_is_context_restricted_not_topology_restricted() {
    let client = standalone();
    client.lists().rpush("q", ["job"]).unwrap();
    let popped = client
        .lists()
        .blpop("q", Duration::from_secs(1))
        .unwrap()
        .immediate()
        .unwrap();
    assert!(popped.is_some());

    client.open_pipeline().unwrap();
    let err = client.lists().blpop("q", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, BridgeError::NotSupportedInPipeline { .. }));
    client.sync().unwrap();

    client.multi().unwrap();
    let err = client.lists().blpop("q", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, BridgeError::NotSupportedInTransaction { .. }));
    client.discard().unwrap();
}

#[test]
fn subscribe_is_rejected_everywhere() {
    for err in [
        standalone().pubsub().subscribe("news").unwrap_err(),
        sentinel().pubsub().subscribe("news").unwrap_err(),
        cluster().pubsub().subscribe("news").unwrap_err(),
    ] {
        assert!(err.is_unsupported(), "got {err}");
    }
}

#[test]
fn unsupported_errors_name_the_command() {
    let err = standalone().cluster().slots().unwrap_err();
    assert_eq!(err.command().map(|c| c.to_string()).as_deref(), Some("CLUSTER SLOTS"));
    assert!(err.is_unsupported());
}

// The memory backend itself serves any facade; sanity-check the plumbing.
#[test]
fn memory_backend_also_speaks_batches() {
    let mut backend = MemoryBackend::new();
    let frames = vec![
        redis_bridge::CommandFrame::new("SET").arg("a").arg("1"),
        redis_bridge::CommandFrame::new("GET").arg("a"),
    ];
    let replies = Resp2Transport::exchange_batch(&mut backend, &frames).unwrap();
    assert_eq!(replies.len(), 2);
}
