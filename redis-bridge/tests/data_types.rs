//! The same typed surface over both driver back-ends.
//!
//! Everything here runs once per back-end through a shared generic body; the
//! point is that converters produce identical domain values regardless of the
//! native reply model underneath.

use redis_bridge::driver::{Driver, Resp2Driver, Resp3Driver};
use redis_bridge::testing::MemoryBackend;
use redis_bridge::{BridgeConfig, KeyKind, StandaloneClient};
use std::time::Duration;

fn resp2() -> StandaloneClient<Resp2Driver<MemoryBackend>> {
    StandaloneClient::connect(
        Resp2Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )
    .expect("facade")
}

fn resp3() -> StandaloneClient<Resp3Driver<MemoryBackend>> {
    StandaloneClient::connect(
        Resp3Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )
    .expect("facade")
}

fn exercise_strings<D: Driver>(client: &StandaloneClient<D>) {
    client.strings().set("s", "hello").unwrap();
    assert_eq!(
        client
            .strings()
            .get("s")
            .unwrap()
            .immediate()
            .unwrap()
            .as_deref(),
        Some(b"hello".as_ref())
    );
    assert_eq!(
        client.strings().strlen("s").unwrap().immediate().unwrap(),
        5
    );
    assert!(client
        .strings()
        .set_nx("s", "other")
        .unwrap()
        .immediate()
        .map(|created| !created)
        .unwrap());

    let values = client
        .strings()
        .mget(["s", "missing"])
        .unwrap()
        .immediate()
        .unwrap();
    assert_eq!(values[0].as_deref(), Some(b"hello".as_ref()));
    assert_eq!(values[1], None);

    assert_eq!(client.strings().incr("n").unwrap().immediate().unwrap(), 1);
    assert_eq!(
        client
            .strings()
            .incr_by("n", 9)
            .unwrap()
            .immediate()
            .unwrap(),
        10
    );
    assert_eq!(client.strings().decr("n").unwrap().immediate().unwrap(), 9);
}

fn exercise_keys<D: Driver>(client: &StandaloneClient<D>) {
    client.strings().set("k", "v").unwrap();
    assert!(client.keys().exists("k").unwrap().immediate().unwrap());
    assert_eq!(
        client.keys().key_type("k").unwrap().immediate().unwrap(),
        KeyKind::String
    );
    assert_eq!(client.keys().ttl("k").unwrap().immediate().unwrap(), -1);
    assert!(client
        .keys()
        .expire("k", Duration::from_secs(120))
        .unwrap()
        .immediate()
        .unwrap());
    assert!(client.keys().ttl("k").unwrap().immediate().unwrap() > 0);
    assert!(client.keys().persist("k").unwrap().immediate().unwrap());
    assert_eq!(client.keys().ttl("k").unwrap().immediate().unwrap(), -1);

    client.keys().rename("k", "k2").unwrap();
    assert!(!client.keys().exists("k").unwrap().immediate().unwrap());
    assert_eq!(
        client.keys().del(["k2", "missing"]).unwrap().immediate().unwrap(),
        1
    );
}

fn exercise_hashes<D: Driver>(client: &StandaloneClient<D>) {
    assert_eq!(
        client
            .hashes()
            .hset("h", [("a", "1"), ("b", "2")])
            .unwrap()
            .immediate()
            .unwrap(),
        2
    );
    assert_eq!(client.hashes().hlen("h").unwrap().immediate().unwrap(), 2);
    assert!(client
        .hashes()
        .hexists("h", "a")
        .unwrap()
        .immediate()
        .unwrap());

    // Flat array on one back-end, native map on the other; same pairs out.
    let mut pairs = client.hashes().hgetall("h").unwrap().immediate().unwrap();
    pairs.sort();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].0.as_ref(), b"a");

    let partial = client
        .hashes()
        .hmget("h", ["b", "missing"])
        .unwrap()
        .immediate()
        .unwrap();
    assert_eq!(partial[0].as_deref(), Some(b"2".as_ref()));
    assert_eq!(partial[1], None);

    assert_eq!(
        client.hashes().hdel("h", ["a"]).unwrap().immediate().unwrap(),
        1
    );
}

fn exercise_collections<D: Driver>(client: &StandaloneClient<D>) {
    assert_eq!(
        client
            .sets()
            .sadd("set", ["x", "y", "x"])
            .unwrap()
            .immediate()
            .unwrap(),
        2
    );
    assert!(client
        .sets()
        .sismember("set", "x")
        .unwrap()
        .immediate()
        .unwrap());
    assert_eq!(client.sets().scard("set").unwrap().immediate().unwrap(), 2);

    client.lists().rpush("list", ["a", "b", "c"]).unwrap();
    client.lists().lpush("list", ["z"]).unwrap();
    assert_eq!(client.lists().llen("list").unwrap().immediate().unwrap(), 4);
    let middle = client
        .lists()
        .lrange("list", 1, 2)
        .unwrap()
        .immediate()
        .unwrap();
    assert_eq!(middle.len(), 2);
    assert_eq!(middle[0].as_ref(), b"a");
    assert_eq!(
        client
            .lists()
            .lpop("list")
            .unwrap()
            .immediate()
            .unwrap()
            .as_deref(),
        Some(b"z".as_ref())
    );
}

fn exercise_sorted_sets<D: Driver>(client: &StandaloneClient<D>) {
    client
        .sorted_sets()
        .zadd("board", [(2.0, "beta"), (1.0, "alpha")])
        .unwrap();
    assert_eq!(
        client
            .sorted_sets()
            .zcard("board")
            .unwrap()
            .immediate()
            .unwrap(),
        2
    );
    assert_eq!(
        client
            .sorted_sets()
            .zrank("board", "alpha")
            .unwrap()
            .immediate()
            .unwrap(),
        Some(0)
    );
    assert_eq!(
        client
            .sorted_sets()
            .zrank("board", "missing")
            .unwrap()
            .immediate()
            .unwrap(),
        None
    );

    let score = client
        .sorted_sets()
        .zscore("board", "beta")
        .unwrap()
        .immediate()
        .unwrap()
        .expect("beta is a member");
    assert!((score - 2.0).abs() < f64::EPSILON);

    let ranked = client
        .sorted_sets()
        .zrange_with_scores("board", 0, -1)
        .unwrap()
        .immediate()
        .unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].member.as_ref(), b"alpha");
    assert!(ranked[0].score < ranked[1].score);
}

fn exercise_streams<D: Driver>(client: &StandaloneClient<D>) {
    let first = client
        .streams()
        .xadd("events", [("kind", "created")])
        .unwrap()
        .immediate()
        .unwrap();
    let second = client
        .streams()
        .xadd("events", [("kind", "updated")])
        .unwrap()
        .immediate()
        .unwrap();
    assert!(first < second);
    assert_eq!(
        client.streams().xlen("events").unwrap().immediate().unwrap(),
        2
    );

    let entries = client
        .streams()
        .xrange("events", "-", "+", Some(1))
        .unwrap()
        .immediate()
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, first);
    assert_eq!(entries[0].fields[0].1.as_ref(), b"created");
}

fn exercise_server<D: Driver>(client: &StandaloneClient<D>) {
    assert_eq!(
        client.server().ping().unwrap().immediate().unwrap(),
        "PONG"
    );
    assert_eq!(
        client
            .server()
            .echo("payload")
            .unwrap()
            .immediate()
            .unwrap()
            .as_ref(),
        b"payload"
    );
    assert!(client
        .server()
        .info(None)
        .unwrap()
        .immediate()
        .unwrap()
        .contains("redis_version"));
    let (secs, _micros) = client.server().time().unwrap().immediate().unwrap();
    assert!(secs > 0);

    assert_eq!(
        client.acl().whoami().unwrap().immediate().unwrap(),
        "default"
    );
    assert!(!client.acl().cat().unwrap().immediate().unwrap().is_empty());
}

#[test]
fn flat_backend_covers_the_typed_surface() {
    let client = resp2();
    exercise_strings(&client);
    exercise_keys(&client);
    exercise_hashes(&client);
    exercise_collections(&client);
    exercise_sorted_sets(&client);
    exercise_streams(&client);
    exercise_server(&client);
}

#[test]
fn extended_backend_covers_the_typed_surface() {
    let client = resp3();
    exercise_strings(&client);
    exercise_keys(&client);
    exercise_hashes(&client);
    exercise_collections(&client);
    exercise_sorted_sets(&client);
    exercise_streams(&client);
    exercise_server(&client);
}
