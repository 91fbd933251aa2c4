use criterion::{black_box, criterion_group, criterion_main, Criterion};
use redis_bridge::driver::{Reply, Resp2Driver, Resp2Reply};
use redis_bridge::testing::MemoryBackend;
use redis_bridge::{convert, BridgeConfig, StandaloneClient};

fn immediate_dispatch(c: &mut Criterion) {
    let client = StandaloneClient::connect(
        Resp2Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )
    .expect("facade");
    client.strings().set("bench:key", "value").expect("seed");

    c.bench_function("immediate_get", |b| {
        b.iter(|| {
            let value = client
                .strings()
                .get(black_box("bench:key"))
                .expect("dispatch")
                .immediate()
                .expect("realized");
            black_box(value)
        });
    });

    c.bench_function("immediate_incr", |b| {
        b.iter(|| {
            client
                .strings()
                .incr(black_box("bench:counter"))
                .expect("dispatch")
                .immediate()
                .expect("realized")
        });
    });
}

fn pipelined_dispatch(c: &mut Criterion) {
    let client = StandaloneClient::connect(
        Resp2Driver::new(MemoryBackend::new()),
        &BridgeConfig::default(),
    )
    .expect("facade");

    c.bench_function("pipeline_of_16", |b| {
        b.iter(|| {
            client.open_pipeline().expect("open");
            for i in 0..16 {
                client
                    .strings()
                    .incr(format!("bench:p{i}"))
                    .expect("queue");
            }
            black_box(client.sync().expect("sync"))
        });
    });
}

fn converters(c: &mut Criterion) {
    c.bench_function("convert_pairs", |b| {
        b.iter(|| {
            let reply = Resp2Reply::Array(
                (0..32)
                    .flat_map(|i| {
                        [
                            Resp2Reply::Bulk(format!("field{i}").into()),
                            Resp2Reply::Bulk(format!("value{i}").into()),
                        ]
                    })
                    .collect(),
            );
            black_box(convert::binary_pairs(black_box(reply)).expect("pairs"))
        });
    });

    c.bench_function("reply_into_value", |b| {
        b.iter(|| {
            let reply = Resp2Reply::Array(
                (0..64).map(Resp2Reply::Integer).collect(),
            );
            black_box(black_box(reply).into_value())
        });
    });
}

criterion_group!(benches, immediate_dispatch, pipelined_dispatch, converters);
criterion_main!(benches);
