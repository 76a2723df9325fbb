use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shard_tss::config::EngineConfig;
use shard_tss::engine::TssEngine;
use shard_tss::sss::{combine_shares, split_secret};

fn bench_split_secret(c: &mut Criterion) {
    c.bench_function("split_secret", |b| {
        let secret = b"this is a very secret 32b key!!!";
        let threshold = 5;
        let shares = 10;
        b.iter(|| split_secret(black_box(secret), black_box(threshold), black_box(shares)))
    });
}

fn bench_combine_shares(c: &mut Criterion) {
    c.bench_function("combine_shares", |b| {
        let secret = b"this is a very secret 32b key!!!";
        let threshold = 5;
        let set = split_secret(secret, threshold, 10).unwrap();
        b.iter(|| combine_shares(black_box(&set.shares()[..threshold]), black_box(threshold)))
    });
}

fn bench_protect(c: &mut Criterion) {
    let engine = TssEngine::new(EngineConfig::default()).unwrap();
    let payload = vec![0x42u8; 1024];

    c.bench_function("protect_1k", |b| {
        b.iter(|| engine.protect(black_box(&payload), 3, 5))
    });
}

fn bench_recover(c: &mut Criterion) {
    let engine = TssEngine::new(EngineConfig::default()).unwrap();
    let payload = vec![0x42u8; 1024];
    let (shares, bundle) = engine.protect(&payload, 3, 5).unwrap();

    c.bench_function("recover_1k", |b| {
        b.iter(|| engine.recover(black_box(&shares.shares()[..3]), 3, black_box(&bundle)))
    });
}

criterion_group!(benches, bench_split_secret, bench_combine_shares, bench_protect, bench_recover);
criterion_main!(benches);
