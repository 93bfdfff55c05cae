// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use criterion::{criterion_group, criterion_main, Criterion};

use engine::kdf::{hash, Context, Variant};

fn bench_derive_defaults(c: &mut Criterion) {
    c.bench_function("derive with the reference defaults", |b| {
        b.iter(|| {
            let context = Context::new(b"benchmark password", b"benchmark salt");
            hash(&context).unwrap()
        });
    });
}

fn bench_variants_one_pass(c: &mut Criterion) {
    for variant in [Variant::Argon2d, Variant::Argon2i, Variant::Argon2id] {
        c.bench_function(&format!("{variant}, one pass over 1 MiB"), |b| {
            b.iter(|| {
                let mut context = Context::new(b"benchmark password", b"benchmark salt");
                context.variant = variant;
                context.memory_cost = 1024;
                context.time_cost = 1;
                hash(&context).unwrap()
            });
        });
    }
}

fn bench_parallel_lanes(c: &mut Criterion) {
    c.bench_function("four lanes on four workers, 4 MiB", |b| {
        b.iter(|| {
            let mut context = Context::new(b"benchmark password", b"benchmark salt");
            context.lanes = 4;
            context.memory_cost = 4096;
            context.time_cost = 1;
            let context = context.with_auto_threads();
            hash(&context).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_derive_defaults,
    bench_variants_one_pass,
    bench_parallel_lanes
);
criterion_main!(benches);
