//! Benchmarks for candidate planning and error classification.
//!
//! Both run on every routed request or reported error, before any I/O.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use genesis::config::default_providers;
use genesis::provider::ProviderDescriptor;
use genesis::recovery::ErrorCategory;
use genesis::routing::{plan, RequestType};

fn descriptors(count: usize) -> Vec<ProviderDescriptor> {
    let base = default_providers();
    (0..count)
        .map(|i| {
            let mut descriptor = base[i % base.len()].descriptor();
            descriptor.id = format!("{}-{}", descriptor.id, i);
            descriptor.priority = i as u32 + 1;
            descriptor
        })
        .collect()
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    for count in [3usize, 10, 50] {
        let active = descriptors(count);
        group.bench_with_input(BenchmarkId::new("auto", count), &active, |b, active| {
            b.iter(|| plan(black_box(RequestType::Research), black_box(active)))
        });
    }

    let table: Vec<_> = default_providers().iter().map(|p| p.descriptor()).collect();
    group.bench_function("fixed_route", |b| {
        b.iter(|| plan(black_box(RequestType::Cultural), black_box(&table)))
    });
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let messages = [
        "TypeError: Failed to fetch",
        "AI router returned 503 from provider anthropic-claude",
        "JWT token expired for session",
        "Hydration failed because the initial UI does not match",
        "something odd happened with no obvious cause at all",
    ];
    let stack = "at renderTree (tree.js:120:14)\nat commitRoot (react-dom.js:88:2)";

    c.bench_function("classify_message", |b| {
        b.iter(|| {
            for message in &messages {
                black_box(ErrorCategory::classify_message(black_box(message), Some(stack)));
            }
        })
    });
}

criterion_group!(benches, bench_plan, bench_classify);
criterion_main!(benches);
