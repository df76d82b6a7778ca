//! Benchmark for config parsing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;

fn bench_config_load_from_file(c: &mut Criterion) {
    let config_path = Path::new("genesis.example.toml");

    c.bench_function("config_parse_from_file", |b| {
        b.iter(|| {
            let config = genesis::config::GenesisConfig::load(Some(black_box(config_path)));
            black_box(config)
        });
    });
}

fn bench_config_load_defaults(c: &mut Criterion) {
    c.bench_function("config_parse_defaults_only", |b| {
        b.iter(|| {
            let config = genesis::config::GenesisConfig::load(None);
            black_box(config)
        });
    });
}

criterion_group!(benches, bench_config_load_from_file, bench_config_load_defaults);
criterion_main!(benches);
