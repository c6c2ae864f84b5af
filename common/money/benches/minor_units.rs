use criterion::{criterion_group, criterion_main, Criterion, black_box};
use bigdecimal::BigDecimal;
use std::str::FromStr;

use common_money::to_minor_units;

fn bench_minor_units(c: &mut Criterion) {
    let samples: Vec<BigDecimal> = [
        "1.005", "2.675", "0.005", "19.99", "12345", "19.90", "1000000.555",
        "999999.995", "0.3349", "42.4242"
    ].into_iter().map(|s| BigDecimal::from_str(s).unwrap()).collect();
    c.bench_function("to_minor_units", |b| {
        b.iter(|| {
            for v in &samples { black_box(to_minor_units(v).ok()); }
        });
    });
}

criterion_group!(minor_units, bench_minor_units);
criterion_main!(minor_units);
