//! Performance benchmarks for return derivation and summaries.
//!
//! Run with: cargo bench

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crude::analytics::summarize;
use crude::transform::{filter_date_range, log_returns, rolling_volatility, with_returns};
use crude::types::PriceTable;

/// Generate a synthetic daily price table for benchmarking.
fn generate_table(count: usize) -> PriceTable {
    let start = NaiveDate::from_ymd_opt(1987, 5, 20).unwrap();
    let mut price = 18.0;
    PriceTable::from_prices((0..count).map(|i| {
        let noise = ((i as f64 * 0.7).sin() * 2.0 + (i as f64 * 1.3).cos()) * 0.05;
        price = (price * (1.0 + 0.0002) + noise).max(5.0);
        (start + chrono::Duration::days(i as i64), price)
    }))
}

fn bench_returns(c: &mut Criterion) {
    let table = generate_table(9000);
    let prices = table.prices();
    let returns = log_returns(&prices);

    let mut group = c.benchmark_group("returns");

    group.bench_function("log_returns", |b| b.iter(|| log_returns(black_box(&prices))));

    for window in [10, 30, 90].iter() {
        group.bench_with_input(
            BenchmarkId::new("rolling_volatility", window),
            window,
            |b, &window| b.iter(|| rolling_volatility(black_box(&returns), window)),
        );
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let table = generate_table(9000);
    let start = NaiveDate::from_ymd_opt(2000, 1, 1);
    let end = NaiveDate::from_ymd_opt(2010, 12, 31);

    let mut group = c.benchmark_group("pipeline");

    group.bench_function("filter_date_range", |b| {
        b.iter(|| filter_date_range(black_box(&table), start, end))
    });

    group.bench_function("with_returns_30", |b| {
        b.iter(|| with_returns(black_box(table.clone()), 30))
    });

    let prepared = with_returns(table.clone(), 30);
    group.bench_function("summarize", |b| b.iter(|| summarize(black_box(&prepared))));

    group.finish();
}

criterion_group!(benches, bench_returns, bench_pipeline);
criterion_main!(benches);
