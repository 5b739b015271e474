//! Criterion benchmarks for the daily report hot paths.
//!
//! Benchmarks:
//! 1. CSV decode of a tick partition
//! 2. Full transform (project, rollup, percent change, filter)
//! 3. Parquet encode of the resulting report

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use xetra_core::data::{decode_ticks, encode_report};
use xetra_core::{transform, SourceColumns};

// ── Helpers ──────────────────────────────────────────────────────────

/// One Xetra-shaped CSV: `securities` ISINs × two days × `ticks_per_day` minutes.
fn make_csv(securities: usize, ticks_per_day: usize) -> String {
    let mut csv = String::from(
        "ISIN,Mnemonic,SecurityDesc,SecurityType,Currency,SecurityID,Date,Time,\
         StartPrice,MaxPrice,MinPrice,EndPrice,TradedVolume,NumberOfTrades\n",
    );
    for s in 0..securities {
        for day in ["2021-05-07", "2021-05-08"] {
            for m in 0..ticks_per_day {
                let price = 50.0 + (s as f64 * 0.7 + m as f64 * 0.1).sin() * 5.0;
                csv.push_str(&format!(
                    "DE{s:010},M{s},DESC,Common stock,EUR,{s},{day},{:02}:{:02},\
                     {price:.2},{:.2},{:.2},{price:.2},{},3\n",
                    8 + m / 60,
                    m % 60,
                    price + 0.2,
                    price - 0.2,
                    100 + m
                ));
            }
        }
    }
    csv
}

fn target() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2021, 5, 8).unwrap()
}

// ── 1. CSV Decode ────────────────────────────────────────────────────

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_ticks");
    for securities in [100, 1_000] {
        let csv = make_csv(securities, 60);
        group.bench_with_input(BenchmarkId::from_parameter(securities), &csv, |b, csv| {
            b.iter(|| decode_ticks(black_box(csv.as_bytes()), b',').unwrap())
        });
    }
    group.finish();
}

// ── 2. Transform ─────────────────────────────────────────────────────

fn bench_transform(c: &mut Criterion) {
    let columns = SourceColumns::default();
    let mut group = c.benchmark_group("transform");
    for securities in [100, 1_000] {
        let table = decode_ticks(make_csv(securities, 60).as_bytes(), b',').unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(securities), &table, |b, table| {
            b.iter(|| transform(black_box(table), &columns, target()).unwrap())
        });
    }
    group.finish();
}

// ── 3. Parquet Encode ────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let table = decode_ticks(make_csv(1_000, 10).as_bytes(), b',').unwrap();
    let report = transform(&table, &SourceColumns::default(), target()).unwrap();
    c.bench_function("encode_report_1000", |b| {
        b.iter(|| encode_report(black_box(&report)).unwrap())
    });
}

criterion_group!(benches, bench_decode, bench_transform, bench_encode);
criterion_main!(benches);
