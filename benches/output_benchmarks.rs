//! Performance benchmarks for line formatting and sink publishing

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shellcast::output::{
    format_line, ConsoleMode, SinkSet, StreamSource, TimestampPolicy, DEFAULT_TIMESTAMP_FORMAT,
};
use std::hint::black_box;
use tempfile::TempDir;
use tokio::runtime::Runtime;

fn bench_format_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_line");
    let stamped = TimestampPolicy::new(true, DEFAULT_TIMESTAMP_FORMAT).unwrap();
    let plain = TimestampPolicy::disabled();

    for len in [16usize, 256, 4096] {
        let raw = "x".repeat(len);
        group.throughput(Throughput::Bytes(len as u64));

        group.bench_with_input(BenchmarkId::new("plain", len), &raw, |b, raw| {
            b.iter(|| format_line(black_box(raw), None, &plain))
        });
        group.bench_with_input(BenchmarkId::new("tagged_timestamped", len), &raw, |b, raw| {
            b.iter(|| format_line(black_box(raw), Some("[CMD1] "), &stamped))
        });
    }

    group.finish();
}

fn bench_publish(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("publish");

    group.bench_function("buffer_only", |b| {
        let sinks = SinkSet::new(ConsoleMode::Silent);
        b.to_async(&rt)
            .iter(|| sinks.publish(black_box("a line of command output"), StreamSource::Stdout))
    });

    group.bench_function("with_recording", |b| {
        let dir = TempDir::new().unwrap();
        let sinks = SinkSet::new(ConsoleMode::Silent);
        sinks.arm_recording(&dir.path().join("recording.txt"));
        b.to_async(&rt)
            .iter(|| sinks.publish(black_box("a line of command output"), StreamSource::Stdout))
    });

    group.finish();
}

criterion_group!(benches, bench_format_line, bench_publish);
criterion_main!(benches);
