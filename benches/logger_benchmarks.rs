//! Criterion benchmarks for logtag

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use logtag::interceptors::http::{latency_millis, status_color};
use logtag::interceptors::PayloadPolicy;
use logtag::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn sink_logger(use_colors: bool) -> TagLogger {
    TagLogger::builder()
        .tag_color("api", LogColor::BrightBlue)
        .use_colors(use_colors)
        .appender(WriterAppender::new(std::io::sink()))
        .build()
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_emitted_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitted_logging");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(true);

    group.bench_function("info", |b| {
        b.iter(|| {
            logger.info(black_box("api"), black_box("Info message"));
        });
    });

    group.bench_function("warn", |b| {
        b.iter(|| {
            logger.warn(black_box("api"), black_box("Warning message"));
        });
    });

    group.bench_function("printf", |b| {
        b.iter(|| {
            logger.printf(black_box("api"), format_args!("request {}", black_box(42)));
        });
    });

    group.bench_function("plain_untagged_color", |b| {
        let plain = sink_logger(false);
        b.iter(|| {
            plain.info(black_box("db"), black_box("Info message"));
        });
    });

    group.finish();
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(true);
    logger.set_min_level(LogLevel::Error);

    group.bench_function("filtered_info", |b| {
        b.iter(|| {
            logger.info(black_box("api"), black_box("Filtered message"));
        });
    });

    group.bench_function("filtered_logf", |b| {
        b.iter(|| {
            logger.logf(
                black_box("api"),
                LogLevel::Warning,
                format_args!("never rendered {}", black_box(7)),
            );
        });
    });

    logger.ignore_tags(["noisy"]);
    group.bench_function("ignored_tag", |b| {
        b.iter(|| {
            logger.error(black_box("noisy"), black_box("Ignored message"));
        });
    });

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Arc::new(sink_logger(false));

    group.bench_function("multi_thread_4", |b| {
        let logger = Arc::clone(&logger);
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        logger.info("api", black_box("Concurrent message"));
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Formatting Helpers
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    group.bench_function("to_colored_text", |b| {
        b.iter(|| black_box(to_colored_text(black_box(LogColor::BrightBlue), black_box("/users/42"))));
    });

    group.bench_function("status_color", |b| {
        b.iter(|| black_box(status_color(black_box(503))));
    });

    group.bench_function("latency_millis", |b| {
        b.iter(|| black_box(latency_millis(black_box(Duration::from_micros(1200)))));
    });

    group.finish();
}

fn bench_payload_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_render");

    let small = "x".repeat(64);
    let large = "y".repeat(64 * 1024);

    group.bench_function("truncated_small", |b| {
        b.iter(|| black_box(PayloadPolicy::Truncated(500).render(black_box(&small))));
    });

    group.bench_function("truncated_large", |b| {
        b.iter(|| black_box(PayloadPolicy::Truncated(500).render(black_box(&large))));
    });

    group.bench_function("hidden", |b| {
        b.iter(|| black_box(PayloadPolicy::Hidden.render(black_box(&large))));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_emitted_logging,
    bench_level_filtering,
    bench_concurrent_logging,
    bench_formatting,
    bench_payload_render
);

criterion_main!(benches);
