//! Throughput benchmarks

use byteterm_core::core::codec::{Direction, EscapeEncoder};
use byteterm_core::core::console::{ConsoleRenderer, LineLayout, ViewportMetrics};
use byteterm_core::core::display::DisplayConfig;
use byteterm_core::core::format::ByteStreamFormatter;
use byteterm_core::core::fragment::StyledFragment;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

fn sample_data() -> Vec<u8> {
    (0..4096).map(|i| (i % 256) as u8).collect()
}

fn encoder_benchmark(c: &mut Criterion) {
    let text = "AT+CMD=1\\r\\n\\41\\42\\t".repeat(64);

    let mut group = c.benchmark_group("encoder");
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("escape_sequences", |b| {
        let encoder = EscapeEncoder::new();
        b.iter(|| black_box(encoder.encode(black_box(&text))))
    });

    group.finish();
}

fn formatter_benchmark(c: &mut Criterion) {
    let data = sample_data();
    let text_config = DisplayConfig::default();
    let hex_config = DisplayConfig {
        hex_mode: true,
        ..DisplayConfig::default()
    };

    let mut group = c.benchmark_group("formatter");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("text", |b| {
        let mut formatter = ByteStreamFormatter::new();
        b.iter(|| {
            let line = LineLayout::new(80, 9);
            black_box(formatter.format(black_box(&data), Direction::Inbound, &text_config, &line))
        })
    });

    group.bench_function("hex", |b| {
        let mut formatter = ByteStreamFormatter::new();
        b.iter(|| {
            let line = LineLayout::new(80, 9);
            black_box(formatter.format(black_box(&data), Direction::Inbound, &hex_config, &line))
        })
    });

    group.finish();
}

fn renderer_benchmark(c: &mut Criterion) {
    let fragments: Vec<StyledFragment> = (0..64)
        .map(|i| StyledFragment::plain(format!("line {i} of received data\n")))
        .collect();

    let mut group = c.benchmark_group("renderer");

    group.bench_function("enqueue_and_flush", |b| {
        b.iter(|| {
            let mut renderer = ConsoleRenderer::new(ViewportMetrics::default());
            renderer.enqueue(black_box(&fragments));
            renderer.flush();
            black_box(renderer.line_count())
        })
    });

    group.finish();
}

criterion_group!(benches, encoder_benchmark, formatter_benchmark, renderer_benchmark);
criterion_main!(benches);
