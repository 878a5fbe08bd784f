//! Benchmarks for transcript reconciliation.
//!
//! Every provider notification runs through `TranscriptReconciler::apply`, so it
//! has to stay far below the interval at which interim results arrive (tens of
//! milliseconds). The CJK pass scans the whole transcript on each batch, which
//! makes long Japanese dictation the worst case.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voice_input_core::{ResultBatch, Segment};
use voice_input_engine::reconcile::collapse_cjk_spacing;
use voice_input_engine::TranscriptReconciler;

/// A growing utterance: `n` committed segments followed by one interim segment.
fn growing_batch(n: usize, word: &str) -> ResultBatch {
    let mut results: Vec<Segment> = (0..n)
        .map(|i| Segment::finalized(format!("{}{} ", word, i % 10)))
        .collect();
    results.push(Segment::interim(format!("{} ", word)));
    ResultBatch::new(0, results)
}

fn bench_reconcile_latin(c: &mut Criterion) {
    let batch = growing_batch(200, "dictation");
    c.bench_function("reconcile_latin_200_segments", |b| {
        b.iter(|| {
            let mut reconciler = TranscriptReconciler::new();
            black_box(reconciler.apply(black_box(&batch)))
        })
    });
}

fn bench_reconcile_japanese(c: &mut Criterion) {
    let batch = growing_batch(200, "音声 入力");
    c.bench_function("reconcile_japanese_200_segments", |b| {
        b.iter(|| {
            let mut reconciler = TranscriptReconciler::new();
            black_box(reconciler.apply(black_box(&batch)))
        })
    });
}

fn bench_collapse_cjk(c: &mut Criterion) {
    let text = "今日 は 良い 天気 です ね 。 ".repeat(500);
    c.bench_function("collapse_cjk_spacing_4k_chars", |b| {
        b.iter(|| collapse_cjk_spacing(black_box(&text)))
    });
}

criterion_group!(
    benches,
    bench_reconcile_latin,
    bench_reconcile_japanese,
    bench_collapse_cjk
);
criterion_main!(benches);
