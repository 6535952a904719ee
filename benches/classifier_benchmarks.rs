//! Benchmarks for gesture classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use makaton_gesture::{
    classifier::{classify, GestureThresholds, HandMetrics},
    landmark::{index, HandLandmarkSet, Landmark},
};

fn hand(overrides: &[(usize, (f32, f32))]) -> HandLandmarkSet {
    let mut points = [Landmark::default(); 21];
    for &(idx, (x, y)) in overrides {
        points[idx] = Landmark::new(x, y);
    }
    HandLandmarkSet::new(points)
}

/// One pose per exit point of the rule list
fn reference_hands() -> Vec<(&'static str, HandLandmarkSet)> {
    vec![
        (
            "hello",
            hand(&[
                (index::INDEX_FINGER_TIP, (1.0, 0.0)),
                (index::MIDDLE_FINGER_TIP, (1.0, 0.5)),
                (index::RING_FINGER_TIP, (1.0, 1.0)),
                (index::PINKY_TIP, (0.5, 1.0)),
            ]),
        ),
        ("goodbye", HandLandmarkSet::uniform(Landmark::new(0.5, 0.5))),
        (
            "yes",
            hand(&[
                (index::THUMB_TIP, (0.4, 0.6)),
                (index::INDEX_FINGER_TIP, (0.6, 0.3)),
                (index::MIDDLE_FINGER_TIP, (0.41, 0.6)),
                (index::RING_FINGER_TIP, (0.39, 0.6)),
                (index::PINKY_TIP, (0.4, 0.59)),
            ]),
        ),
        (
            "none",
            hand(&[
                (index::THUMB_TIP, (0.4, 0.0)),
                (index::INDEX_FINGER_TIP, (0.2, 0.0)),
                (index::MIDDLE_FINGER_TIP, (0.4, 0.2)),
                (index::RING_FINGER_TIP, (0.4, -0.2)),
                (index::PINKY_TIP, (0.4, 0.1)),
            ]),
        ),
    ]
}

/// Benchmark classification down each branch of the rule list
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let thresholds = GestureThresholds::default();

    for (name, hand) in reference_hands() {
        group.bench_with_input(BenchmarkId::new("rule", name), &hand, |b, hand| {
            b.iter(|| black_box(classify(black_box(hand), &thresholds)));
        });
    }

    group.finish();
}

/// Benchmark distance extraction alone
fn bench_metrics(c: &mut Criterion) {
    let hands = reference_hands();
    c.bench_function("hand_metrics", |b| {
        b.iter(|| {
            for (_, hand) in &hands {
                black_box(HandMetrics::measure(black_box(hand)));
            }
        });
    });
}

/// Benchmark a stream of slightly moving hands, as seen frame to frame
fn bench_stream(c: &mut Criterion) {
    let thresholds = GestureThresholds::default();
    let frames: Vec<HandLandmarkSet> = (0..1000)
        .map(|i| {
            let t = i as f32 * 0.01;
            let points: Vec<Landmark> = (0..21)
                .map(|j| {
                    let phase = j as f32 * 0.3;
                    Landmark::new(0.5 + 0.3 * (t + phase).sin(), 0.5 + 0.3 * (t * 1.3 + phase).cos())
                })
                .collect();
            HandLandmarkSet::from_slice(&points).unwrap()
        })
        .collect();

    c.bench_function("classify_stream_1000", |b| {
        b.iter(|| {
            for hand in &frames {
                black_box(classify(hand, &thresholds));
            }
        });
    });
}

criterion_group!(benches, bench_classify, bench_metrics, bench_stream);
criterion_main!(benches);
