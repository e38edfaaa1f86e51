//! Benchmarks for the feedback delay network reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use inharmonic_dsp::effects::{reverb::Reverb, StereoEffect};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let input: Vec<f64> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f64 / 10.0) // Initial impulse
                } else {
                    (i as f64 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        for (label, t60) in [("short", 0.5), ("hall", 8.0)] {
            let mut reverb = Reverb::new(SAMPLE_RATE);
            reverb.set_time(t60);
            reverb.set_mix(0.3);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for &x in &input {
                        let (l, r) = reverb.process(black_box(x), black_box(x));
                        sum += l + r;
                    }
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}
