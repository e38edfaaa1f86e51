//! Benchmarks for the inharmonic partial bank.
//!
//! Cost scales with the partial count, so low notes are the expensive case.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use inharmonic_dsp::dsp::oscillator::InharmonicOscillator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    // (label, fundamental in Hz, inharmonicity)
    let cases = [
        ("a1_harmonic", 55.0, 0.0),
        ("a1_stretched", 55.0, 0.01),
        ("a4_harmonic", 440.0, 0.0),
        ("a6_bell", 1760.0, 0.3),
    ];

    for &size in BLOCK_SIZES {
        for &(label, freq, b) in &cases {
            let mut osc = InharmonicOscillator::new(1);
            osc.set_freq(freq / SAMPLE_RATE, b);
            osc.reset_random();
            group.bench_with_input(BenchmarkId::new(label, size), &size, |bench, &n| {
                bench.iter(|| {
                    let mut sum = 0.0;
                    for _ in 0..n {
                        sum += osc.process(black_box(1.0));
                    }
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}
