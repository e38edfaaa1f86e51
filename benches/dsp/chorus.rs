//! Benchmarks for the modulated dual-tap chorus.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use inharmonic_dsp::effects::{chorus::Chorus, StereoEffect};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_chorus(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/chorus");

    for &size in BLOCK_SIZES {
        let input: Vec<f64> = (0..size).map(|i| (i as f64 * 0.03).sin()).collect();

        let mut chorus = Chorus::new(SAMPLE_RATE);
        chorus.set_delay_ms(8.0);
        chorus.set_speed(1.5);
        chorus.set_depth(0.5);
        chorus.set_mix(0.5);
        group.bench_with_input(BenchmarkId::new("stereo", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for &x in &input {
                    let (l, r) = chorus.process(black_box(x), black_box(x));
                    sum += l + r;
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
