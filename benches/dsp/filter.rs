//! Benchmarks for the cascaded state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use inharmonic_dsp::dsp::filter::{FilterMode, StateVariableFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // sawtooth-like ramp
        let input: Vec<f64> = (0..size)
            .map(|i| (i as f64 / size as f64) * 2.0 - 1.0)
            .collect();

        for index in [0, 1, 5] {
            let mode = FilterMode::from_index(index);
            let label = format!(
                "{:?}{}",
                mode.response,
                if mode.cascade { "_cascade" } else { "" }
            );
            let mut filter = StateVariableFilter::new(1000.0, SAMPLE_RATE, 0.7);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for &x in &input {
                        sum += filter.process(black_box(x), mode);
                    }
                    black_box(sum)
                })
            });
        }

        // per-sample coefficient updates, as under filter envelope modulation
        let mut filter = StateVariableFilter::new(1000.0, SAMPLE_RATE, 0.7);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for (i, &x) in input.iter().enumerate() {
                    filter.set_freq(500.0 + i as f64, SAMPLE_RATE, 0.7);
                    sum += filter.process(black_box(x), FilterMode::LOW_PASS);
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
