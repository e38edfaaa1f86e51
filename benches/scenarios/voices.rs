//! Benchmarks for single voices and a fully loaded pool.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use inharmonic_dsp::{
    synth::{Synth, Voice},
    MAX_VOICES,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        // === STATIC FILTER ===
        // baseline: no cutoff modulation, coefficients fixed per note
        let mut plain = Voice::new(SAMPLE_RATE, 0);
        plain.set_filter_env_amount(0.0);
        plain.set_filter_key_follow(0.0);
        plain.note_on(45, 1.0, true);
        group.bench_with_input(BenchmarkId::new("voice_static", size), &size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0;
                for _ in 0..n {
                    sum += plain.process();
                }
                black_box(sum)
            })
        });

        // === MODULATED ===
        // filter envelope + key follow + vibrato: per-sample coefficient updates
        let mut modulated = Voice::new(SAMPLE_RATE, 0);
        modulated.set_filter_env_amount(4.0);
        modulated.set_filter_key_follow(1.0);
        modulated.set_vibrato_depth(20.0);
        modulated.set_vibrato_speed(5.0);
        modulated.note_on(45, 1.0, true);
        group.bench_with_input(BenchmarkId::new("voice_modulated", size), &size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0;
                for _ in 0..n {
                    sum += modulated.process();
                }
                black_box(sum)
            })
        });

        // === FULL POOL ===
        // every voice sounding, a chord spread over the low register
        let mut synth = Synth::new(SAMPLE_RATE);
        for i in 0..MAX_VOICES {
            synth.note_on(0, 36 + 3 * i as i32, 0.8);
        }
        group.bench_with_input(BenchmarkId::new("pool_16", size), &size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0;
                for _ in 0..n {
                    sum += synth.process_64().0;
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
