//! Benchmarks for the ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use inharmonic_dsp::dsp::envelope::{EnvelopeGenerator, EnvelopeTimes};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn run(env: &mut EnvelopeGenerator, n: usize) -> f64 {
    let mut sum = 0.0;
    for _ in 0..n {
        sum += env.next_sample().unwrap_or(0.0);
    }
    sum
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        // Attack phase (ramping up)
        let slow = EnvelopeTimes {
            attack_ms: 60_000.0,
            ..EnvelopeTimes::default()
        };
        let mut env = EnvelopeGenerator::new(&slow, SAMPLE_RATE);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, &n| {
            b.iter(|| black_box(run(&mut env, n)))
        });

        // Sustain phase (holding steady)
        let fast = EnvelopeTimes {
            attack_ms: 1.0,
            decay_ms: 1.0,
            ..EnvelopeTimes::default()
        };
        let mut env = EnvelopeGenerator::new(&fast, SAMPLE_RATE);
        env.note_on();
        run(&mut env, 500);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, &n| {
            b.iter(|| black_box(run(&mut env, n)))
        });

        // Release phase (ramping down)
        let long_release = EnvelopeTimes {
            attack_ms: 1.0,
            decay_ms: 1.0,
            release_ms: 60_000.0,
            ..EnvelopeTimes::default()
        };
        let mut env = EnvelopeGenerator::new(&long_release, SAMPLE_RATE);
        env.note_on();
        run(&mut env, 500);
        env.note_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, &n| {
            b.iter(|| black_box(run(&mut env, n)))
        });
    }

    group.finish();
}
