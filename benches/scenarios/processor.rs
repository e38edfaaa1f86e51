//! Benchmarks for the block processor: pool plus effects chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use inharmonic_dsp::{engine::NoteEvent, ParamId, ParameterChange, Processor};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/processor");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // chord held through the default effects
        let mut processor = Processor::new(SAMPLE_RATE);
        let chord: Vec<NoteEvent> = [48, 55, 60, 64, 67]
            .iter()
            .map(|&p| NoteEvent::note_on(0, p, 0.8))
            .collect();
        processor.process_32(&[], &chord, &mut left, &mut right);
        group.bench_with_input(BenchmarkId::new("chord", size), &size, |b, _| {
            b.iter(|| {
                processor.process_32(&[], &[], black_box(&mut left), black_box(&mut right));
            })
        });

        // busy block: parameter automation and note traffic every block
        let mut processor = Processor::new(SAMPLE_RATE);
        let changes = [
            ParameterChange::new(ParamId::FiltCutoff, 0.6),
            ParameterChange::new(ParamId::ReverbMix, 0.3),
        ];
        let events = [
            NoteEvent::note_on(0, 60, 0.9),
            NoteEvent::note_off(size / 2, 60),
        ];
        group.bench_with_input(BenchmarkId::new("automated", size), &size, |b, _| {
            b.iter(|| {
                processor.process_32(
                    black_box(&changes),
                    black_box(&events),
                    &mut left,
                    &mut right,
                );
            })
        });
    }

    group.finish();
}
