use crate::dsp::random::PseudoRandom;
use crate::dsp::tables::{table_index, wrap_phase, COS_TABLE, COS_TABLE_SIZE};

/*
Inharmonic Additive Oscillator
==============================

A bank of cosine partials whose frequencies drift away from exact integer
multiples of the fundamental, the way a stiff string does.

Vocabulary
----------

  partial     One cosine component. Partial 1 is the fundamental; index 0 of
              every table is left unused so indices read as harmonic numbers.

  B           Inharmonicity coefficient. B = 0 gives a plain sawtooth-like
              harmonic series (amplitude 1/n). Larger B stretches upper
              partials sharp.

  step        Phase increment per sample in cycles. A step of 0.5 is the
              Nyquist frequency.


Partial Placement
-----------------

For partial n:

    scale_n = n * sqrt(1 + B * n^2)
    step_n  = scale_n * f0          (f0 normalized: Hz / sample rate)
    amp_n   = 1 / scale_n

Partials are added from n = 1 upward until one would reach Nyquist, so the
bank never aliases regardless of pitch or B. The count is capped by the table
size.

    amp
     1 ┤█
       │█
       │█ █
       │█ █ █
       │█ █ █ █ █ ▄ ▄ ▂ ▂ ▂ _ _ _ ...     (stop at step >= 0.5)
       └┴─┴─┴─┴─┴─┴─┴─┴─┴─┴──────→ frequency
        1 2 3 4 ...  (spacing widens with B)


Phase
-----

Each partial keeps its own phase in [0, 1). Retriggering can either zero all
phases (sharp, repeatable attack) or scatter them with a per-partial LCG so
stacked voices do not phase-align into a click.
*/

/// Size of the partial tables. Index 0 is unused, so at most
/// `MAX_PARTIALS - 1` partials sound.
pub const MAX_PARTIALS: usize = 128;

/// Highest allowed partial step, in cycles per sample.
const NYQUIST_STEP: f64 = 0.5;

pub struct InharmonicOscillator {
    amplitude: [f64; MAX_PARTIALS],
    step: [f64; MAX_PARTIALS],
    phase: [f64; MAX_PARTIALS],
    random: [PseudoRandom; MAX_PARTIALS],
    // exclusive upper index of the active partials
    end: usize,
}

impl InharmonicOscillator {
    /// Build a silent oscillator. `seed` drives the per-partial phase
    /// generators, so equal seeds give equal random retriggers.
    pub fn new(seed: u32) -> Self {
        let mut spawner = PseudoRandom::new(seed);
        let random = std::array::from_fn(|_| {
            let high = spawner.next_u15();
            let low = spawner.next_u15();
            PseudoRandom::new((high << 16) | low)
        });

        Self {
            amplitude: [0.0; MAX_PARTIALS],
            step: [0.0; MAX_PARTIALS],
            phase: [0.0; MAX_PARTIALS],
            random,
            end: 1,
        }
    }

    /// Recompute the partial table for a normalized fundamental `f0`
    /// (Hz / sample rate) and inharmonicity `b`.
    ///
    /// A non-positive or non-finite `f0` leaves no partials. Negative `b` is
    /// treated as zero.
    pub fn set_freq(&mut self, f0: f64, b: f64) {
        self.end = 1;
        if !(f0 > 0.0 && f0.is_finite()) {
            return;
        }
        let b = b.max(0.0);

        let mut n = 1;
        while n < MAX_PARTIALS {
            let harmonic = n as f64;
            let scale = harmonic * (1.0 + b * harmonic * harmonic).sqrt();
            let step = scale * f0;
            if step >= NYQUIST_STEP {
                break;
            }
            self.amplitude[n] = 1.0 / scale;
            self.step[n] = step;
            n += 1;
        }
        self.end = n;
    }

    /// Render one sample. `osc_mod` scales every step (vibrato), nominally 1.
    #[inline]
    pub fn process(&mut self, osc_mod: f64) -> f64 {
        let table: &[f64; COS_TABLE_SIZE] = &COS_TABLE;
        let mut out = 0.0;
        for n in 1..self.end {
            out += self.amplitude[n] * table[table_index(self.phase[n])];
            self.phase[n] = wrap_phase(self.phase[n] + self.step[n] * osc_mod);
        }
        out
    }

    /// Scatter every partial's phase with its own generator.
    pub fn reset_random(&mut self) {
        for (phase, random) in self.phase.iter_mut().zip(self.random.iter_mut()).skip(1) {
            *phase = random.next_f64();
        }
    }

    /// Start every partial at phase zero.
    pub fn reset_zero(&mut self) {
        self.phase.fill(0.0);
    }

    /// Number of sounding partials.
    pub fn partial_count(&self) -> usize {
        self.end - 1
    }

    /// Step of partial `n` (1-based) in cycles per sample, if it is active.
    pub fn partial_step(&self, n: usize) -> Option<f64> {
        (1..self.end).contains(&n).then(|| self.step[n])
    }
}
