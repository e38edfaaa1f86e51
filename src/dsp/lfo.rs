//! Low Frequency Oscillators.

/*
Two control-rate oscillators live here.

VIBRATO
    A cosine LFO with a delayed onset, restarted on every note. The delay
    counter starts at 1.0 and is drained by `delay_step` per sample while the
    output stays at zero. The phase then starts at 0.25, where the cosine
    crosses zero going negative, so vibrato fades in without a pitch jump.

        out
         1 ┤            ╭╮    ╭╮
         0 ┼────────────╯╰╮  ╭╯╰╮  ...
        -1 ┤              ╰──╯
           └── delay ──┘

TRIANGLE
    Free-running bipolar triangle in [-1, 1] for the chorus. Starts at -1
    after a reset.

        phase:  0 ──── 0.5 ──── 1
        out:   -1 ──── +1 ──── -1
*/

use crate::dsp::tables::{cos_2pi, wrap_phase};

#[derive(Debug, Clone)]
pub struct VibratoLfo {
    delay: f64,
    phase: f64,
}

impl VibratoLfo {
    pub fn new() -> Self {
        Self {
            delay: 1.0,
            phase: 0.25,
        }
    }

    /// Restart the onset delay and the phase.
    pub fn note_on(&mut self) {
        self.delay = 1.0;
        self.phase = 0.25;
    }

    /// `delay_step` drains the onset counter; `freq_step` is cycles/sample.
    #[inline]
    pub fn process(&mut self, delay_step: f64, freq_step: f64) -> f64 {
        if self.delay > 0.0 {
            self.delay -= delay_step;
            return 0.0;
        }
        let out = cos_2pi(self.phase);
        self.phase = wrap_phase(self.phase + freq_step);
        out
    }
}

impl Default for VibratoLfo {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct TriangleLfo {
    phase: f64,
    step: f64,
}

impl TriangleLfo {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            step: 0.0,
        }
    }

    pub fn set_rate(&mut self, frequency_hz: f64, sample_rate: f64) {
        self.step = (frequency_hz / sample_rate).max(0.0);
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn process(&mut self) -> f64 {
        self.phase += self.step;
        if self.phase >= 1.0 {
            self.phase = wrap_phase(self.phase);
        }
        let folded = if self.phase > 0.5 {
            1.0 - self.phase
        } else {
            self.phase
        };
        4.0 * folded - 1.0
    }
}

impl Default for TriangleLfo {
    fn default() -> Self {
        Self::new()
    }
}
