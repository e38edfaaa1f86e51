use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| mode | response  | stages | slope      |
| ---- | --------- | ------ | ---------- |
| 0    | low-pass  | 1      | 12 dB/oct  |
| 1    | high-pass | 1      | 12 dB/oct  |
| 2    | band-pass | 1      | 6 dB/oct   |
| 3    | low-pass  | 2      | 24 dB/oct  |
| 4    | high-pass | 2      | 24 dB/oct  |
| 5    | band-pass | 2      | 12 dB/oct  |

Each stage is a Chamberlin-style state-variable filter in the improved
(trapezoidal) form: two integrators, a shared resonance path, and all three
responses available from one update. Cascading feeds the selected response of
stage one into an identical stage two.

    k    = 2·sin(π·fc/fs)
    oqk  = 1/Q + k
    hp   = (x − oqk·s1 − s2) / (1 + k·oqk)
    bp   = k·hp + s1         s1 ← k·hp + bp
    lp   = k·bp + s2         s2 ← k·bp + lp
*/

const MIN_CUTOFF_HZ: f64 = 20.0;
const MAX_CUTOFF_RATIO: f64 = 0.9;
const MIN_Q: f64 = 1e-3;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

/// Response plus stage count.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterMode {
    pub response: FilterType,
    pub cascade: bool,
}

impl FilterMode {
    pub const LOW_PASS: Self = Self {
        response: FilterType::LowPass,
        cascade: false,
    };

    /// Mode from the 0..=5 selector; larger values saturate.
    pub fn from_index(index: usize) -> Self {
        let index = index.min(5);
        let response = match index % 3 {
            0 => FilterType::LowPass,
            1 => FilterType::HighPass,
            _ => FilterType::BandPass,
        };
        Self {
            response,
            cascade: index >= 3,
        }
    }

    pub fn index(&self) -> usize {
        let response = match self.response {
            FilterType::LowPass => 0,
            FilterType::HighPass => 1,
            FilterType::BandPass => 2,
        };
        response + if self.cascade { 3 } else { 0 }
    }
}

impl Default for FilterMode {
    fn default() -> Self {
        Self::LOW_PASS
    }
}

struct StageOutputs {
    lowpass: f64,
    highpass: f64,
    bandpass: f64,
}

impl StageOutputs {
    #[inline]
    fn select(&self, response: FilterType) -> f64 {
        match response {
            FilterType::LowPass => self.lowpass,
            FilterType::HighPass => self.highpass,
            FilterType::BandPass => self.bandpass,
        }
    }
}

pub struct StateVariableFilter {
    // stage one integrators
    s1: f64,
    s2: f64,
    // stage two integrators
    s3: f64,
    s4: f64,

    k: f64,
    oqk: f64,
    inv_denom: f64,
    cutoff_hz: f64,
    q: f64,
}

impl StateVariableFilter {
    pub fn new(cutoff_hz: f64, sample_rate: f64, q: f64) -> Self {
        let mut filter = Self {
            s1: 0.0,
            s2: 0.0,
            s3: 0.0,
            s4: 0.0,
            k: 0.0,
            oqk: 0.0,
            inv_denom: 1.0,
            cutoff_hz,
            q,
        };
        filter.set_freq(cutoff_hz, sample_rate, q);
        filter
    }

    /// Recompute coefficients. Cutoff is clamped to `[20 Hz, 0.9·fs/2]`
    /// and Q floored at 1e-3.
    pub fn set_freq(&mut self, cutoff_hz: f64, sample_rate: f64, q: f64) {
        let cutoff = cutoff_hz
            .max(MIN_CUTOFF_HZ)
            .min(MAX_CUTOFF_RATIO * 0.5 * sample_rate);
        let q = q.max(MIN_Q);

        self.k = 2.0 * (PI * cutoff / sample_rate).sin();
        self.oqk = 1.0 / q + self.k;
        self.inv_denom = 1.0 / (1.0 + self.k * self.oqk);
        self.cutoff_hz = cutoff;
        self.q = q;
    }

    #[inline]
    fn stage(&self, x: f64, a: &mut f64, b: &mut f64) -> StageOutputs {
        let highpass = (x - self.oqk * *a - *b) * self.inv_denom;
        let u = highpass * self.k;
        let bandpass = u + *a;
        *a = u + bandpass;
        let u = bandpass * self.k;
        let lowpass = u + *b;
        *b = u + lowpass;
        StageOutputs {
            lowpass,
            highpass,
            bandpass,
        }
    }

    #[inline]
    pub fn process(&mut self, x: f64, mode: FilterMode) -> f64 {
        let (mut s1, mut s2) = (self.s1, self.s2);
        let first = self.stage(x, &mut s1, &mut s2).select(mode.response);
        self.s1 = s1;
        self.s2 = s2;
        if !mode.cascade {
            return first;
        }

        let (mut s3, mut s4) = (self.s3, self.s4);
        let second = self.stage(first, &mut s3, &mut s4).select(mode.response);
        self.s3 = s3;
        self.s4 = s4;
        second
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
        self.s3 = 0.0;
        self.s4 = 0.0;
    }

    /// Effective cutoff after clamping.
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Effective Q after flooring.
    pub fn q(&self) -> f64 {
        self.q
    }

    /// Frequency coefficient `2·sin(π·fc/fs)`.
    pub fn coefficient(&self) -> f64 {
        self.k
    }
}
