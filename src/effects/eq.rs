use std::f64::consts::TAU;

use crate::effects::StereoEffect;

/*
Peaking EQ (RBJ cookbook)
=========================

    A     = 10^(gain_db / 40)
    w     = 2π·f / fs
    alpha = sin(w) / (2·max(Q, 1e-3))

    b0 = 1 + alpha·A      a0 = 1 + alpha/A
    b1 = -2·cos(w)        a1 = -2·cos(w)
    b2 = 1 - alpha·A      a2 = 1 - alpha/A

Everything is divided through by a0. Filtering uses transposed direct form II,
which keeps only two state values per channel:

    y  = b0·x + z1
    z1 = b1·x - a1·y + z2
    z2 = b2·x - a2·y
*/

const MIN_Q: f64 = 1e-3;
const MIN_FREQUENCY_HZ: f64 = 1.0;
const MAX_FREQUENCY_RATIO: f64 = 0.49;

/// Normalized biquad coefficients (a0 == 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefficients {
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub fn peaking(frequency_hz: f64, gain_db: f64, q: f64, sample_rate: f64) -> Self {
        let frequency = frequency_hz
            .max(MIN_FREQUENCY_HZ)
            .min(MAX_FREQUENCY_RATIO * sample_rate);
        let a = 10f64.powf(gain_db / 40.0);
        let w = TAU * frequency / sample_rate;
        let (sin_w, cos_w) = w.sin_cos();
        let alpha = sin_w / (2.0 * q.max(MIN_Q));

        let a0 = 1.0 + alpha / a;
        Self {
            b0: (1.0 + alpha * a) / a0,
            b1: (-2.0 * cos_w) / a0,
            b2: (1.0 - alpha * a) / a0,
            a1: (-2.0 * cos_w) / a0,
            a2: (1.0 - alpha / a) / a0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    z1: f64,
    z2: f64,
}

impl BiquadState {
    #[inline]
    fn process(&mut self, c: &BiquadCoefficients, x: f64) -> f64 {
        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;
        y
    }
}

/// Single-band peaking equalizer, same curve on both channels.
#[derive(Debug, Clone)]
pub struct BiquadEq {
    sample_rate: f64,
    frequency_hz: f64,
    gain_db: f64,
    q: f64,
    coefficients: BiquadCoefficients,
    left: BiquadState,
    right: BiquadState,
}

impl BiquadEq {
    pub fn new(sample_rate: f64) -> Self {
        let mut eq = Self {
            sample_rate,
            frequency_hz: 1000.0,
            gain_db: 0.0,
            q: 1.0,
            coefficients: BiquadCoefficients::IDENTITY,
            left: BiquadState::default(),
            right: BiquadState::default(),
        };
        eq.update();
        eq
    }

    pub fn set_frequency(&mut self, frequency_hz: f64) {
        self.frequency_hz = frequency_hz;
        self.update();
    }

    pub fn set_gain_db(&mut self, gain_db: f64) {
        self.gain_db = gain_db;
        self.update();
    }

    pub fn set_q(&mut self, q: f64) {
        self.q = q;
        self.update();
    }

    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coefficients
    }

    fn update(&mut self) {
        self.coefficients =
            BiquadCoefficients::peaking(self.frequency_hz, self.gain_db, self.q, self.sample_rate);
    }
}

impl StereoEffect for BiquadEq {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.update();
        self.reset();
    }

    #[inline]
    fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        (
            self.left.process(&self.coefficients, left),
            self.right.process(&self.coefficients, right),
        )
    }

    fn reset(&mut self) {
        self.left = BiquadState::default();
        self.right = BiquadState::default();
    }
}
