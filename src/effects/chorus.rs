use crate::dsp::{delay::DelayLine, lfo::TriangleLfo};
use crate::effects::{blend, StereoEffect};

/*
Chorus Effect
=============

Chorus thickens a sound by mixing the dry signal with delayed copies whose
delay time is slowly modulated. The moving delay detunes the copies slightly,
so one voice sounds like several playing together.

How It Works
------------

Two triangle LFOs run at `speed` and `speed · 11/12`. The uneven ratio keeps
the combined modulation from repeating every LFO cycle. Each channel reads two
taps from its own delay line:

    d       = delay_ms · fs / 1000
    left_n  = d · (1.1 + 0.9 · lfo_n · depth)
    right_n = d · (1.1 - 0.9 · lfo_n · depth)

    wet     = 0.7 · tap_1 + 0.3 · tap_2
            = tap_1 + 0.3 · (tap_2 - tap_1)

The second form is the one computed. Equal taps then return tap_1 exactly.

Left and right move in opposite directions, which widens the image. With
depth 0 both taps sit at exactly 1.1·d and the chorus reduces to a plain
fractional delay.

Parameters
----------

Delay (0.5 - 20 ms):
  Centre delay. Too short: comb filtering. Too long: slapback echo.

Speed (0.03 - 20 Hz):
  LFO rate. Slow values shimmer, fast values warble.

Depth (0.0 - 1.0):
  Fraction of the maximum ±90% delay swing.

Mix (0.0 - 1.0):
  Dry/wet blend.
*/

const MAX_DELAY_SECONDS: f64 = 1.0;

pub struct Chorus {
    sample_rate: f64,
    delay_ms: f64,
    speed_hz: f64,
    depth: f64,
    mix: f64,
    delay_samples: f64,
    lfo1: TriangleLfo,
    lfo2: TriangleLfo,
    left: DelayLine,
    right: DelayLine,
}

impl Chorus {
    pub fn new(sample_rate: f64) -> Self {
        let capacity = Self::capacity(sample_rate);
        let mut chorus = Self {
            sample_rate,
            delay_ms: 8.0,
            speed_hz: 1.0,
            depth: 1.0,
            mix: 0.0,
            delay_samples: 0.0,
            lfo1: TriangleLfo::new(),
            lfo2: TriangleLfo::new(),
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
        };
        chorus.update_modulation();
        chorus
    }

    fn capacity(sample_rate: f64) -> usize {
        (sample_rate * MAX_DELAY_SECONDS).ceil().max(1.0) as usize
    }

    /// Centre delay in milliseconds. Restarts the LFOs.
    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms.max(0.0);
        self.update_modulation();
    }

    /// LFO rate in Hz. Restarts the LFOs.
    pub fn set_speed(&mut self, speed_hz: f64) {
        self.speed_hz = speed_hz.max(0.0);
        self.update_modulation();
    }

    pub fn set_depth(&mut self, depth: f64) {
        self.depth = depth.max(0.0).min(1.0);
    }

    pub fn set_mix(&mut self, mix: f64) {
        self.mix = mix.max(0.0).min(1.0);
    }

    /// Centre delay in samples.
    pub fn delay_samples(&self) -> f64 {
        self.delay_samples
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn mix(&self) -> f64 {
        self.mix
    }

    fn update_modulation(&mut self) {
        self.delay_samples = self.delay_ms * self.sample_rate * 1e-3;
        self.lfo1.set_rate(self.speed_hz, self.sample_rate);
        self.lfo2.set_rate(self.speed_hz * 11.0 / 12.0, self.sample_rate);
        self.lfo1.reset();
        self.lfo2.reset();
    }
}

/// Two-tap blend written so identical taps return the tap unchanged.
#[inline]
fn taps(line: &DelayLine, first: f64, second: f64) -> f64 {
    let a = line.read_interpolated(first);
    let b = line.read_interpolated(second);
    a + 0.3 * (b - a)
}

impl StereoEffect for Chorus {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        let capacity = Self::capacity(sample_rate);
        self.left.resize(capacity);
        self.right.resize(capacity);
        self.update_modulation();
    }

    #[inline]
    fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        let mod1 = self.lfo1.process() * self.depth;
        let mod2 = self.lfo2.process() * self.depth;
        let d = self.delay_samples;

        self.left.push(left);
        self.right.push(right);

        let wet_left = taps(&self.left, d * (1.1 + 0.9 * mod1), d * (1.1 + 0.9 * mod2));
        let wet_right = taps(&self.right, d * (1.1 - 0.9 * mod1), d * (1.1 - 0.9 * mod2));

        (
            blend(left, wet_left, self.mix),
            blend(right, wet_right, self.mix),
        )
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.lfo1.reset();
        self.lfo2.reset();
    }
}
