//! Reverb - Room Simulation via a Feedback Delay Network
//!
//! Four delay lines are connected in a ring. Every line feeds the next one
//! through a pair of all-pass diffusers, and the input enters before the first
//! line's diffusers.
//!
//! ```text
//!            ┌──────────────────────────────────────────────────────┐
//!            ↓                                                      │
//! in ──→ (+) → [AP 523 → AP 1259] → line 1637 ─┐                    │
//!   ┌──────────────────────────────────────────┘                    │
//!   └──→ [AP 233 → AP 1459] → line 2693 ─┐                          │
//!   ┌────────────────────────────────────┘                          │
//!   └──→ [AP 631 → AP 1103] → line 5813 ─┐                          │
//!   ┌────────────────────────────────────┘                          │
//!   └──→ [AP 131 →  AP 797] → line 6871 ──→ × attenuation ──────────┘
//! ```
//!
//! Every line output is multiplied by the same attenuation before it is fed
//! on, so one trip round the ring is attenuated four times.
//!
//! ## All-pass Diffusers
//!
//! Each diffuser is a Schroeder all-pass with coefficient 0.5:
//!
//! ```text
//! w[n] = x[n] - 0.5 * w[n - N]
//! y[n] = w[n - N] + 0.5 * w[n]
//! ```
//!
//! They smear each echo into a dense cloud without colouring the spectrum.
//!
//! ## Decay Time
//!
//! A ring trip takes `L = Σ lines + Σ diffusers = 23150` samples on average and
//! passes four attenuations. For the energy to fall 60 dB after `T60` seconds:
//!
//! ```text
//! attenuation^(4 · T60 · fs / L) = 10^-3
//! attenuation = 10^(-3 · L / (4 · T60 · fs))
//! ```
//!
//! ## Output
//!
//! Left and right take near and far taps from all four lines in mirrored
//! proportions, so the stereo outputs are decorrelated.

use crate::dsp::delay::DelayLine;
use crate::effects::{blend, StereoEffect};

const LINE_LENGTHS: [usize; 4] = [1637, 2693, 5813, 6871];
const DIFFUSER_LENGTHS: [[usize; 2]; 4] = [[523, 1259], [233, 1459], [631, 1103], [131, 797]];
const DIFFUSION: f64 = 0.5;
/// Offset of the far output taps, in samples.
const FAR_TAP: usize = 34;
const MIN_T60_SECONDS: f64 = 1e-3;

/// Samples in one trip round the ring.
pub const LOOP_LENGTH: usize = {
    let mut total = 0;
    let mut i = 0;
    while i < 4 {
        total += LINE_LENGTHS[i] + DIFFUSER_LENGTHS[i][0] + DIFFUSER_LENGTHS[i][1];
        i += 1;
    }
    total
};

/// Feedback attenuation per line for a target decay time.
pub fn attenuation_for(t60_seconds: f64, sample_rate: f64) -> f64 {
    let t60 = t60_seconds.max(MIN_T60_SECONDS);
    10f64.powf(-3.0 * LOOP_LENGTH as f64 / (4.0 * t60 * sample_rate))
}

#[inline]
fn flush_denormal(x: f64) -> f64 {
    if x.is_normal() {
        x
    } else {
        0.0
    }
}

/// Schroeder all-pass built on a delay line (pre-allocated, RT-safe).
struct Diffuser {
    line: DelayLine,
}

impl Diffuser {
    fn new(len: usize) -> Self {
        Self {
            line: DelayLine::new(len),
        }
    }

    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        let delayed = self.line.tail();
        let w = input - DIFFUSION * delayed;
        self.line.push(w);
        delayed + DIFFUSION * w
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}

pub struct Reverb {
    sample_rate: f64,
    t60: f64,
    mix: f64,
    attenuation: f64,
    lines: [DelayLine; 4],
    diffusers: [[Diffuser; 2]; 4],
}

impl Reverb {
    pub fn new(sample_rate: f64) -> Self {
        let lines = LINE_LENGTHS.map(DelayLine::new);
        let diffusers = DIFFUSER_LENGTHS.map(|pair| pair.map(Diffuser::new));
        let mut reverb = Self {
            sample_rate,
            t60: 1.0,
            mix: 0.0,
            attenuation: 0.0,
            lines,
            diffusers,
        };
        reverb.update();
        reverb
    }

    /// Target decay time in seconds, floored at 1 ms.
    pub fn set_time(&mut self, t60_seconds: f64) {
        self.t60 = t60_seconds.max(MIN_T60_SECONDS);
        self.update();
    }

    pub fn set_mix(&mut self, mix: f64) {
        self.mix = mix.max(0.0).min(1.0);
    }

    pub fn time(&self) -> f64 {
        self.t60
    }

    pub fn mix(&self) -> f64 {
        self.mix
    }

    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }

    fn update(&mut self) {
        self.attenuation = attenuation_for(self.t60, self.sample_rate);
    }
}

impl StereoEffect for Reverb {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.update();
        self.reset();
    }

    #[inline]
    fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        let input = 0.5 * (left + right);
        let attenuation = self.attenuation;
        let feedback = self.lines.each_ref().map(|line| line.tail() * attenuation);

        // ring: each line is fed by the previous one, line 1 also takes the input
        let feeds = [feedback[3] + input, feedback[0], feedback[1], feedback[2]];
        let mut diffused = [0.0; 4];
        for ((out, feed), pair) in diffused.iter_mut().zip(feeds).zip(self.diffusers.iter_mut()) {
            let first = pair[0].process(feed);
            *out = pair[1].process(first);
        }

        let [l1, l2, l3, l4] = &self.lines;
        let half = FAR_TAP / 2;
        let wet_left = 0.7 * l1.read(0)
            + 0.3 * l1.read(half)
            + 0.8 * l2.read(0)
            + 0.2 * l2.read(FAR_TAP)
            + l3.read(0)
            + l4.read(FAR_TAP);
        let wet_right = 0.3 * l1.read(0)
            + 0.7 * l1.read(half)
            + 0.2 * l2.read(0)
            + 0.8 * l2.read(FAR_TAP)
            + l3.read(FAR_TAP)
            + l4.read(0);

        for (line, value) in self.lines.iter_mut().zip(diffused) {
            line.push(flush_denormal(value));
        }

        (
            blend(left, wet_left, self.mix),
            blend(right, wet_right, self.mix),
        )
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.reset();
        }
        for diffuser in self.diffusers.iter_mut().flatten() {
            diffuser.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48_000.0;

    fn impulse_energy(reverb: &mut Reverb, samples: usize) -> Vec<f64> {
        (0..samples)
            .map(|i| {
                let x = if i == 0 { 1.0 } else { 0.0 };
                let (l, r) = reverb.process(x, x);
                l * l + r * r
            })
            .collect()
    }

    /// First index where the backward-integrated energy falls below `db`.
    fn crossing(edc_db: &[f64], db: f64) -> Option<usize> {
        edc_db.iter().position(|&level| level <= db)
    }

    #[test]
    fn test_loop_length() {
        assert_eq!(LOOP_LENGTH, 17_014 + 6_136);
    }

    #[test]
    fn test_diffuser_is_allpass() {
        let mut diffuser = Diffuser::new(7);
        let mut energy = 0.0;
        for i in 0..2000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let y = diffuser.process(x);
            energy += y * y;
        }
        assert!((energy - 1.0).abs() < 1e-9, "all-pass energy {}", energy);
    }

    #[test]
    fn test_measured_decay_matches_t60() {
        let t60 = 2.0;
        let mut reverb = Reverb::new(SAMPLE_RATE);
        reverb.set_time(t60);
        reverb.set_mix(1.0);

        let energy = impulse_energy(&mut reverb, 400_000);

        // Schroeder backward integration
        let mut edc = vec![0.0; energy.len()];
        let mut acc = 0.0;
        for (slot, e) in edc.iter_mut().zip(energy.iter()).rev() {
            acc += e;
            *slot = acc;
        }
        let total = edc[0];
        let edc_db: Vec<f64> = edc.iter().map(|e| 10.0 * (e / total).log10()).collect();

        let start = crossing(&edc_db, -5.0).unwrap_or(0);
        let end = crossing(&edc_db, -45.0).unwrap_or(energy.len());
        let measured = (end - start) as f64 * (60.0 / 40.0) / SAMPLE_RATE;

        assert!(
            (measured - t60).abs() < 0.2 * t60,
            "measured T60 {:.3}s, configured {:.3}s",
            measured,
            t60
        );
    }

    #[test]
    fn test_longer_time_means_weaker_attenuation() {
        let short = attenuation_for(0.5, SAMPLE_RATE);
        let long = attenuation_for(5.0, SAMPLE_RATE);
        assert!(short < long && long < 1.0);
        assert_eq!(
            attenuation_for(0.0, SAMPLE_RATE),
            attenuation_for(MIN_T60_SECONDS, SAMPLE_RATE)
        );
    }

    #[test]
    fn test_dry_reverb_passes_input() {
        let mut reverb = Reverb::new(SAMPLE_RATE);
        reverb.set_mix(0.0);
        for i in 0..100 {
            let x = i as f64 * 0.01;
            assert_eq!(reverb.process(x, -x), (x, -x));
        }
    }

    #[test]
    fn test_reverb_stability() {
        let mut reverb = Reverb::new(SAMPLE_RATE);
        reverb.set_time(20.0);
        reverb.set_mix(1.0);
        for i in 0..100_000 {
            let x = if i % 1000 == 0 { 1.0 } else { 0.0 };
            let (l, r) = reverb.process(x, x);
            assert!(l.is_finite() && r.is_finite(), "reverb output should be finite");
            assert!(l.abs() < 100.0, "reverb output unstable: {}", l);
        }
    }

    #[test]
    fn test_channels_are_decorrelated() {
        let mut reverb = Reverb::new(SAMPLE_RATE);
        reverb.set_mix(1.0);
        reverb.set_time(1.0);
        let mut difference = 0.0;
        for i in 0..20_000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let (l, r) = reverb.process(x, x);
            difference += (l - r).abs();
        }
        assert!(difference > 0.01);
    }
}
