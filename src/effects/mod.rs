// Purpose: stereo post-processing applied to the summed synth output
// Fixed order: divider -> eq -> chorus -> reverb

pub mod chorus;
pub mod divider;
pub mod eq;
pub mod reverb;

use self::{chorus::Chorus, divider::SampleDivider, eq::BiquadEq, reverb::Reverb};

/// A per-sample stereo processor.
///
/// `set_sample_rate` may allocate and always flushes internal state; it is
/// only called between blocks.
pub trait StereoEffect {
    fn set_sample_rate(&mut self, sample_rate: f64);
    fn process(&mut self, left: f64, right: f64) -> (f64, f64);
    fn reset(&mut self);
}

/// Crossfade used by every wet/dry control. `mix == 1.0` returns `wet`
/// exactly.
#[inline]
pub(crate) fn blend(dry: f64, wet: f64, mix: f64) -> f64 {
    dry * (1.0 - mix) + wet * mix
}

pub struct EffectsChain {
    divider: SampleDivider,
    eq: BiquadEq,
    chorus: Chorus,
    reverb: Reverb,
}

impl EffectsChain {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            divider: SampleDivider::new(),
            eq: BiquadEq::new(sample_rate),
            chorus: Chorus::new(sample_rate),
            reverb: Reverb::new(sample_rate),
        }
    }

    pub fn divider(&self) -> &SampleDivider {
        &self.divider
    }

    pub fn divider_mut(&mut self) -> &mut SampleDivider {
        &mut self.divider
    }

    pub fn eq(&self) -> &BiquadEq {
        &self.eq
    }

    pub fn eq_mut(&mut self) -> &mut BiquadEq {
        &mut self.eq
    }

    pub fn chorus(&self) -> &Chorus {
        &self.chorus
    }

    pub fn chorus_mut(&mut self) -> &mut Chorus {
        &mut self.chorus
    }

    pub fn reverb(&self) -> &Reverb {
        &self.reverb
    }

    pub fn reverb_mut(&mut self) -> &mut Reverb {
        &mut self.reverb
    }
}

impl StereoEffect for EffectsChain {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.divider.set_sample_rate(sample_rate);
        self.eq.set_sample_rate(sample_rate);
        self.chorus.set_sample_rate(sample_rate);
        self.reverb.set_sample_rate(sample_rate);
    }

    #[inline]
    fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        let (left, right) = self.divider.process(left, right);
        let (left, right) = self.eq.process(left, right);
        let (left, right) = self.chorus.process(left, right);
        self.reverb.process(left, right)
    }

    fn reset(&mut self) {
        self.divider.reset();
        self.eq.reset();
        self.chorus.reset();
        self.reverb.reset();
    }
}
