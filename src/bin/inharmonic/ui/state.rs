//! Per-block voice activity sent from the audio thread (Copy, allocation-free)

use inharmonic_dsp::{synth::Synth, MAX_VOICES};

#[derive(Clone, Copy, Debug, Default)]
pub struct VoiceSnapshot {
    /// Envelope level of each voice, 0.0 when idle
    pub levels: [f32; MAX_VOICES],
    /// MIDI pitch of each voice (meaningful only when its level is non-zero)
    pub pitches: [u8; MAX_VOICES],
    pub active: u8,
}

impl VoiceSnapshot {
    pub fn capture(synth: &Synth) -> Self {
        let mut snapshot = Self::default();
        for (i, voice) in synth.voices().iter().take(MAX_VOICES).enumerate() {
            if voice.is_free() {
                continue;
            }
            snapshot.levels[i] = voice.level() as f32;
            snapshot.pitches[i] = voice.pitch();
            snapshot.active += 1;
        }
        snapshot
    }
}
