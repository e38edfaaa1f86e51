use crate::{
    dsp::{envelope::EnvelopeTimes, filter::FilterMode},
    synth::voice::{Voice, VoiceState},
    DEFAULT_SAMPLE_RATE, MAX_VOICES,
};

/// Pitch-wheel range in semitones.
pub const PITCH_BEND_RANGE: f64 = 2.0;

/// Fixed pool of voices with the shared control state.
///
/// Allocation takes the first idle voice, otherwise the first releasing one.
/// Voices in attack, decay or sustain are never stolen, so a note-on that
/// finds the pool full of held notes is dropped.
pub struct Synth {
    voices: Vec<Voice>,
    sample_rate: f64,
    amp_times: EnvelopeTimes,
    filter_times: EnvelopeTimes,

    out_volume: f64,
    midi_volume: f64,
    expression: f64,
    pitch_bend: f64,
    mod_wheel: f64,
    soft_pedal: f64,
    sustain_pedal: bool,
    sostenuto_pedal: bool,
    random_phase: bool,
}

impl Synth {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_voices(sample_rate, MAX_VOICES)
    }

    pub fn with_voices(sample_rate: f64, voice_count: usize) -> Self {
        let voices = (0..voice_count)
            .map(|i| Voice::new(sample_rate, i as u32))
            .collect();
        Self {
            voices,
            sample_rate,
            amp_times: EnvelopeTimes::default(),
            filter_times: EnvelopeTimes::default(),
            out_volume: 0.125,
            midi_volume: 1.0,
            expression: 1.0,
            pitch_bend: 0.0,
            mod_wheel: 0.0,
            soft_pedal: 0.0,
            sustain_pedal: false,
            sostenuto_pedal: false,
            random_phase: false,
        }
    }

    /// Start a note and return the index of the voice that plays it.
    ///
    /// Channel is accepted for interface symmetry; the synth is single-timbral.
    pub fn note_on(&mut self, _channel: u8, pitch: i32, velocity: f64) -> Option<usize> {
        let idx = self.allocate_voice()?;
        self.voices[idx].note_on(pitch, velocity, self.random_phase);
        Some(idx)
    }

    /// Release every voice sounding `pitch`, or latch it while a pedal holds it.
    pub fn note_off(&mut self, _channel: u8, pitch: i32, _velocity: f64) {
        let pitch = pitch.clamp(0, 127) as u8;
        let sustain = self.sustain_pedal;
        for voice in &mut self.voices {
            if voice.pitch() != pitch || voice.state() != VoiceState::Active {
                continue;
            }
            voice.key_held = false;
            if sustain || voice.sostenuto_latched {
                voice.release_pending = true;
            } else {
                voice.note_off();
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.note_off();
            voice.key_held = false;
            voice.sostenuto_latched = false;
        }
    }

    fn allocate_voice(&self) -> Option<usize> {
        self.voices.iter().position(Voice::is_free).or_else(|| {
            self.voices
                .iter()
                .position(|v| v.state() == VoiceState::Releasing)
        })
    }

    #[inline]
    fn gain(&self) -> f64 {
        self.out_volume * self.midi_volume * self.expression
    }

    /// Mono sum of all voices, written to both channels.
    #[inline]
    pub fn process_64(&mut self) -> (f64, f64) {
        let sum: f64 = self.voices.iter_mut().map(Voice::process).sum();
        let out = sum * self.gain();
        (out, out)
    }

    #[inline]
    pub fn process_32(&mut self) -> (f32, f32) {
        let (l, r) = self.process_64();
        (l as f32, r as f32)
    }

    /// Re-derive every rate and coefficient and silence the pool.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    // ---- pedals and performance controls ----

    pub fn set_sustain_pedal(&mut self, down: bool) {
        self.sustain_pedal = down;
        if down {
            return;
        }
        for voice in &mut self.voices {
            if voice.release_pending && !voice.sostenuto_latched {
                voice.note_off();
            }
        }
    }

    pub fn set_sostenuto_pedal(&mut self, down: bool) {
        if down == self.sostenuto_pedal {
            return;
        }
        self.sostenuto_pedal = down;
        let sustain = self.sustain_pedal;
        for voice in &mut self.voices {
            if down {
                if voice.key_held && voice.state() == VoiceState::Active {
                    voice.sostenuto_latched = true;
                }
            } else if voice.sostenuto_latched {
                voice.sostenuto_latched = false;
                if voice.release_pending && !sustain {
                    voice.note_off();
                }
            }
        }
    }

    /// Wheel position in [-1, 1].
    pub fn set_pitch_bend(&mut self, value: f64) {
        self.pitch_bend = value.max(-1.0).min(1.0);
        let bend = (PITCH_BEND_RANGE * self.pitch_bend / 12.0).exp2();
        for voice in &mut self.voices {
            voice.set_pitch_bend(bend);
        }
    }

    pub fn set_mod_wheel(&mut self, value: f64) {
        self.mod_wheel = value;
    }

    pub fn set_soft_pedal(&mut self, value: f64) {
        self.soft_pedal = value;
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.midi_volume = volume;
    }

    pub fn set_expression(&mut self, expression: f64) {
        self.expression = expression;
    }

    pub fn set_out_volume(&mut self, volume: f64) {
        self.out_volume = volume;
    }

    pub fn set_random_phase(&mut self, random: bool) {
        self.random_phase = random;
    }

    // ---- voice parameters, broadcast ----

    pub fn set_osc_mix(&mut self, mix: f64) {
        self.voices.iter_mut().for_each(|v| v.set_osc_mix(mix));
    }

    pub fn set_inharmonic(&mut self, b: f64) {
        self.voices.iter_mut().for_each(|v| v.set_inharmonic(b));
    }

    pub fn set_subscale(&mut self, subscale: f64) {
        self.voices.iter_mut().for_each(|v| v.set_subscale(subscale));
    }

    pub fn set_inharmonic_key_follow(&mut self, follow: f64) {
        self.voices
            .iter_mut()
            .for_each(|v| v.set_inharmonic_key_follow(follow));
    }

    pub fn set_velocity_sensitivity(&mut self, sensitivity: f64) {
        self.voices
            .iter_mut()
            .for_each(|v| v.set_velocity_sensitivity(sensitivity));
    }

    pub fn set_vibrato_delay(&mut self, delay_ms: f64) {
        self.voices.iter_mut().for_each(|v| v.set_vibrato_delay(delay_ms));
    }

    pub fn set_vibrato_depth(&mut self, cents: f64) {
        self.voices.iter_mut().for_each(|v| v.set_vibrato_depth(cents));
    }

    pub fn set_vibrato_speed(&mut self, hz: f64) {
        self.voices.iter_mut().for_each(|v| v.set_vibrato_speed(hz));
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.voices.iter_mut().for_each(|v| v.set_filter_mode(mode));
    }

    pub fn set_filter_cutoff(&mut self, cutoff_hz: f64) {
        self.voices.iter_mut().for_each(|v| v.set_filter_cutoff(cutoff_hz));
    }

    pub fn set_filter_q(&mut self, q: f64) {
        self.voices.iter_mut().for_each(|v| v.set_filter_q(q));
    }

    pub fn set_filter_env_amount(&mut self, octaves: f64) {
        self.voices
            .iter_mut()
            .for_each(|v| v.set_filter_env_amount(octaves));
    }

    pub fn set_filter_key_follow(&mut self, follow: f64) {
        self.voices
            .iter_mut()
            .for_each(|v| v.set_filter_key_follow(follow));
    }

    pub fn set_amp_attack(&mut self, ms: f64) {
        self.amp_times.attack_ms = ms;
        self.broadcast_amp_times();
    }

    pub fn set_amp_decay(&mut self, ms: f64) {
        self.amp_times.decay_ms = ms;
        self.broadcast_amp_times();
    }

    pub fn set_amp_sustain(&mut self, level: f64) {
        self.amp_times.sustain = level;
        self.broadcast_amp_times();
    }

    pub fn set_amp_release(&mut self, ms: f64) {
        self.amp_times.release_ms = ms;
        self.broadcast_amp_times();
    }

    pub fn set_filter_attack(&mut self, ms: f64) {
        self.filter_times.attack_ms = ms;
        self.broadcast_filter_times();
    }

    pub fn set_filter_decay(&mut self, ms: f64) {
        self.filter_times.decay_ms = ms;
        self.broadcast_filter_times();
    }

    pub fn set_filter_sustain(&mut self, level: f64) {
        self.filter_times.sustain = level;
        self.broadcast_filter_times();
    }

    pub fn set_filter_release(&mut self, ms: f64) {
        self.filter_times.release_ms = ms;
        self.broadcast_filter_times();
    }

    fn broadcast_amp_times(&mut self) {
        let times = self.amp_times;
        self.voices.iter_mut().for_each(|v| v.set_amp_envelope(&times));
    }

    fn broadcast_filter_times(&mut self) {
        let times = self.filter_times;
        self.voices
            .iter_mut()
            .for_each(|v| v.set_filter_envelope(&times));
    }

    // ---- read access ----

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn amp_times(&self) -> EnvelopeTimes {
        self.amp_times
    }

    pub fn filter_times(&self) -> EnvelopeTimes {
        self.filter_times
    }

    pub fn pitch_bend(&self) -> f64 {
        self.pitch_bend
    }

    pub fn mod_wheel(&self) -> f64 {
        self.mod_wheel
    }

    pub fn soft_pedal(&self) -> f64 {
        self.soft_pedal
    }

    pub fn sustain_pedal(&self) -> bool {
        self.sustain_pedal
    }

    pub fn sostenuto_pedal(&self) -> bool {
        self.sostenuto_pedal
    }

    pub fn output_gain(&self) -> f64 {
        self.gain()
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}
