use crate::dsp::{
    envelope::{EnvelopeGenerator, EnvelopeState, EnvelopeTimes},
    filter::{FilterMode, StateVariableFilter},
    lfo::VibratoLfo,
    oscillator::InharmonicOscillator,
};
use crate::MIN_SAMPLE_RATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Amplitude envelope stopped, available for allocation
    Active,    // Attack, decay or sustain
    Releasing, // Key released, envelope in release phase
}

/// One note: two inharmonic oscillators through a filter, shaped by an
/// amplitude envelope and a filter envelope, with delayed vibrato.
pub struct Voice {
    sample_rate: f64,
    osc1: InharmonicOscillator,
    osc2: InharmonicOscillator,
    amp_env: EnvelopeGenerator,
    filter_env: EnvelopeGenerator,
    filter: StateVariableFilter,
    vibrato: VibratoLfo,

    amp_times: EnvelopeTimes,
    filter_times: EnvelopeTimes,

    // note
    pitch: u8,
    velocity: f64,
    freq: f64, // normalized, Hz / sample rate
    bend: f64,

    // oscillators
    osc_mix: f64,
    inharmonic: f64,
    subscale: f64,
    inharmonic_key_follow: f64,
    velocity_sensitivity: f64,

    // vibrato
    vib_delay_ms: f64,
    vib_depth_cents: f64,
    vib_speed_hz: f64,
    vib_delay_step: f64,
    vib_freq_step: f64,

    // filter
    filter_mode: FilterMode,
    filter_cutoff_hz: f64,
    filter_q: f64,
    filter_env_amount: f64,
    filter_key_follow: f64,

    // per-note caches
    amp_vel_mod: f64,
    filter_key_mod: f64,

    // pedal bookkeeping, managed by the pool
    pub(crate) key_held: bool,
    pub(crate) release_pending: bool,
    pub(crate) sostenuto_latched: bool,
}

impl Voice {
    /// `seed` decorrelates the random start phases between voices.
    pub fn new(sample_rate: f64, seed: u32) -> Self {
        let sample_rate = sample_rate.max(MIN_SAMPLE_RATE);
        let amp_times = EnvelopeTimes::default();
        let filter_times = EnvelopeTimes::default();

        let mut voice = Self {
            sample_rate,
            osc1: InharmonicOscillator::new(seed.wrapping_mul(2)),
            osc2: InharmonicOscillator::new(seed.wrapping_mul(2).wrapping_add(1)),
            amp_env: EnvelopeGenerator::new(&amp_times, sample_rate),
            filter_env: EnvelopeGenerator::new(&filter_times, sample_rate),
            filter: StateVariableFilter::new(4000.0, sample_rate, 0.5),
            vibrato: VibratoLfo::new(),
            amp_times,
            filter_times,
            pitch: 69,
            velocity: 1.0,
            freq: 440.0 / sample_rate,
            bend: 1.0,
            osc_mix: 0.3,
            inharmonic: 0.1,
            subscale: 0.25,
            inharmonic_key_follow: 0.0,
            velocity_sensitivity: 1.0,
            vib_delay_ms: 0.0,
            vib_depth_cents: 0.0,
            vib_speed_hz: 2.0,
            vib_delay_step: 1.0,
            vib_freq_step: 0.0,
            filter_mode: FilterMode::LOW_PASS,
            filter_cutoff_hz: 4000.0,
            filter_q: 0.5,
            filter_env_amount: 0.0,
            filter_key_follow: 0.0,
            amp_vel_mod: 1.0,
            filter_key_mod: 1.0,
            key_held: false,
            release_pending: false,
            sostenuto_latched: false,
        };
        voice.update_vibrato_steps();
        voice.update_osc_freq();
        voice
    }

    /// Start a note. Pitch is clamped to the MIDI range, velocity is 0..=1.
    pub fn note_on(&mut self, pitch: i32, velocity: f64, random_phase: bool) {
        let pitch = pitch.clamp(0, 127);
        self.pitch = pitch as u8;
        self.velocity = velocity.max(0.0).min(1.0);
        self.freq = midi_to_hz(pitch as f64) / self.sample_rate;

        if random_phase {
            self.osc1.reset_random();
            self.osc2.reset_random();
        } else {
            self.osc1.reset_zero();
            self.osc2.reset_zero();
        }
        self.update_osc_freq();

        self.amp_vel_mod = (self.velocity - 1.0) * self.velocity_sensitivity + 1.0;
        self.filter_key_mod = ((pitch as f64 - 60.0) / 12.0 * self.filter_key_follow).exp2();
        self.update_filter();

        self.amp_env.note_on();
        self.filter_env.note_on();
        self.vibrato.note_on();

        self.key_held = true;
        self.release_pending = false;
        self.sostenuto_latched = false;
    }

    pub fn note_off(&mut self) {
        self.amp_env.note_off();
        self.filter_env.note_off();
        self.release_pending = false;
    }

    /// Render one sample. Returns silence once the amplitude envelope stops.
    #[inline]
    pub fn process(&mut self) -> f64 {
        let Some(amp) = self.amp_env.next_sample() else {
            return 0.0;
        };
        let amp = amp * self.amp_vel_mod;
        let filter_env = self.filter_env.next_sample().unwrap_or(0.0);

        let osc_mod = if self.vib_depth_cents != 0.0 {
            let lfo = self.vibrato.process(self.vib_delay_step, self.vib_freq_step);
            (self.vib_depth_cents * lfo / 1200.0).exp2()
        } else {
            1.0
        };

        let vco = (1.0 - self.osc_mix) * self.osc1.process(osc_mod)
            + self.osc_mix * self.osc2.process(osc_mod);

        let env_active = self.filter_env_amount != 0.0;
        let key_active = self.filter_key_follow != 0.0;
        if env_active || key_active {
            let mut cutoff_mod = 1.0;
            if env_active {
                cutoff_mod *= (filter_env * self.filter_env_amount).exp2();
            }
            if key_active {
                cutoff_mod *= self.filter_key_mod;
            }
            self.filter.set_freq(
                self.filter_cutoff_hz * cutoff_mod,
                self.sample_rate,
                self.filter_q,
            );
        }

        amp * amp * self.filter.process(vco, self.filter_mode)
    }

    /// Change the sample rate. Floors at 8 kHz, stops the voice and flushes
    /// filter state.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate.max(MIN_SAMPLE_RATE);
        self.freq = midi_to_hz(self.pitch as f64) / self.sample_rate;
        self.amp_env.configure(&self.amp_times, self.sample_rate);
        self.filter_env.configure(&self.filter_times, self.sample_rate);
        self.update_vibrato_steps();
        self.update_osc_freq();
        self.reset();
    }

    /// Silence immediately, without a release tail.
    pub fn reset(&mut self) {
        self.amp_env.reset();
        self.filter_env.reset();
        self.filter.reset();
        self.update_filter();
        self.key_held = false;
        self.release_pending = false;
        self.sostenuto_latched = false;
    }

    pub fn set_amp_envelope(&mut self, times: &EnvelopeTimes) {
        self.amp_times = *times;
        self.amp_env.configure(times, self.sample_rate);
    }

    pub fn set_filter_envelope(&mut self, times: &EnvelopeTimes) {
        self.filter_times = *times;
        self.filter_env.configure(times, self.sample_rate);
    }

    /// Crossfade between oscillator 1 (0.0) and oscillator 2 (1.0).
    pub fn set_osc_mix(&mut self, mix: f64) {
        self.osc_mix = mix.max(0.0).min(1.0);
    }

    /// Inharmonicity of oscillator 1; oscillator 2 gets `b · subscale`.
    pub fn set_inharmonic(&mut self, b: f64) {
        self.inharmonic = b.max(0.0);
        self.update_osc_freq();
    }

    pub fn set_subscale(&mut self, subscale: f64) {
        self.subscale = subscale.max(0.0);
        self.update_osc_freq();
    }

    /// How strongly inharmonicity grows with pitch, in units of 4 octaves.
    pub fn set_inharmonic_key_follow(&mut self, follow: f64) {
        self.inharmonic_key_follow = follow;
        self.update_osc_freq();
    }

    pub fn set_velocity_sensitivity(&mut self, sensitivity: f64) {
        self.velocity_sensitivity = sensitivity;
    }

    pub fn set_vibrato_delay(&mut self, delay_ms: f64) {
        self.vib_delay_ms = delay_ms.max(0.0);
        self.update_vibrato_steps();
    }

    pub fn set_vibrato_depth(&mut self, depth_cents: f64) {
        self.vib_depth_cents = depth_cents;
    }

    pub fn set_vibrato_speed(&mut self, speed_hz: f64) {
        self.vib_speed_hz = speed_hz.max(0.0);
        self.update_vibrato_steps();
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter_mode = mode;
    }

    pub fn set_filter_cutoff(&mut self, cutoff_hz: f64) {
        self.filter_cutoff_hz = cutoff_hz;
        self.update_filter();
    }

    pub fn set_filter_q(&mut self, q: f64) {
        self.filter_q = q;
        self.update_filter();
    }

    /// Filter envelope depth in octaves.
    pub fn set_filter_env_amount(&mut self, octaves: f64) {
        self.filter_env_amount = octaves;
        self.update_filter();
    }

    pub fn set_filter_key_follow(&mut self, follow: f64) {
        self.filter_key_follow = follow;
        self.filter_key_mod = ((self.pitch as f64 - 60.0) / 12.0 * follow).exp2();
        self.update_filter();
    }

    /// Frequency multiplier from the pitch wheel.
    pub fn set_pitch_bend(&mut self, bend: f64) {
        self.bend = bend;
        self.update_osc_freq();
    }

    fn update_osc_freq(&mut self) {
        let key_mod =
            ((self.pitch as f64 - 60.0) / 12.0 * 4.0 * self.inharmonic_key_follow).exp2();
        let freq = self.freq * self.bend;
        self.osc1.set_freq(freq, self.inharmonic * key_mod);
        self.osc2
            .set_freq(freq, self.inharmonic * self.subscale * key_mod);
    }

    fn update_filter(&mut self) {
        // static cutoff; per-sample modulation recomputes on top of this
        self.filter
            .set_freq(self.filter_cutoff_hz, self.sample_rate, self.filter_q);
    }

    fn update_vibrato_steps(&mut self) {
        self.vib_delay_step = 1.0 / (self.vib_delay_ms * 1e-3 * self.sample_rate).max(1.0);
        self.vib_freq_step = self.vib_speed_hz / self.sample_rate;
    }

    pub fn state(&self) -> VoiceState {
        match self.amp_env.state() {
            EnvelopeState::Stop => VoiceState::Free,
            EnvelopeState::Release => VoiceState::Releasing,
            _ => VoiceState::Active,
        }
    }

    pub fn is_free(&self) -> bool {
        self.amp_env.is_finished()
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn amp_envelope(&self) -> &EnvelopeGenerator {
        &self.amp_env
    }

    pub fn filter_envelope(&self) -> &EnvelopeGenerator {
        &self.filter_env
    }

    pub fn filter(&self) -> &StateVariableFilter {
        &self.filter
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// Sounding partial counts of the two oscillators.
    pub fn partial_counts(&self) -> (usize, usize) {
        (self.osc1.partial_count(), self.osc2.partial_count())
    }

    /// Current envelope level, for metering.
    pub fn level(&self) -> f64 {
        self.amp_env.level()
    }
}

#[inline]
pub fn midi_to_hz(pitch: f64) -> f64 {
    440.0 * ((pitch - 69.0) / 12.0).exp2()
}
