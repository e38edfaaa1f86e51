// Purpose: block processing, host-facing setup, sample-accurate event dispatch
// One Processor owns the voice pool, the effects chain and every parameter value.

pub mod error;
pub mod scheduler;

use crate::{
    dsp::filter::FilterMode,
    effects::{EffectsChain, StereoEffect},
    params::{ParamId, ParameterChange, PARAMETERS, PARAM_COUNT},
    patch::{Preset, PresetValue},
    synth::{
        message::{MessageReceiver, SynthMessage},
        Synth,
    },
    DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE,
};

pub use self::{
    error::{ProcessorError, StateError},
    scheduler::{EventScheduler, NoteEvent, NoteEventKind},
};

/// Most note events handled in one block; the rest are dropped.
pub const MAX_EVENTS_PER_BLOCK: usize = 512;

const STEREO: usize = 2;
const STATE_VALUE_BYTES: usize = std::mem::size_of::<f64>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    Float32,
    Float64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSetup {
    pub sample_rate: f64,
    pub max_block_size: usize,
    pub sample_size: SampleSize,
}

impl Default for ProcessSetup {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: MAX_BLOCK_SIZE,
            sample_size: SampleSize::Float32,
        }
    }
}

/// Output sample formats the processor can write.
pub trait OutputSample: Copy {
    fn from_f64(value: f64) -> Self;
}

impl OutputSample for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl OutputSample for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

pub struct Processor {
    synth: Synth,
    effects: EffectsChain,
    values: [f64; PARAM_COUNT],
    scheduler: EventScheduler,
    setup: ProcessSetup,
}

impl Processor {
    /// Build a processor with every parameter at its default.
    pub fn new(sample_rate: f64) -> Self {
        let mut processor = Self {
            synth: Synth::new(sample_rate),
            effects: EffectsChain::new(sample_rate),
            values: PARAMETERS.map(|info| info.default),
            scheduler: EventScheduler::with_capacity(MAX_EVENTS_PER_BLOCK),
            setup: ProcessSetup {
                sample_rate,
                ..ProcessSetup::default()
            },
        };
        for info in PARAMETERS.iter() {
            processor.apply_parameter(info.id, info.default);
        }
        processor
    }

    /// Accept any inputs as long as the first output bus is stereo.
    pub fn set_bus_arrangements(
        &mut self,
        inputs: &[usize],
        outputs: &[usize],
    ) -> Result<(), ProcessorError> {
        if outputs.first() == Some(&STEREO) {
            Ok(())
        } else {
            Err(ProcessorError::UnsupportedBusArrangement {
                inputs: inputs.to_vec(),
                outputs: outputs.to_vec(),
            })
        }
    }

    pub fn can_process_sample_size(&self, size: SampleSize) -> bool {
        matches!(size, SampleSize::Float32 | SampleSize::Float64)
    }

    /// Apply a new host setup. Re-derives every coefficient and flushes all
    /// voice, filter and delay state.
    pub fn setup_processing(&mut self, setup: ProcessSetup) -> Result<(), ProcessorError> {
        if !setup.sample_rate.is_finite() || setup.sample_rate <= 0.0 {
            return Err(ProcessorError::InvalidSampleRate(setup.sample_rate));
        }
        tracing::info!(
            "Processing setup: {} Hz, max block {}, {:?}",
            setup.sample_rate,
            setup.max_block_size,
            setup.sample_size
        );
        self.setup = setup;
        self.synth.set_sample_rate(setup.sample_rate);
        self.effects.set_sample_rate(setup.sample_rate);
        Ok(())
    }

    pub fn setup(&self) -> ProcessSetup {
        self.setup
    }

    /// Store a normalized value and push its plain value into the engine.
    pub fn apply_parameter(&mut self, id: ParamId, normalized: f64) {
        if !normalized.is_finite() {
            return;
        }
        let normalized = normalized.max(0.0).min(1.0);
        self.values[id.index()] = normalized;

        let plain = id.plain_value(normalized);
        let on = plain > 0.5;
        let synth = &mut self.synth;
        let effects = &mut self.effects;
        match id {
            ParamId::Volume => synth.set_volume(plain),
            ParamId::Expression => synth.set_expression(plain),
            ParamId::PitchBend => synth.set_pitch_bend(plain),
            ParamId::ModWheel => synth.set_mod_wheel(plain),
            ParamId::SustainPedal => synth.set_sustain_pedal(on),
            ParamId::SostenutoPedal => synth.set_sostenuto_pedal(on),
            ParamId::SoftPedal => synth.set_soft_pedal(plain),

            ParamId::OutVol => synth.set_out_volume(plain),
            ParamId::OscMix => synth.set_osc_mix(plain),
            ParamId::IsRandomPhase => synth.set_random_phase(on),
            ParamId::Inharmonic => synth.set_inharmonic(plain),
            ParamId::Subscale => synth.set_subscale(plain),
            ParamId::InharmKeyFollow => synth.set_inharmonic_key_follow(plain),
            ParamId::AmpEnvA => synth.set_amp_attack(plain),
            ParamId::AmpEnvD => synth.set_amp_decay(plain),
            ParamId::AmpEnvS => synth.set_amp_sustain(plain),
            ParamId::AmpEnvR => synth.set_amp_release(plain),
            ParamId::AmpVeloSens => synth.set_velocity_sensitivity(plain),
            ParamId::VibDelay => synth.set_vibrato_delay(plain),
            ParamId::VibDepth => synth.set_vibrato_depth(plain),
            ParamId::VibSpeed => synth.set_vibrato_speed(plain),
            ParamId::FiltType => synth.set_filter_mode(FilterMode::from_index(plain as usize)),
            ParamId::FiltCutoff => synth.set_filter_cutoff(plain),
            ParamId::FiltReso => synth.set_filter_q(plain),
            ParamId::FiltEnvAmount => synth.set_filter_env_amount(plain),
            ParamId::FiltEnvA => synth.set_filter_attack(plain),
            ParamId::FiltEnvD => synth.set_filter_decay(plain),
            ParamId::FiltEnvS => synth.set_filter_sustain(plain),
            ParamId::FiltEnvR => synth.set_filter_release(plain),
            ParamId::FiltKeyFollow => synth.set_filter_key_follow(plain),

            ParamId::EqF => effects.eq_mut().set_frequency(plain),
            ParamId::EqG => effects.eq_mut().set_gain_db(plain),
            ParamId::EqQ => effects.eq_mut().set_q(plain),
            ParamId::ChorusTime => effects.chorus_mut().set_delay_ms(plain),
            ParamId::ChorusDepth => effects.chorus_mut().set_depth(plain),
            ParamId::ChorusSpeed => effects.chorus_mut().set_speed(plain),
            ParamId::ChorusAmount => effects.chorus_mut().set_mix(plain),
            ParamId::SampleDivision => effects.divider_mut().set_division(plain as usize),
            ParamId::ReverbTime => effects.reverb_mut().set_time(plain),
            ParamId::ReverbMix => effects.reverb_mut().set_mix(plain),
        }
    }

    pub fn parameter_value(&self, id: ParamId) -> f64 {
        self.values[id.index()]
    }

    pub fn parameter_values(&self) -> &[f64; PARAM_COUNT] {
        &self.values
    }

    /// Apply everything waiting in the message ring.
    pub fn drain_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            match message {
                SynthMessage::NoteOn {
                    channel,
                    pitch,
                    velocity,
                } => self.dispatch(NoteEventKind::NoteOn {
                    channel,
                    pitch: pitch as i32,
                    velocity,
                }),
                SynthMessage::NoteOff {
                    channel,
                    pitch,
                    velocity,
                } => self.dispatch(NoteEventKind::NoteOff {
                    channel,
                    pitch: pitch as i32,
                    velocity,
                }),
                SynthMessage::Param { id, value } => self.apply_parameter(id, value),
                SynthMessage::AllNotesOff => self.synth.all_notes_off(),
            }
        }
    }

    fn dispatch(&mut self, event: NoteEventKind) {
        match event {
            NoteEventKind::NoteOn {
                channel,
                pitch,
                velocity,
            } if velocity > 0.0 => {
                self.synth.note_on(channel, pitch, velocity);
            }
            NoteEventKind::NoteOn {
                channel,
                pitch,
                velocity,
            }
            | NoteEventKind::NoteOff {
                channel,
                pitch,
                velocity,
            } => self.synth.note_off(channel, pitch, velocity),
        }
    }

    /// Render one block.
    ///
    /// Parameter changes apply before the first sample, last value per id
    /// wins. Note events fire right before the sample at their offset.
    pub fn process<T: OutputSample>(
        &mut self,
        changes: &[ParameterChange],
        events: &[NoteEvent],
        left: &mut [T],
        right: &mut [T],
    ) {
        let mut latest = [None; PARAM_COUNT];
        for change in changes {
            latest[change.id.index()] = Some(change.value);
        }
        for (info, value) in PARAMETERS.iter().zip(latest) {
            if let Some(value) = value {
                self.apply_parameter(info.id, value);
            }
        }

        let frames = left.len().min(right.len());
        self.scheduler.clear();
        for event in events {
            self.scheduler.schedule(*event, frames);
        }

        for (i, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
            while let Some(event) = self.scheduler.pop_due(i) {
                self.dispatch(event.kind);
            }
            let (dry_l, dry_r) = self.synth.process_64();
            let (wet_l, wet_r) = self.effects.process(dry_l, dry_r);
            *l = T::from_f64(wet_l);
            *r = T::from_f64(wet_r);
        }

        // zero-length blocks still deliver their events
        while let Some(event) = self.scheduler.pop_remaining() {
            self.dispatch(event.kind);
        }
    }

    pub fn process_32(
        &mut self,
        changes: &[ParameterChange],
        events: &[NoteEvent],
        left: &mut [f32],
        right: &mut [f32],
    ) {
        self.process(changes, events, left, right);
    }

    pub fn process_64(
        &mut self,
        changes: &[ParameterChange],
        events: &[NoteEvent],
        left: &mut [f64],
        right: &mut [f64],
    ) {
        self.process(changes, events, left, right);
    }

    /// Every normalized value as little-endian f64, in table order.
    pub fn state(&self) -> Vec<u8> {
        self.values
            .iter()
            .flat_map(|value| value.to_le_bytes())
            .collect()
    }

    /// Restore values written by [`Processor::state`]. A blob of the wrong
    /// length is rejected whole.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let expected = PARAM_COUNT * STATE_VALUE_BYTES;
        if bytes.len() != expected {
            tracing::warn!("Rejected state: {} bytes, expected {}", bytes.len(), expected);
            return Err(StateError::Length {
                expected,
                found: bytes.len(),
            });
        }

        for (info, chunk) in PARAMETERS.iter().zip(bytes.chunks_exact(STATE_VALUE_BYTES)) {
            let mut raw = [0u8; STATE_VALUE_BYTES];
            raw.copy_from_slice(chunk);
            let stored = f64::from_le_bytes(raw);
            let value = if stored.is_finite() {
                stored
            } else {
                info.default
            };
            self.apply_parameter(info.id, value);
        }
        tracing::debug!("Loaded state with {} parameters", PARAM_COUNT);
        Ok(())
    }

    pub fn preset(&self, name: &str) -> Preset {
        Preset {
            name: name.to_string(),
            values: PARAMETERS
                .iter()
                .map(|info| PresetValue {
                    title: info.title.to_string(),
                    value: self.values[info.id.index()],
                })
                .collect(),
        }
    }

    /// Apply a preset by title. Titles missing from the preset keep their
    /// current value.
    pub fn apply_preset(&mut self, preset: &Preset) {
        for entry in &preset.values {
            match ParamId::from_title(&entry.title) {
                Some(id) => self.apply_parameter(id, entry.value),
                None => tracing::warn!(
                    "Preset '{}': unknown parameter '{}'",
                    preset.name,
                    entry.title
                ),
            }
        }
        tracing::info!("Applied preset '{}'", preset.name);
    }

    pub fn synth(&self) -> &Synth {
        &self.synth
    }

    pub fn effects(&self) -> &EffectsChain {
        &self.effects
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::VoiceState;

    const SAMPLE_RATE: f64 = 48_000.0;

    fn dry_processor() -> Processor {
        let mut processor = Processor::new(SAMPLE_RATE);
        processor.apply_parameter(ParamId::ReverbMix, 0.0);
        processor.apply_parameter(ParamId::ChorusAmount, 0.0);
        processor.apply_parameter(ParamId::AmpEnvA, 0.0);
        processor
    }

    #[test]
    fn test_defaults_applied() {
        let processor = Processor::new(SAMPLE_RATE);
        for info in PARAMETERS.iter() {
            assert_eq!(processor.parameter_value(info.id), info.default);
        }
        assert!((processor.effects().reverb().mix() - 0.15).abs() < 1e-12);
        assert_eq!(processor.effects().divider().division(), 1);
    }

    #[test]
    fn test_bus_negotiation() {
        let mut processor = Processor::new(SAMPLE_RATE);
        assert!(processor.set_bus_arrangements(&[], &[2]).is_ok());
        assert_eq!(
            processor.set_bus_arrangements(&[], &[1]),
            Err(ProcessorError::UnsupportedBusArrangement {
                inputs: vec![],
                outputs: vec![1],
            })
        );
        assert!(processor.set_bus_arrangements(&[2], &[2]).is_ok());
        assert!(processor.set_bus_arrangements(&[], &[2, 2]).is_ok());
        assert!(processor.set_bus_arrangements(&[2], &[1, 2]).is_err());
        assert!(processor.set_bus_arrangements(&[2], &[]).is_err());
    }

    #[test]
    fn test_setup_rejects_bad_sample_rate() {
        let mut processor = Processor::new(SAMPLE_RATE);
        let setup = ProcessSetup {
            sample_rate: 0.0,
            ..ProcessSetup::default()
        };
        assert_eq!(
            processor.setup_processing(setup),
            Err(ProcessorError::InvalidSampleRate(0.0))
        );
        assert_eq!(processor.setup().sample_rate, SAMPLE_RATE);
    }

    #[test]
    fn test_both_sample_sizes_supported() {
        let processor = Processor::new(SAMPLE_RATE);
        assert!(processor.can_process_sample_size(SampleSize::Float32));
        assert!(processor.can_process_sample_size(SampleSize::Float64));
    }

    #[test]
    fn test_note_fires_at_its_offset() {
        let mut processor = dry_processor();
        let mut left = [0.0f64; 256];
        let mut right = [0.0f64; 256];
        let events = [NoteEvent::note_on(100, 60, 1.0)];
        processor.process_64(&[], &events, &mut left, &mut right);

        assert!(left[..100].iter().all(|&s| s == 0.0));
        assert!(left[100..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_zero_velocity_note_on_releases() {
        let mut processor = dry_processor();
        let mut left = [0.0f32; 64];
        let mut right = [0.0f32; 64];
        let events = [
            NoteEvent::note_on(0, 60, 1.0),
            NoteEvent::note_on(10, 60, 0.0),
        ];
        processor.process_32(&[], &events, &mut left, &mut right);
        assert_eq!(
            processor.synth().voices()[0].state(),
            crate::synth::VoiceState::Releasing
        );
    }

    #[test]
    fn test_last_change_wins() {
        let mut processor = Processor::new(SAMPLE_RATE);
        let changes = [
            ParameterChange::new(ParamId::OscMix, 0.1),
            ParameterChange::new(ParamId::OscMix, 0.9),
        ];
        processor.process_64(&changes, &[], &mut [], &mut []);
        assert_eq!(processor.parameter_value(ParamId::OscMix), 0.9);
    }

    #[test]
    fn test_overridden_pedal_value_never_applies() {
        let mut processor = dry_processor();
        let mut left = [0.0f64; 32];
        let mut right = [0.0f64; 32];
        let hold = [ParameterChange::new(ParamId::SustainPedal, 1.0)];
        let events = [NoteEvent::note_on(0, 60, 1.0), NoteEvent::note_off(10, 60)];
        processor.process_64(&hold, &events, &mut left, &mut right);
        assert_eq!(processor.synth().voices()[0].state(), VoiceState::Active);

        let changes = [
            ParameterChange::new(ParamId::SustainPedal, 0.0),
            ParameterChange::new(ParamId::SustainPedal, 1.0),
        ];
        processor.process_64(&changes, &[], &mut left, &mut right);
        assert_eq!(processor.parameter_value(ParamId::SustainPedal), 1.0);
        assert_eq!(processor.synth().voices()[0].state(), VoiceState::Active);
    }

    #[test]
    fn test_empty_block_still_dispatches() {
        let mut processor = Processor::new(SAMPLE_RATE);
        let events = [NoteEvent::note_on(0, 60, 1.0)];
        processor.process_64(&[], &events, &mut [], &mut []);
        assert_eq!(processor.synth().active_voice_count(), 1);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let mut processor = Processor::new(SAMPLE_RATE);
        processor.apply_parameter(ParamId::ReverbMix, 4.0);
        assert_eq!(processor.parameter_value(ParamId::ReverbMix), 1.0);
        processor.apply_parameter(ParamId::ReverbMix, f64::NAN);
        assert_eq!(processor.parameter_value(ParamId::ReverbMix), 1.0);
    }

    #[test]
    fn test_state_length_checked() {
        let mut processor = Processor::new(SAMPLE_RATE);
        assert_eq!(processor.state().len(), PARAM_COUNT * 8);
        assert_eq!(
            processor.load_state(&[0u8; 12]),
            Err(StateError::Length {
                expected: PARAM_COUNT * 8,
                found: 12,
            })
        );
    }

    #[test]
    fn test_non_finite_state_falls_back_to_default() {
        let mut processor = Processor::new(SAMPLE_RATE);
        processor.apply_parameter(ParamId::EqG, 0.9);
        let mut state = processor.state();
        let at = ParamId::EqG.index() * 8;
        state[at..at + 8].copy_from_slice(&f64::NAN.to_le_bytes());

        let mut restored = Processor::new(SAMPLE_RATE);
        restored.apply_parameter(ParamId::EqG, 0.1);
        assert!(restored.load_state(&state).is_ok());
        assert_eq!(
            restored.parameter_value(ParamId::EqG),
            ParamId::EqG.info().default
        );
    }

    #[test]
    fn test_drain_messages() {
        struct Queue(Vec<SynthMessage>);
        impl MessageReceiver for Queue {
            fn pop(&mut self) -> Option<SynthMessage> {
                if self.0.is_empty() {
                    None
                } else {
                    Some(self.0.remove(0))
                }
            }
        }

        let mut processor = Processor::new(SAMPLE_RATE);
        let mut queue = Queue(vec![
            SynthMessage::Param {
                id: ParamId::SampleDivision,
                value: 1.0,
            },
            SynthMessage::NoteOn {
                channel: 0,
                pitch: 64,
                velocity: 0.5,
            },
        ]);
        processor.drain_messages(&mut queue);
        assert_eq!(processor.effects().divider().division(), 8);
        assert_eq!(processor.synth().voices()[0].pitch(), 64);
        assert!(queue.0.is_empty());
    }
}
