pub mod dsp; // Oscillators, filters, envelopes, delay lines
pub mod effects; // Post-synthesis stereo chain
pub mod engine; // Block processing and event scheduling
pub mod io;
pub mod params; // Parameter table and value mapping
pub mod patch;
pub mod synth; // Voices and polyphony

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_VOICES: usize = 16;
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;
pub(crate) const MIN_SAMPLE_RATE: f64 = 8_000.0;

pub use engine::{ProcessSetup, Processor, SampleSize};
pub use params::{ParamId, ParameterChange};
