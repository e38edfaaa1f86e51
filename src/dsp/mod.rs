//! Low-level DSP primitives used by the voices and the effects chain.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! making them safe to embed directly inside voice structs.

/// Circular delay line with exact and interpolated reads.
pub mod delay;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Cascadable state-variable filter.
pub mod filter;
/// Vibrato and triangle LFOs.
pub mod lfo;
/// Inharmonic additive oscillator.
pub mod oscillator;
/// Phase-seeding random generator.
pub mod random;
/// Shared cosine table.
pub mod tables;

pub use envelope::{EnvelopeGenerator, EnvelopeState, EnvelopeTimes};
pub use filter::{FilterMode, FilterType, StateVariableFilter};
pub use oscillator::InharmonicOscillator;
