// Purpose: Voice composition, polyphony, control messages
// This layer sits above the DSP primitives and below the block processor

pub mod message;
pub mod poly;
pub mod voice;

pub use poly::Synth;
pub use voice::{Voice, VoiceState};
