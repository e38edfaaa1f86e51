//! Scenario benchmarks: single voices, a full pool and the block processor
//! with the effects chain.

mod processor;
mod voices;

pub use processor::bench_processor;
pub use voices::bench_voices;
