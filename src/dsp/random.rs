/// Linear congruential generator used to scatter oscillator start phases.
///
/// Deterministic for a given seed: two generators built from the same seed
/// produce identical sequences. Output has 15 bits of resolution.
#[derive(Debug, Clone)]
pub struct PseudoRandom {
    state: u32,
}

const MASK: u32 = 0x7FFF_FFFF;
const MULTIPLIER: u32 = 214_013;
const INCREMENT: u32 = 2_531_011;

impl PseudoRandom {
    pub fn new(seed: u32) -> Self {
        Self { state: seed & MASK }
    }

    /// Next raw value in `0..=0x7FFF`.
    #[inline]
    pub fn next_u15(&mut self) -> u32 {
        // arithmetic mod 2^32 then masked equals arithmetic mod 2^31
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        (self.state >> 16) & 0x7FFF
    }

    /// Next value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_u15() as f64 / 32768.0
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}
