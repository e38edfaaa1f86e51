//! Shared lookup tables.
//!
//! The cosine table is built once on first use and never written again, so
//! every oscillator and LFO in the process reads the same immutable data.

use std::f64::consts::TAU;
use std::sync::LazyLock;

/// Number of entries in the cosine table. Must stay a power of two so the
/// index can be masked instead of bounds-checked with a modulo.
pub const COS_TABLE_SIZE: usize = 8192;

/// One full cycle of `cos(2π·i/N)`.
pub static COS_TABLE: LazyLock<[f64; COS_TABLE_SIZE]> = LazyLock::new(|| {
    let mut table = [0.0; COS_TABLE_SIZE];
    for (i, value) in table.iter_mut().enumerate() {
        *value = (TAU * i as f64 / COS_TABLE_SIZE as f64).cos();
    }
    table
});

/// Table index for a phase in cycles. Phases outside `[0, 1)` wrap.
#[inline]
pub fn table_index(phase: f64) -> usize {
    // `as usize` saturates negatives and NaN to zero
    (phase * COS_TABLE_SIZE as f64) as usize & (COS_TABLE_SIZE - 1)
}

/// `cos(2π·phase)` by truncating table lookup.
#[inline]
pub fn cos_2pi(phase: f64) -> f64 {
    COS_TABLE[table_index(phase)]
}

/// Drop the integer part of a non-negative phase.
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    phase - phase.trunc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_cosine_at_quadrants() {
        assert!((cos_2pi(0.0) - 1.0).abs() < 1e-12);
        assert!(cos_2pi(0.25).abs() < 1e-12);
        assert!((cos_2pi(0.5) + 1.0).abs() < 1e-12);
        assert!(cos_2pi(0.75).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_error_is_bounded_by_table_resolution() {
        let max_step_error = TAU / COS_TABLE_SIZE as f64;
        for i in 0..1000 {
            let phase = i as f64 / 1000.0;
            let exact = (TAU * phase).cos();
            assert!(
                (cos_2pi(phase) - exact).abs() <= max_step_error,
                "lookup at {} drifted too far",
                phase
            );
        }
    }

    #[test]
    fn test_index_wraps_out_of_range_phase() {
        assert_eq!(table_index(1.0), 0);
        assert_eq!(table_index(-0.5), 0);
        assert_eq!(table_index(f64::NAN), 0);
    }

    #[test]
    fn test_wrap_phase_keeps_fraction() {
        assert!((wrap_phase(2.75) - 0.75).abs() < 1e-12);
        assert_eq!(wrap_phase(0.5), 0.5);
    }
}
