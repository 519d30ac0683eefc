//! Single-cycle modulation table generator.
//!
//! Effects that modulate a parameter from a phase accumulator (rotary
//! speaker gain and delay, for instance) index into a 256-slot lookup table
//! rather than evaluating trig at audio rate. [`fill_sinemod`] authors such
//! a table: one sine cycle, starting from an arbitrary phase offset, affine
//! remapped from the kernel's native Q12 range into any `[min, max]` span of
//! `i16` values.
//!
//! Everything here is integer arithmetic; the remap divides by the *input*
//! width (a constant 2^13), so a degenerate `min == max` request yields a
//! constant table instead of a division by zero.

use crate::trig::{isin_s3, PHASE_CYCLE, SINE_SCALE};

/// Number of distinct phase buckets in a modulation table.
///
/// Consumers that interpolate forward typically allocate one extra slot and
/// duplicate entry 0 at the end so `table[i + 1]` never needs a branch.
pub const MOD_TABLE_LEN: usize = 256;

/// Remap a Q12 sine value from `[-4096, 4096]` into `[new_min, new_max]`.
#[inline]
fn remap_q12(v: i32, new_min: i16, new_max: i16) -> i16 {
    let new_min = i32::from(new_min);
    let new_max = i32::from(new_max);
    // (v - old_min) is in 0..=2^13; the product stays well inside i32.
    (new_min + (v + SINE_SCALE) * (new_max - new_min) / (2 * SINE_SCALE)) as i16
}

/// Fill `ret` with one cycle of a sine wave mapped into `[min, max]`
/// (inclusive of both), starting from `phase` (2^15 units per circle).
pub fn fill_sinemod(ret: &mut [i16; MOD_TABLE_LEN], min: i16, max: i16, phase: i32) {
    let phase_incr = PHASE_CYCLE / MOD_TABLE_LEN as i32;
    let mut phase = phase;
    for slot in ret.iter_mut() {
        let v = isin_s3(phase);
        phase += phase_incr;
        *slot = remap_q12(v, min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinemod_zero_crossings_and_peaks() {
        let mut vals = [0i16; MOD_TABLE_LEN];
        fill_sinemod(&mut vals, -127, 127, 0);

        assert_eq!(vals[0], 0);
        assert_eq!(vals[128], 0);
        assert_eq!(vals[64], 127);
        assert_eq!(vals[192], -127);

        for (i, v) in vals.iter().enumerate() {
            assert!((-127..=127).contains(v), "slot {i} out of range: {v}");
        }
    }

    #[test]
    fn sinemod_degenerate_range_is_constant() {
        // min == max must not divide by zero and must yield a flat table.
        let mut vals = [1i16; MOD_TABLE_LEN];
        fill_sinemod(&mut vals, 0, 0, 0);
        assert!(vals.iter().all(|&v| v == 0));

        fill_sinemod(&mut vals, 440, 440, 1234);
        assert!(vals.iter().all(|&v| v == 440));
    }

    #[test]
    fn sinemod_quarter_turn_offset_is_cosine() {
        let mut vals = [0i16; MOD_TABLE_LEN];
        fill_sinemod(&mut vals, -127, 127, PHASE_CYCLE / 4);

        assert_eq!(vals[64], 0);
        assert_eq!(vals[192], 0);
        assert_eq!(vals[0], 127);
        assert_eq!(vals[128], -127);

        for v in &vals {
            assert!((-127..=127).contains(v));
        }
    }

    #[test]
    fn sinemod_positive_span_stays_in_span() {
        let mut vals = [0i16; MOD_TABLE_LEN];
        fill_sinemod(&mut vals, 0, 127, 0);
        for v in &vals {
            assert!((0..=127).contains(v));
        }

        // Full 15-bit gain span, as the tremolo envelope uses.
        fill_sinemod(&mut vals, 0, 32767, 0);
        assert_eq!(vals[64], 32767);
        for v in &vals {
            assert!(*v >= 0);
        }
    }
}
