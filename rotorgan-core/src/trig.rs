//! Integer sine approximations over a fixed-point phase circle.
//!
//! Both kernels take a phase measured as 2^15 units per full cycle and
//! return a signed Q12 amplitude in `[-4096, 4096]`. They are pure functions
//! with no state, so they are safe to call from any context.
//!
//! Two precision levels are provided:
//! - [`isin_s3`]: third-order parabolic form. Exact at 0, π/2, π and 3π/2
//!   and monotonic between; cheap enough for control-rate table building
//!   where a 256-slot table already bounds error.
//! - [`isin_s4`]: fourth-order cosine-derived form. Slightly more accurate
//!   at the same per-call cost, so the audio-rate oscillators use this one.
//!   Callers running a 32-bit phase accumulator pass it straight in
//!   (reinterpreted as `i32`); the kernel masks down to one cycle itself.
//!
//! Conventions:
//! - Phase wraps implicitly; any `i32` is a valid argument.
//! - Output is Q12: full scale is `1 << 12`.

/// Number of fractional bits in the output of both kernels.
pub const SINE_Q: u32 = 12;

/// Full-scale output amplitude (`1 << SINE_Q`).
pub const SINE_SCALE: i32 = 1 << SINE_Q;

/// Phase units per full cycle for both kernels.
pub const PHASE_CYCLE: i32 = 1 << 15;

/// Third-order sine approximation.
///
/// `x` is an angle with 2^15 units per circle; the return value is Q12.
///
/// The quarter-wave parabola is `S(x) = x * ((3<<p) - (x*x >> r)) >> s` with
/// the Q positions chosen so the curve passes exactly through the axis
/// crossings and the ±1 peaks:
///
/// - n = 13 : Q-pos for a quarter circle
/// - A = 12 : Q-pos for the output
/// - p = 15 : Q-pos for the parenthesized intermediate
/// - r = 2n - p = 11
/// - s = n + p + 1 - A = 17
#[inline]
pub fn isin_s3(x: i32) -> i32 {
    const QN: u32 = 13;
    const QP: u32 = 15;
    const QR: u32 = 2 * QN - QP;
    const QS: u32 = QN + QP + 1 - SINE_Q;

    // Shift to the full i32 range (Q13 -> Q30) so the top two bits carry the
    // quadrant. Bits shifted off the top are an intentional phase wrap.
    let mut x = x.wrapping_shl(30 - QN);

    // Quadrants 1 and 2 mirror around the vertical axis.
    if (x ^ (x << 1)) < 0 {
        x = i32::MIN.wrapping_sub(x);
    }

    x >>= 30 - QN;

    x * ((3 << QP) - ((x * x) >> QR)) >> QS
}

/// Fourth-order sine approximation via a cosine kernel.
///
/// `x` is an angle with 2^15 units per circle; the return value is Q12.
/// B and C are the fitted polynomial constants of the original fixed-point
/// design; changing them shifts the error away from the zero crossings.
#[inline]
pub fn isin_s4(x: i32) -> i32 {
    const QN: u32 = 13;
    const B: i32 = 19900;
    const C: i32 = 3516;

    // Semicircle info lands in the sign bit of c.
    let c = x.wrapping_shl(30 - QN);

    // sine -> cosine (quarter-circle shift), then mask with pi. The right
    // shift is SIGNED, bringing x back to Q13 with its sign intact.
    let mut x = x.wrapping_sub(1 << QN);
    x = x.wrapping_shl(31 - QN);
    x >>= 31 - QN;

    x = (x * x) >> (2 * QN - 14); // x = x^2, to Q14

    let y = B - ((x * C) >> 14); // B - x^2*C
    let y = (1 << SINE_Q) - ((x * y) >> 16); // A - x^2*(B - x^2*C)

    if c >= 0 {
        y
    } else {
        -y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_exact_at_axis_points() {
        // Zero crossings at 0 and half cycle, peaks at the quarter points.
        assert_eq!(isin_s3(0), 0);
        assert_eq!(isin_s3(PHASE_CYCLE / 2), 0);
        assert_eq!(isin_s3(PHASE_CYCLE / 4), SINE_SCALE);
        assert_eq!(isin_s3(3 * PHASE_CYCLE / 4), -SINE_SCALE);
    }

    #[test]
    fn s3_bounded_over_full_cycle() {
        for x in 0..PHASE_CYCLE {
            let v = isin_s3(x);
            assert!(v.abs() <= SINE_SCALE, "x={x} v={v}");
        }
    }

    #[test]
    fn s3_wraps_phase() {
        for x in [0, 100, PHASE_CYCLE / 4, PHASE_CYCLE - 1] {
            assert_eq!(isin_s3(x), isin_s3(x + PHASE_CYCLE));
            assert_eq!(isin_s3(x), isin_s3(x + 5 * PHASE_CYCLE));
        }
    }

    #[test]
    fn s3_monotonic_in_first_quadrant() {
        let mut prev = isin_s3(0);
        for x in 1..(PHASE_CYCLE / 4) {
            let v = isin_s3(x);
            assert!(v >= prev, "dip at x={x}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn s4_zero_crossings_and_bounds() {
        assert_eq!(isin_s4(0), 0);
        assert_eq!(isin_s4(PHASE_CYCLE / 2), 0);

        for x in 0..PHASE_CYCLE {
            let v = isin_s4(x);
            assert!(v.abs() <= SINE_SCALE, "x={x} v={v}");
        }
    }

    #[test]
    fn s4_half_wave_symmetry() {
        // sin(x + pi) == -sin(x)
        for x in 0..(PHASE_CYCLE / 2) {
            assert_eq!(isin_s4(x), -isin_s4(x + PHASE_CYCLE / 2), "x={x}");
        }
    }

    #[test]
    fn s4_wraps_accumulator_phase() {
        // A free-running u32 accumulator reinterpreted as i32 behaves like
        // its angle reduced modulo one cycle.
        for phase in [0x0000_1234_u32, 0x8001_7fff, 0xdead_beef, 0xffff_ffff] {
            let reduced = (phase % (PHASE_CYCLE as u32)) as i32;
            assert_eq!(isin_s4(phase as i32), isin_s4(reduced));
        }
    }

    #[test]
    fn s4_tracks_s3_within_their_error_envelope() {
        // The two forms approximate the same wave with different error
        // profiles; measured over the full cycle they diverge by up to 95
        // counts (about 2.3% of full scale) and never disagree on sign.
        for x in 0..PHASE_CYCLE {
            let a = isin_s3(x);
            let b = isin_s4(x);
            assert!((a - b).abs() <= 96, "x={x} s3={a} s4={b}");
            assert!(a.signum() * b.signum() >= 0, "x={x} s3={a} s4={b}");
        }
    }
}
