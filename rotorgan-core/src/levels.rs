//! Level conversions between dB and linear gain, plus 16-bit dBFS helpers.
//!
//! The synthesis path itself is pure fixed point; floating point shows up
//! only here and at control rate (deriving constants, metering readouts).
//! The math backend follows the crate features so the conversions stay
//! available on `no_std` targets:
//! - `micromath` : approximate f32 math, works in `no_std`
//! - `no-std`    : `libm` (C math) backed
//! - default     : plain `std` intrinsics

use cfg_if::cfg_if;

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_ln(x: f32) -> f32 { x.ln() }
        #[inline] fn m_atan(x: f32) -> f32 { x.atan() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_exp(x: f32) -> f32 { libm::expf(x) }
        #[inline] fn m_ln(x: f32) -> f32 { libm::logf(x) }
        #[inline] fn m_atan(x: f32) -> f32 { libm::atanf(x) }
    // std backend
    } else {
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_ln(x: f32) -> f32 { x.ln() }
        #[inline] fn m_atan(x: f32) -> f32 { x.atan() }
    }
}

/// Floor used when converting a vanishing linear level to dB.
pub const DB_FLOOR: f32 = -120.0;

/// Convert dB to linear gain: `lin = 10^(db/20)`.
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    if db <= DB_FLOOR {
        0.0
    } else {
        m_exp(0.11512925464970229_f32 * db) // ln(10)/20
    }
}

/// Convert linear gain to dB: `db = 20*log10(lin)`.
#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    if lin <= 1.0e-20 {
        DB_FLOOR
    } else {
        8.685889638065036553_f32 * m_ln(lin) // 20/ln(10)
    }
}

/// Arc tangent, routed through the active math backend. Used by waveshaper
/// table construction at control rate.
#[inline]
pub fn atan(x: f32) -> f32 {
    m_atan(x)
}

/// dBFS of a signed 16-bit sample: 0 dBFS at full scale, [`DB_FLOOR`] at 0.
#[inline]
pub fn dbfs_i16(v: i16) -> f32 {
    let mag = (i32::from(v)).unsigned_abs() as f32 / 32768.0;
    lin_to_db(mag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_lin_roundtrip() {
        for db in [-60.0, -20.0, -6.0, 0.0, 6.0, 12.0, 24.0] {
            let lin = db_to_lin(db);
            let back = lin_to_db(lin);
            assert!((db - back).abs() < 0.1, "db={}, back={}", db, back);
        }
    }

    #[test]
    fn dbfs_anchors() {
        assert!((dbfs_i16(i16::MAX) - 0.0).abs() < 0.01);
        assert!((dbfs_i16(i16::MIN / 2) - -6.02).abs() < 0.1);
        assert_eq!(dbfs_i16(0), DB_FLOOR);
    }
}
