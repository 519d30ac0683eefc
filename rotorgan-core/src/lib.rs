#![cfg_attr(not(feature = "std"), no_std)]
//! Rotorgan Core — no_std-ready fixed-point DSP primitives for a tonewheel
//! organ and rotary speaker engine.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use the `libm` math backend
//! - `micromath`: use `micromath` approximations instead of `libm`
//!
//! Modules
//! - [`trig`]     : integer sine kernels over a 2^15-unit phase circle (Q12 out)
//! - [`modtable`] : 256-slot single-cycle modulation table generator
//! - [`levels`]   : dB/linear conversions and 16-bit dBFS helpers
//!
//! Design
//! - No heap allocations; everything is a pure function over integers
//! - Floating point appears only in [`levels`] and control-rate callers;
//!   the audio-rate path is fixed point end to end
//! - Friendly to embedded / real-time targets

pub mod levels;
pub mod modtable;
pub mod trig;

/// Commonly used items for convenience:
pub mod prelude {
    pub use crate::levels::{db_to_lin, dbfs_i16, lin_to_db};
    pub use crate::modtable::{fill_sinemod, MOD_TABLE_LEN};
    pub use crate::trig::{isin_s3, isin_s4, PHASE_CYCLE, SINE_SCALE};
}

#[cfg(test)]
mod smoke {

    #[test]
    fn prelude_exists() {
        use crate::prelude::*;
        assert_eq!(isin_s3(0), 0);
        assert_eq!(isin_s4(PHASE_CYCLE / 2), 0);
        let mut table = [0i16; MOD_TABLE_LEN];
        fill_sinemod(&mut table, -(SINE_SCALE as i16), SINE_SCALE as i16, 0);
        let _ = lin_to_db(db_to_lin(-6.0));
    }
}
