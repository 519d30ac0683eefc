//! Tonewheel oscillator bank.
//!
//! Simulates the 91 spinning tonewheels of an electromechanical organ as a
//! bank of phase-accumulating sine oscillators. Arrays are sized 92 and
//! 1-indexed so wheel numbers match the real-world service numbering; slot 0
//! is never sounded. Wheels 1..=12 are the pedal wheels; the manual mixer
//! never writes them, but a pedal caller may drive them directly through
//! [`TonewheelBank::set_volume`].
//!
//! Each wheel runs a 32-bit phase accumulator advanced by a per-wheel
//! increment derived once, at construction, from the real-world frequency
//! table and the fixed sample rate. Volume changes never touch phase, so the
//! oscillator itself is always continuous; any audible step on a volume
//! change is the discrete volume itself, which is a characteristic of the
//! instrument, not a defect.

use crate::graph::{BlockSource, BLOCK_LEN, SAMPLE_RATE_HZ};
use rotorgan_core::trig::isin_s4;

/// 91 tonewheels plus one slot so arrays use 1-indexed wheel numbers.
pub const NUM_TONEWHEELS: usize = 92;

/// Real-world tonewheel frequencies in Hz, 1-indexed (slot 0 unused).
///
/// These are the gear-ratio pitches of the original generator, not equal
/// temperament; they are the source data every phase increment is derived
/// from.
#[rustfmt::skip]
const WHEEL_FREQS_HZ: [f32; NUM_TONEWHEELS] = [
    0.0,
    32.6923, 34.6341, 36.7123, 38.8889, 41.2000, 43.6364,
    46.2500, 49.0000, 51.8919, 55.0000, 58.2609, 61.7143,
    65.3846, 69.2683, 73.4247, 77.7778, 82.4000, 87.2727,
    92.5000, 98.0000, 103.7838, 110.0000, 116.5217, 123.4286,
    130.7692, 138.5366, 146.8493, 155.5556, 164.8000, 174.5455,
    185.0000, 196.0000, 207.5676, 220.0000, 233.0435, 246.8571,
    261.5385, 277.0732, 293.6986, 311.1111, 329.6000, 349.0909,
    370.0000, 392.0000, 415.1351, 440.0000, 466.0870, 493.7143,
    523.0769, 554.1463, 587.3973, 622.2222, 659.2000, 698.1818,
    740.0000, 784.0000, 830.2703, 880.0000, 932.1739, 987.4286,
    1046.1538, 1108.2927, 1174.7945, 1244.4444, 1318.4000, 1396.3636,
    1480.0000, 1568.0000, 1660.5405, 1760.0000, 1864.3478, 1974.8571,
    2092.3077, 2216.5854, 2349.5890, 2488.8889, 2636.8000, 2792.7273,
    2960.0000, 3136.0000, 3321.0811, 3520.0000, 3728.6957, 3949.7143,
    4189.0909, 4440.0000, 4704.0000, 4981.6216, 5280.0000, 5593.0435,
    5924.5714,
];

/// 15-bit phase increment for `freq` at the deployment sample rate.
///
/// One cycle is 2^15 phase units, so the increment is `freq * 2^15 / sr`,
/// rounded. Float is used only for this offline derivation.
#[inline]
fn freq_incr15(freq: f32) -> u32 {
    let units_per_hz = (1u32 << 15) as f32 / SAMPLE_RATE_HZ as f32;
    (freq * units_per_hz + 0.5) as u32
}

/// Bank of 91 independently phased tonewheel oscillators.
pub struct TonewheelBank {
    /// Constant after construction.
    phase_incrs: [u32; NUM_TONEWHEELS],
    /// 32-bit accumulators; wrap modulo 2^32. Mutated every block.
    phases: [u32; NUM_TONEWHEELS],
    /// Linear 0..255 gains. Mutated only by control-rate calls.
    volumes: [u8; NUM_TONEWHEELS],
}

impl TonewheelBank {
    pub fn new() -> Self {
        let mut phase_incrs = [0u32; NUM_TONEWHEELS];
        for (incr, freq) in phase_incrs.iter_mut().zip(WHEEL_FREQS_HZ.iter()) {
            *incr = freq_incr15(*freq);
        }
        Self {
            phase_incrs,
            phases: [0; NUM_TONEWHEELS],
            volumes: [0; NUM_TONEWHEELS],
        }
    }

    /// Set one wheel's linear volume. Wheel numbers outside 1..=91 are a
    /// no-op: control input is trusted but must never destabilize audio.
    #[inline]
    pub fn set_volume(&mut self, wheel: u8, volume: u8) {
        let wheel = wheel as usize;
        if wheel > 0 && wheel < NUM_TONEWHEELS {
            self.volumes[wheel] = volume;
        }
    }

    /// Copy a Q14 manual-mixer volume vector into the manual wheels 13..=91.
    ///
    /// Pedal wheels 1..=12 belong to a different caller and are left alone.
    /// Q14 values are narrowed to the bank's linear 0..255 range.
    pub fn set_manual_volumes(&mut self, q14: &[u16; NUM_TONEWHEELS]) {
        for wheel in 13..NUM_TONEWHEELS {
            self.volumes[wheel] = (q14[wheel] >> 6).min(255) as u8;
        }
    }

    #[inline]
    pub fn volume(&self, wheel: u8) -> u8 {
        let wheel = wheel as usize;
        if wheel > 0 && wheel < NUM_TONEWHEELS {
            self.volumes[wheel]
        } else {
            0
        }
    }

    /// Fill `block` with the summed output of every sounding wheel.
    ///
    /// Per wheel with nonzero volume: advance phase by the fixed increment
    /// once per output sample, evaluate the fourth-order sine, scale by the
    /// volume and accumulate. Headroom is guaranteed upstream by the manual
    /// mixer's normalization, so there is no per-wheel limiting here. Phase
    /// persists across calls.
    ///
    /// Slices longer than [`BLOCK_LEN`] are processed in block-sized chunks
    /// so every sample of `block` is overwritten.
    pub fn fill(&mut self, block: &mut [i16]) {
        for chunk in block.chunks_mut(BLOCK_LEN) {
            self.fill_chunk(chunk);
        }
    }

    fn fill_chunk(&mut self, block: &mut [i16]) {
        let len = block.len();
        let mut acc = [0i32; BLOCK_LEN];

        for wheel in 1..NUM_TONEWHEELS {
            let volume = i32::from(self.volumes[wheel]);
            if volume == 0 {
                continue;
            }
            let incr = self.phase_incrs[wheel];
            let mut phase = self.phases[wheel];

            for slot in acc[..len].iter_mut() {
                phase = phase.wrapping_add(incr);
                // Q12 sine * 8-bit volume, down to a per-wheel peak of 2^10.
                *slot += (isin_s4(phase as i32) * volume) >> 10;
            }
            self.phases[wheel] = phase;
        }

        for (out, &sum) in block.iter_mut().zip(acc[..len].iter()) {
            *out = sum.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        }
    }
}

impl Default for TonewheelBank {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSource for TonewheelBank {
    #[inline]
    fn fill(&mut self, block: &mut [i16]) {
        TonewheelBank::fill(self, block);
    }
}
