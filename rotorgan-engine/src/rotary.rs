//! Rotary speaker effect: phase-locked amplitude and delay modulation.
//!
//! Models a single rotating speaker with one rotation angle driving two
//! lookup tables. The delay table sweeps the read head of a short ring
//! buffer behind the write head (Doppler shift of the moving horn), the
//! volume table attenuates the delayed signal (the horn pointing away from
//! the listener). Locking both to the same phase is what makes it read as
//! one physical rotor instead of two unrelated LFOs.

use rotorgan_core::modtable::{fill_sinemod, MOD_TABLE_LEN};

use crate::graph::BlockEffect;

/// Ring buffer length in samples. At 44.1 kHz this allows up to 11.6 ms of
/// delay, comfortably past the ~1.18 ms a real treble horn induces.
pub const RING_LEN: usize = 512;

const RING_MASK: u32 = RING_LEN as u32 - 1;

/// Phase steps per second of rotation: 2^32 / 44100.
const PHASE_PER_HZ: f32 = 97_391.55;

/// A combined AM/FM effect over a 512-sample ring buffer.
///
/// The envelope tables hold 256 entries plus the first entry duplicated at
/// the end, so interpolation can index one past the table index blindly.
pub struct RotarySpeaker {
    ring: [i16; RING_LEN],
    wp: u32,

    phase: u32,
    phase_incr: u32,

    read_offset: [i16; MOD_TABLE_LEN + 1],
    read_volume: [i16; MOD_TABLE_LEN + 1],
}

impl RotarySpeaker {
    pub fn new() -> Self {
        let mut rotary = Self {
            ring: [0; RING_LEN],
            wp: 0,
            phase: 0,
            phase_incr: 0,
            read_offset: [0; MOD_TABLE_LEN + 1],
            read_volume: [0; MOD_TABLE_LEN + 1],
        };
        rotary.set_delay_depth(0.0);
        rotary.set_tremolo_depth(0.0);
        rotary.set_rotation_rate(0.0);
        rotary
    }

    /// Rotation speed in cycles per second. Negative rates stop the rotor.
    pub fn set_rotation_rate(&mut self, hz: f32) {
        self.phase_incr = (hz * PHASE_PER_HZ + 0.5) as u32;
    }

    /// Depth of the delay sweep in milliseconds, clamped to what the ring
    /// buffer can hold. A real Leslie treble horn rotates through about
    /// 0.04 m of path difference, or 1.18 ms at sea-level speed of sound.
    pub fn set_delay_depth(&mut self, ms: f32) {
        let max_delay = (44.1 * ms) as i32;
        let max_delay = max_delay.clamp(0, RING_LEN as i32) as i16;

        let mut table = [0i16; MOD_TABLE_LEN];
        fill_sinemod(&mut table, 0, max_delay, 0);
        self.read_offset[..MOD_TABLE_LEN].copy_from_slice(&table);
        self.read_offset[MOD_TABLE_LEN] = table[0];
    }

    /// Depth of the tremolo in 0..=1. At 0 the volume envelope sits at full
    /// scale; at 1 the signal dips all the way to silence once per cycle.
    pub fn set_tremolo_depth(&mut self, depth: f32) {
        let max_volume = 32767i32;
        let min_volume = (max_volume as f32 * (1.0 - depth)) as i32;
        let min_volume = min_volume.clamp(0, max_volume) as i16;

        let mut table = [0i16; MOD_TABLE_LEN];
        fill_sinemod(&mut table, min_volume, 32767, 0);
        self.read_volume[..MOD_TABLE_LEN].copy_from_slice(&table);
        self.read_volume[MOD_TABLE_LEN] = table[0];
    }

    /// Process one block in place.
    ///
    /// Per sample: write the input into the ring, split the rotation phase
    /// into a table index (top 8 bits) and interpolation fraction (next 16),
    /// interpolate both envelopes, then read the delayed sample with a dual
    /// tap lerped by the sub-sample fraction of the interpolated delay. The
    /// un-normalized delay interpolant carries the integer sample offset in
    /// its high 16 bits and the sub-sample fraction in its low 16; the
    /// sub-sample tap is what makes the Doppler sweep smooth instead of a
    /// stepped delay.
    pub fn process(&mut self, block: &mut [i16]) {
        for sample in block.iter_mut() {
            self.ring[(self.wp & RING_MASK) as usize] = *sample;

            let idx = (self.phase >> 24) as usize;
            let frac = ((self.phase >> 8) & 0xFFFF) as i32;
            let inv = 0x10000 - frac;

            let volume = (inv * i32::from(self.read_volume[idx])
                + frac * i32::from(self.read_volume[idx + 1]))
                >> 16;

            let delay = inv * i32::from(self.read_offset[idx])
                + frac * i32::from(self.read_offset[idx + 1]);
            let offset = (delay >> 16) as u32;
            let subfrac = delay & 0xFFFF;

            let tap0 = i32::from(self.ring[(self.wp.wrapping_sub(offset) & RING_MASK) as usize]);
            let tap1 =
                i32::from(self.ring[(self.wp.wrapping_sub(offset + 1) & RING_MASK) as usize]);
            let delayed = ((0x10000 - subfrac) * tap0 + subfrac * tap1) >> 16;

            *sample = ((delayed * volume) >> 15) as i16;

            self.phase = self.phase.wrapping_add(self.phase_incr);
            self.wp = self.wp.wrapping_add(1);
        }
    }
}

impl Default for RotarySpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockEffect for RotarySpeaker {
    fn process(&mut self, block: &mut [i16]) {
        RotarySpeaker::process(self, block);
    }
}
