//! Vibrato/chorus scanner.
//!
//! The electromechanical scanner this models is a 1 ms delay line with nine
//! taps and a rotating crossfade that sweeps across the taps and back at
//! 7 Hz. Here that is a short ring buffer whose read pointer sways behind
//! the write pointer by a triangle wave; chorus modes mix the swept signal
//! 50/50 with the dry input.

use crate::graph::BlockEffect;

/// Scanner delay line length. Power of two so the read position masks.
const SCAN_BUF_LEN: usize = 128;

/// Write pointer lead over the unmodulated read position: 1 ms at 44.1 kHz.
const SCAN_DELAY: u8 = 34;

/// Triangle phase increment per sample, 7 Hz over a 32-bit accumulator.
const SCAN_PHASE_INCR: u32 = 679_632;

/// The six scanner settings of the instrument plus bypass.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VibratoMode {
    Off,
    V1,
    V2,
    V3,
    C1,
    C2,
    C3,
}

pub struct Scanner {
    buf: [i16; SCAN_BUF_LEN],
    wp: u8,

    scan_phase: u32,

    /// Right shift applied to the triangle wave; higher is less sway.
    depth: u32,
    /// Chorus modes mix the swept signal with the dry input.
    mix: bool,
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            buf: [0; SCAN_BUF_LEN],
            wp: SCAN_DELAY,
            scan_phase: 0,
            depth: 8,
            mix: false,
        }
    }

    pub fn set_mode(&mut self, mode: VibratoMode) {
        let (depth, mix) = match mode {
            VibratoMode::Off => (8, false),
            VibratoMode::V1 => (3, false),
            VibratoMode::V2 => (2, false),
            VibratoMode::V3 => (1, false),
            VibratoMode::C1 => (3, true),
            VibratoMode::C2 => (2, true),
            VibratoMode::C3 => (1, true),
        };
        self.depth = depth;
        self.mix = mix;
    }

    /// Signed 31-bit triangle from a 32-bit phase.
    #[inline]
    fn triangle(phase: u32) -> u32 {
        if phase & 0x8000_0000 != 0 {
            0x8000_0000u32
                .wrapping_add(0x8000_0000u32.wrapping_sub(phase))
        } else {
            phase
        }
    }

    #[inline]
    fn lerp(a: i32, b: i32, scale: i32) -> i32 {
        ((0xFFFF - scale) * a + scale * b) >> 16
    }

    /// Process one block in place.
    ///
    /// The read position is derived from the write pointer each sample,
    /// 8.24 fixed point, with the triangle subtracted after the depth
    /// shift. The deepest setting sways 5 bits on a 7-bit counter and the
    /// write pointer leads by 34 samples, so reads never outrun writes.
    pub fn process(&mut self, block: &mut [i16]) {
        let mut wp = usize::from(self.wp);
        let mut phase = self.scan_phase;

        for sample in block.iter_mut() {
            self.buf[wp] = *sample;

            let rp = ((wp as i32) << 24)
                .wrapping_sub((Self::triangle(phase) >> self.depth) as i32);

            let pos = rp >> 24;
            let a = i32::from(self.buf[(pos & 0x7f) as usize]);
            let b = i32::from(self.buf[((pos + 1) & 0x7f) as usize]);

            let mut val = Self::lerp(a, b, (rp >> 8) & 0xFFFF);
            if self.mix {
                val = (val + i32::from(self.buf[wp])) >> 1;
            }
            *sample = val as i16;

            phase = phase.wrapping_add(SCAN_PHASE_INCR);
            wp = (wp + 1) & 0x7f;
        }

        self.wp = wp as u8;
        self.scan_phase = phase;
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockEffect for Scanner {
    fn process(&mut self, block: &mut [i16]) {
        Scanner::process(self, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BLOCK_LEN;

    fn sawtooth_block(start: i16) -> [i16; BLOCK_LEN] {
        let mut block = [0i16; BLOCK_LEN];
        for (i, v) in block.iter_mut().enumerate() {
            *v = start.wrapping_add((i as i16).wrapping_mul(257));
        }
        block
    }

    #[test]
    fn silence_in_silence_out() {
        let mut scanner = Scanner::new();
        scanner.set_mode(VibratoMode::C1);
        let mut block = [0i16; BLOCK_LEN];
        for _ in 0..10 {
            scanner.process(&mut block);
            assert!(block.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn constant_input_is_near_identity_in_every_mode() {
        // Delay and sway are invisible on DC; only rounding remains.
        let modes = [
            VibratoMode::Off,
            VibratoMode::V1,
            VibratoMode::V2,
            VibratoMode::V3,
            VibratoMode::C1,
            VibratoMode::C2,
            VibratoMode::C3,
        ];
        for mode in modes {
            let mut scanner = Scanner::new();
            scanner.set_mode(mode);
            let mut block = [1000i16; BLOCK_LEN];
            for _ in 0..5 {
                block = [1000i16; BLOCK_LEN];
                scanner.process(&mut block);
            }
            for &v in &block {
                assert!((i32::from(v) - 1000).abs() <= 1, "{mode:?}: got {v}");
            }
        }
    }

    #[test]
    fn depth_changes_the_output() {
        let mut shallow = Scanner::new();
        shallow.set_mode(VibratoMode::V3);
        let mut deep = Scanner::new();
        deep.set_mode(VibratoMode::V1);

        let mut differs = false;
        for n in 0..10 {
            let mut a = sawtooth_block(n * 31);
            let mut b = a;
            shallow.process(&mut a);
            deep.process(&mut b);
            differs |= a != b;
        }
        assert!(differs);
    }

    #[test]
    fn chorus_mixes_toward_dry() {
        // On a moving signal the chorus output sits between the swept
        // signal and the dry input, so C1 differs from both Off and V1.
        let mut vibrato = Scanner::new();
        vibrato.set_mode(VibratoMode::V1);
        let mut chorus = Scanner::new();
        chorus.set_mode(VibratoMode::C1);

        let mut differs = false;
        for n in 0..10 {
            let mut a = sawtooth_block(n * 31);
            let mut b = a;
            vibrato.process(&mut a);
            chorus.process(&mut b);
            differs |= a != b;
        }
        assert!(differs);
    }

    #[test]
    fn write_pointer_wraps_across_blocks() {
        let mut scanner = Scanner::new();
        scanner.set_mode(VibratoMode::V1);
        // 128-sample buffer and 128-sample blocks: many blocks exercise the
        // wrap on every sample index without going out of bounds.
        let mut block = sawtooth_block(0);
        for _ in 0..100 {
            scanner.process(&mut block);
        }
    }
}
