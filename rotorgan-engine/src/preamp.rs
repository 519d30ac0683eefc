//! Preamp drive stage.
//!
//! Models the tube preamp of the speaker cabinet with the classic
//! arc-tangent waveshaper `y = atan(k*x) / atan(k)`: odd-symmetric soft
//! clipping, transparent at small k and progressively compressed as k
//! grows. The shaper is baked into a full-range 16-bit lookup at control
//! rate so the audio path is a single table read per sample.

use rotorgan_core::levels;

use crate::graph::BlockEffect;

/// One entry per possible 16-bit input sample.
const LOOKUP_LEN: usize = 1 << 16;

pub struct Preamp {
    /// Indexed by `sample + 32768`. Heap-allocated once at construction and
    /// rewritten in place by [`Preamp::set_k`].
    lookup: Box<[i16]>,
}

impl Preamp {
    pub fn new(k: f32) -> Self {
        let mut preamp = Self {
            lookup: vec![0i16; LOOKUP_LEN].into_boxed_slice(),
        };
        preamp.set_k(k);
        preamp
    }

    /// Set the drive amount. Non-positive k degenerates toward the identity
    /// shaper, so it is clamped to a small positive value instead of faulted.
    pub fn set_k(&mut self, k: f32) {
        let k = if k <= 0.0 { 0.0001 } else { k };

        let inv_atank = 1.0 / levels::atan(k) * (1 << 15) as f32;
        let kscale = k / (1 << 15) as f32;
        for (i, slot) in self.lookup.iter_mut().enumerate() {
            *slot = (levels::atan((i as f32 - 32768.0) * kscale) * inv_atank) as i16;
        }
    }

    pub fn process(&mut self, block: &mut [i16]) {
        for sample in block.iter_mut() {
            *sample = self.lookup[(i32::from(*sample) + 32768) as usize];
        }
    }
}

impl BlockEffect for Preamp {
    fn process(&mut self, block: &mut [i16]) {
        Preamp::process(self, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_in_zero_out() {
        let mut preamp = Preamp::new(4.0);
        let mut block = [0i16; 8];
        preamp.process(&mut block);
        assert!(block.iter().all(|&v| v == 0));
    }

    #[test]
    fn tiny_k_is_near_identity() {
        // atan(k*x)/atan(k) approaches x/1 as k approaches 0.
        let mut preamp = Preamp::new(0.0);
        let mut block = [-32768, -12345, -100, 0, 100, 12345, 32767];
        let input = block;
        preamp.process(&mut block);
        for (got, want) in block.iter().zip(input.iter()) {
            assert!((i32::from(*got) - i32::from(*want)).abs() <= 2, "{want}");
        }
    }

    #[test]
    fn shaper_is_odd_and_monotonic() {
        let mut preamp = Preamp::new(6.0);

        let mut pos = [100, 5000, 20000, 32767];
        let mut neg = [-100, -5000, -20000, -32767];
        preamp.process(&mut pos);
        preamp.process(&mut neg);
        for (p, n) in pos.iter().zip(neg.iter()) {
            assert!((i32::from(*p) + i32::from(*n)).abs() <= 1);
        }
        assert!(pos.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn drive_compresses_mid_level_signal() {
        // With heavy drive a half-scale input lands well above half-scale
        // output, while full scale stays pinned at full scale.
        let mut preamp = Preamp::new(10.0);
        let mut block = [16384i16, 32767];
        preamp.process(&mut block);
        assert!(block[0] > 26_000, "got {}", block[0]);
        assert!(i32::from(block[1]) >= 32_700);
    }
}
