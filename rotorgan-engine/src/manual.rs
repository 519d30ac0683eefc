//! Manual mixer: keys + drawbars -> per-tonewheel volumes.
//!
//! Maintains the mapping between the physical keys of an organ manual and
//! the tonewheel oscillator bank. It models the resistive summing network of
//! the original instrument: each pressed key connects each lit drawbar
//! harmonic to a tonewheel bus through a tapering resistor, the currents add
//! in parallel, and each bus is weighted by the generator's factory output
//! voltage for that wheel.
//!
//! Output is a 92-entry (1-indexed) Q14 volume vector, normalized against
//! the theoretical maximum of the whole network (every key down, every
//! drawbar at 8) such that:
//! - the worst-case vector sum never exceeds 2^19, and
//! - a single lit (key, drawbar) pair never produces a nonzero volume below
//!   2^7, which keeps the oscillator's 12-bit sine above the truncation
//!   floor.
//!
//! Float arithmetic here is control-rate only; it derives the fixed-point
//! vector that the audio path consumes.

use crate::tonewheels::NUM_TONEWHEELS;

/// Keys on one manual. Key numbers are 1-indexed.
pub const NUM_KEYS: usize = 61;

/// Drawbars per manual. Drawbar numbers are 1-indexed.
pub const NUM_DRAWBARS: usize = 9;

/// Q position of the output volume vector.
pub const VOLUME_Q: u32 = 14;

/// Normalization target: worst-case sum of the output vector, 32.0 in Q14.
const VOLUME_SPAN: f32 = (1u32 << 19) as f32;

/// Semitone offset added to the key number per drawbar harmonic:
/// 16', 5 1/3', 8', 4', 2 2/3', 2', 1 3/5', 1 1/3', 1'.
const HARMONIC_OFFSETS: [u8; NUM_DRAWBARS] = [0, 19, 12, 24, 31, 36, 40, 43, 48];

/// Tonewheel output levels in Vpp, 1-indexed, from the post-1956 generator
/// calibration chart. Peak-to-peak levels because the mixer sums peak
/// amplitudes.
#[rustfmt::skip]
const WHEEL_VPP: [f32; NUM_TONEWHEELS] = [
    0.0,
    70.0, 69.2, 68.3, 67.3, 66.4, 65.5, 64.5, 63.6, 62.6, 61.7, 60.8, 60.0,
    15.0, 14.6, 14.3, 14.0, 13.6, 13.3, 13.0, 12.6, 12.3, 12.0, 11.6, 11.3,
    11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0,
    11.1, 11.2, 11.3, 11.4, 11.5, 11.7, 11.8, 12.0, 12.2, 12.5, 12.8, 13.0,
    13.2, 13.4, 13.6, 14.0, 14.2, 14.5, 14.7, 15.1, 15.2, 15.6, 15.8, 16.0,
    16.3, 16.6, 17.0, 17.3, 17.7, 18.0, 18.5, 18.8, 19.2, 19.4, 19.6, 19.8,
    20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0,
    20.0, 19.7, 19.3, 19.0, 18.7, 18.3, 18.0,
];

/// Wrap a computed tonewheel number back into the manual's wired range
/// 13..=91 by octaves. Wheels 1..=12 belong to the pedals, which is why the
/// lower bound is 13.
pub fn foldback(mut wheel: i32) -> usize {
    while wheel < 13 {
        wheel += 12;
    }
    while wheel > 91 {
        wheel -= 12;
    }
    wheel as usize
}

/// Tonewheel wired to `key` (1..=61) at `drawbar` (1..=9).
pub fn tonewheel(key: usize, drawbar: usize) -> usize {
    foldback(key as i32 + i32::from(HARMONIC_OFFSETS[drawbar - 1]))
}

/// Volume multiplier for a drawbar at `position`. Scaled so each stop
/// doubles acoustic power, normalized to 0.0..=1.0; that works out to
/// `position / 8`.
#[inline]
fn drawbar_volume(position: u8) -> f32 {
    0.125 * f32::from(position)
}

/// Resistance (in the network's relative ohm units) of the wire connecting
/// `key` to its tonewheel for each drawbar harmonic.
///
/// These piecewise tables reproduce the published manual-tapering chart as
/// literal data. Two harmonics look asymmetric next to their siblings (the
/// second harmonic has a branch its ordering can never reach, the fourth
/// tapers back up); that is how the chart reads, so it is preserved rather
/// than "fixed".
fn resistance(key: usize, drawbar: usize) -> f32 {
    match drawbar {
        1 => {
            if key < 11 {
                100.0
            } else if key < 17 {
                50.0
            } else if key < 25 {
                34.0
            } else if key < 37 {
                24.0
            } else if key < 49 {
                15.0
            } else {
                10.0
            }
        }
        2 => {
            if key < 15 {
                34.0
            } else if key < 39 {
                24.0
            } else if key < 15 {
                15.0
            } else {
                10.0
            }
        }
        3 => {
            if key < 16 {
                50.0
            } else if key < 24 {
                34.0
            } else if key < 38 {
                24.0
            } else if key < 50 {
                15.0
            } else {
                10.0
            }
        }
        4 => {
            if key < 14 {
                34.0
            } else if key < 40 {
                24.0
            } else {
                34.0
            }
        }
        5 => {
            if key < 13 {
                10.0
            } else if key < 21 {
                15.0
            } else if key < 41 {
                24.0
            } else if key < 53 {
                34.0
            } else {
                50.0
            }
        }
        6 => {
            if key < 12 {
                10.0
            } else if key < 21 {
                15.0
            } else if key < 42 {
                24.0
            } else if key < 56 {
                34.0
            } else {
                50.0
            }
        }
        7 => {
            if key < 19 {
                10.0
            } else if key < 43 {
                24.0
            } else if key < 52 {
                34.0
            } else {
                50.0
            }
        }
        8 => {
            if key < 44 {
                24.0
            } else if key < 49 {
                34.0
            } else {
                50.0
            }
        }
        9 => {
            if key < 44 {
                24.0
            } else {
                50.0
            }
        }
        _ => 0.0,
    }
}

/// Theoretical maximum total output: every key down, every drawbar at 8.
/// Independent of live state, so it is computed once and cached as the
/// normalization denominator.
fn max_volume() -> f32 {
    let mut inv_r = [0.0f32; NUM_TONEWHEELS];
    for key in 1..=NUM_KEYS {
        for drawbar in 1..=NUM_DRAWBARS {
            inv_r[tonewheel(key, drawbar)] += 1.0 / resistance(key, drawbar);
        }
    }

    let mut sum = 0.0;
    for wheel in 1..NUM_TONEWHEELS {
        sum += WHEEL_VPP[wheel] * inv_r[wheel];
    }
    sum
}

/// One organ manual: 61 keys and 9 drawbars feeding the resistive network.
pub struct Manual {
    /// Drawbar positions 0..=8, slot d-1 for drawbar d.
    drawbars: [u8; NUM_DRAWBARS],
    /// Key-down flags, 1-indexed (slot 0 unused).
    keys: [bool; NUM_KEYS + 1],
    /// 1 / theoretical maximum total, cached at construction.
    inv_max: f32,
}

impl Manual {
    pub fn new() -> Self {
        Self {
            drawbars: [0; NUM_DRAWBARS],
            keys: [false; NUM_KEYS + 1],
            inv_max: 1.0 / max_volume(),
        }
    }

    /// Set one drawbar (1..=9) to `position` (0..=8). Anything out of range
    /// is a no-op; control input must never destabilize the audio path.
    pub fn set_drawbar(&mut self, drawbar: u8, position: u8) {
        if (1..=NUM_DRAWBARS as u8).contains(&drawbar) && position <= 8 {
            self.drawbars[usize::from(drawbar) - 1] = position;
        }
    }

    /// Set all nine drawbars at once; each entry obeys the same range rules
    /// as [`Manual::set_drawbar`].
    pub fn set_drawbars(&mut self, positions: &[u8; NUM_DRAWBARS]) {
        for (d, &position) in positions.iter().enumerate() {
            self.set_drawbar(d as u8 + 1, position);
        }
    }

    /// Press key `key` (1..=61). Out of range is a no-op.
    pub fn key_down(&mut self, key: u8) {
        if (1..=NUM_KEYS as u8).contains(&key) {
            self.keys[usize::from(key)] = true;
        }
    }

    /// Release key `key` (1..=61). Out of range is a no-op.
    pub fn key_up(&mut self, key: u8) {
        if (1..=NUM_KEYS as u8).contains(&key) {
            self.keys[usize::from(key)] = false;
        }
    }

    /// Replace the whole key state from a 61-bit mask (bit 0 = key 1).
    pub fn set_keys(&mut self, mask: u64) {
        for key in 1..=NUM_KEYS {
            self.keys[key] = mask & (1u64 << (key - 1)) != 0;
        }
    }

    #[inline]
    pub fn drawbar(&self, drawbar: u8) -> u8 {
        if (1..=NUM_DRAWBARS as u8).contains(&drawbar) {
            self.drawbars[usize::from(drawbar) - 1]
        } else {
            0
        }
    }

    /// Compute the Q14 tonewheel volume vector for the current key and
    /// drawbar state.
    ///
    /// Accumulates inverse resistance per tonewheel bus (parallel resistors
    /// add as 1/R), weights each bus by its wheel's output voltage, then
    /// normalizes against the cached theoretical maximum. Truncation rather
    /// than rounding keeps the worst-case sum at or under 2^19.
    pub fn fill_volumes(&self, ret: &mut [u16; NUM_TONEWHEELS]) {
        let mut inv_r = [0.0f32; NUM_TONEWHEELS];

        for key in 1..=NUM_KEYS {
            if !self.keys[key] {
                continue;
            }
            for drawbar in 1..=NUM_DRAWBARS {
                let position = self.drawbars[drawbar - 1];
                if position == 0 {
                    continue;
                }
                inv_r[tonewheel(key, drawbar)] +=
                    drawbar_volume(position) / resistance(key, drawbar);
            }
        }

        ret[0] = 0;
        for wheel in 1..NUM_TONEWHEELS {
            let current = WHEEL_VPP[wheel] * inv_r[wheel];
            ret[wheel] = (self.inv_max * current * VOLUME_SPAN) as u16;
        }
    }
}

impl Default for Manual {
    fn default() -> Self {
        Self::new()
    }
}
