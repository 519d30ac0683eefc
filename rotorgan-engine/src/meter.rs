//! Output level metering.
//!
//! A pass-through tap that tracks sample extremes, for watching how much of
//! the 16-bit space the pipeline actually uses. Keeps a resettable window
//! (min/max since the last [`PeakMeter::reset`]) alongside lifetime
//! extremes that survive resets.

use rotorgan_core::levels::dbfs_i16;

use crate::graph::BlockEffect;

#[derive(Default)]
pub struct PeakMeter {
    min: i16,
    max: i16,
    min_ever: i16,
    max_ever: i16,
}

impl PeakMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a block without modifying it.
    pub fn scan(&mut self, block: &[i16]) {
        for &v in block {
            if v < self.min {
                self.min = v;
                if v < self.min_ever {
                    self.min_ever = v;
                }
            }
            if v > self.max {
                self.max = v;
                if v > self.max_ever {
                    self.max_ever = v;
                }
            }
        }
    }

    /// Clear the windowed extremes. Lifetime extremes are kept.
    pub fn reset(&mut self) {
        self.min = 0;
        self.max = 0;
    }

    pub fn min(&self) -> i16 {
        self.min
    }

    pub fn max(&self) -> i16 {
        self.max
    }

    pub fn min_ever(&self) -> i16 {
        self.min_ever
    }

    pub fn max_ever(&self) -> i16 {
        self.max_ever
    }

    /// Windowed peak level in dBFS, whichever polarity swings wider.
    pub fn peak_dbfs(&self) -> f32 {
        let peak = self.max.unsigned_abs().max(self.min.unsigned_abs());
        dbfs_i16(peak.min(i16::MAX as u16) as i16)
    }
}

impl BlockEffect for PeakMeter {
    fn process(&mut self, block: &mut [i16]) {
        self.scan(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_window_and_lifetime_extremes() {
        let mut meter = PeakMeter::new();
        meter.scan(&[0, 100, -200, 50]);
        assert_eq!(meter.min(), -200);
        assert_eq!(meter.max(), 100);

        meter.reset();
        assert_eq!(meter.min(), 0);
        assert_eq!(meter.max(), 0);
        assert_eq!(meter.min_ever(), -200);
        assert_eq!(meter.max_ever(), 100);

        meter.scan(&[-150, 300]);
        assert_eq!(meter.min(), -150);
        assert_eq!(meter.max(), 300);
        assert_eq!(meter.min_ever(), -200);
        assert_eq!(meter.max_ever(), 300);
    }

    #[test]
    fn peak_dbfs_reads_the_wider_swing() {
        let mut meter = PeakMeter::new();
        meter.scan(&[i16::MIN, 1000]);
        // |i16::MIN| saturates to full scale.
        assert!(meter.peak_dbfs().abs() < 0.01);

        let mut meter = PeakMeter::new();
        meter.scan(&[i16::MAX / 2]);
        assert!((meter.peak_dbfs() + 6.02).abs() < 0.1);
    }
}
