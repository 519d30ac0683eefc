//! Complete instrument: manual, tonewheel generator, and speaker chain.
//!
//! Owns one of everything and wires the two rates together. Control calls
//! mutate state (key and drawbar changes resync the generator volumes
//! immediately); [`Organ::render_block`] runs the audio-rate chain
//!
//! ```text
//! tonewheels -> scanner -> preamp -> rotary -> meter
//! ```
//!
//! once per block. Nothing in the render path allocates or blocks; a
//! control change may land mid-block, which is accepted.

use crate::graph::BlockSource;
use crate::manual::Manual;
use crate::meter::PeakMeter;
use crate::preamp::Preamp;
use crate::rotary::RotarySpeaker;
use crate::scanner::{Scanner, VibratoMode};
use crate::tonewheels::{TonewheelBank, NUM_TONEWHEELS};

/// Default preamp drive. Mild warmth rather than obvious distortion.
const DEFAULT_DRIVE_K: f32 = 2.0;

pub struct Organ {
    manual: Manual,
    bank: TonewheelBank,
    scanner: Scanner,
    preamp: Preamp,
    rotary: RotarySpeaker,
    meter: PeakMeter,

    /// Scratch for the manual's Q14 volume vector, reused across updates.
    volumes: [u16; NUM_TONEWHEELS],
}

impl Organ {
    pub fn new() -> Self {
        Self {
            manual: Manual::new(),
            bank: TonewheelBank::new(),
            scanner: Scanner::new(),
            preamp: Preamp::new(DEFAULT_DRIVE_K),
            rotary: RotarySpeaker::new(),
            meter: PeakMeter::new(),
            volumes: [0; NUM_TONEWHEELS],
        }
    }

    fn sync_volumes(&mut self) {
        self.manual.fill_volumes(&mut self.volumes);
        self.bank.set_manual_volumes(&self.volumes);
    }

    pub fn key_down(&mut self, key: u8) {
        self.manual.key_down(key);
        self.sync_volumes();
    }

    pub fn key_up(&mut self, key: u8) {
        self.manual.key_up(key);
        self.sync_volumes();
    }

    /// Replace the whole key state from a 61-bit mask (bit 0 = key 1).
    pub fn set_keys(&mut self, mask: u64) {
        self.manual.set_keys(mask);
        self.sync_volumes();
    }

    pub fn set_drawbar(&mut self, drawbar: u8, position: u8) {
        self.manual.set_drawbar(drawbar, position);
        self.sync_volumes();
    }

    pub fn set_drawbars(&mut self, positions: &[u8; 9]) {
        self.manual.set_drawbars(positions);
        self.sync_volumes();
    }

    /// Drive a pedal tonewheel (1..=12) directly; the manual never writes
    /// these, so a pedal level set here persists across key changes.
    /// Indexes outside the pedal range are ignored.
    pub fn set_pedal_volume(&mut self, wheel: u8, volume: u8) {
        if (1..=12).contains(&wheel) {
            self.bank.set_volume(wheel, volume);
        }
    }

    pub fn set_vibrato_mode(&mut self, mode: VibratoMode) {
        self.scanner.set_mode(mode);
    }

    pub fn set_drive(&mut self, k: f32) {
        self.preamp.set_k(k);
    }

    pub fn set_rotation_rate(&mut self, hz: f32) {
        self.rotary.set_rotation_rate(hz);
    }

    pub fn set_tremolo_depth(&mut self, depth: f32) {
        self.rotary.set_tremolo_depth(depth);
    }

    pub fn set_delay_depth(&mut self, ms: f32) {
        self.rotary.set_delay_depth(ms);
    }

    /// Render the next audio block in place.
    pub fn render_block(&mut self, block: &mut [i16]) {
        self.bank.fill(block);
        self.scanner.process(block);
        self.preamp.process(block);
        self.rotary.process(block);
        self.meter.scan(block);
    }

    pub fn meter(&self) -> &PeakMeter {
        &self.meter
    }

    pub fn meter_reset(&mut self) {
        self.meter.reset();
    }
}

impl Default for Organ {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSource for Organ {
    fn fill(&mut self, block: &mut [i16]) {
        self.render_block(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BLOCK_LEN;

    fn render(organ: &mut Organ) -> [i16; BLOCK_LEN] {
        let mut block = [0i16; BLOCK_LEN];
        organ.render_block(&mut block);
        block
    }

    #[test]
    fn silent_until_played() {
        let mut organ = Organ::new();
        assert!(render(&mut organ).iter().all(|&v| v == 0));

        // Keys without drawbars stay silent.
        organ.key_down(25);
        assert!(render(&mut organ).iter().all(|&v| v == 0));

        // Pulling a drawbar makes sound.
        organ.set_drawbar(3, 8);
        let heard = (0..10).any(|_| render(&mut organ).iter().any(|&v| v != 0));
        assert!(heard);

        // Releasing the key silences it again.
        organ.key_up(25);
        let mut quiet = [0i16; BLOCK_LEN];
        for _ in 0..5 {
            quiet = render(&mut organ);
        }
        assert!(quiet.iter().all(|&v| v == 0));
    }

    #[test]
    fn pedal_volume_survives_key_changes() {
        let mut organ = Organ::new();
        organ.set_pedal_volume(1, 200);

        // A full resync of the manual state must leave the pedal wheel lit.
        organ.set_drawbars(&[8; 9]);
        organ.set_keys(0x1F);
        organ.set_keys(0);

        let heard = (0..10).any(|_| render(&mut organ).iter().any(|&v| v != 0));
        assert!(heard);
    }

    #[test]
    fn pedal_setter_rejects_manual_wheels() {
        let mut organ = Organ::new();
        organ.set_pedal_volume(0, 255);
        organ.set_pedal_volume(13, 255);
        organ.set_pedal_volume(91, 255);
        assert!(render(&mut organ).iter().all(|&v| v == 0));
    }

    #[test]
    fn meter_follows_output() {
        let mut organ = Organ::new();
        organ.set_drawbars(&[8, 8, 8, 0, 0, 0, 0, 0, 0]);
        organ.key_down(30);
        for _ in 0..20 {
            render(&mut organ);
        }
        assert!(organ.meter().max() > 0);
        assert!(organ.meter().min() < 0);

        let max_ever = organ.meter().max_ever();
        organ.meter_reset();
        assert_eq!(organ.meter().max(), 0);
        assert_eq!(organ.meter().max_ever(), max_ever);
    }

    #[test]
    fn full_chord_never_clips() {
        // Worst case control state, every stage engaged. Normalization
        // upstream has to keep the whole chain inside 16 bits, so nothing
        // should sit hard against the rails.
        let mut organ = Organ::new();
        organ.set_keys((1u64 << 61) - 1);
        organ.set_drawbars(&[8; 9]);
        organ.set_vibrato_mode(VibratoMode::C3);
        organ.set_rotation_rate(6.8);
        organ.set_tremolo_depth(0.5);
        organ.set_delay_depth(1.18);

        let mut railed = 0u32;
        for _ in 0..100 {
            for &v in render(&mut organ).iter() {
                if v == i16::MAX || v == i16::MIN {
                    railed += 1;
                }
            }
        }
        // The preamp shaper may graze full scale; sustained railing would
        // mean an overflow upstream.
        assert!(railed < 64, "railed {railed} samples");
    }
}
