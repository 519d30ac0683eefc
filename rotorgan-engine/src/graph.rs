//! Block-synchronous processing contracts.
//!
//! The engine is driven by an external scheduler that moves fixed-size
//! sample blocks at a steady cadence. Components implement one of two small
//! traits and otherwise know nothing about their host:
//!
//! - [`BlockSource`] : fills a block from internal state (the oscillator bank)
//! - [`BlockEffect`] : rewrites a block in place (scanner, preamp, rotary)
//!
//! Design goals
//! - No dynamic allocations and no locking anywhere on the block path
//! - Control-rate setters are plain field writes; a change may land mid-block
//!   or one block late, which is accepted, but indices are always masked so
//!   no torn update can produce an out-of-bounds access
//! - Every block is processed to completion; there is no cancellation

/// Fixed deployment sample rate. All phase increments are derived from it.
pub const SAMPLE_RATE_HZ: u32 = 44_100;

/// Samples per block. Hosts must use the same length for every call in a
/// session; the bank's scratch accumulator is sized to this.
pub const BLOCK_LEN: usize = 128;

/// Anything that can produce a block of mono i16 samples from its own state.
pub trait BlockSource {
    /// Overwrite `block` with the next `block.len()` samples.
    fn fill(&mut self, block: &mut [i16]);
}

/// Anything that rewrites a block of mono i16 samples in place.
pub trait BlockEffect {
    /// Process `block` in place, one output sample per input sample.
    fn process(&mut self, block: &mut [i16]);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dc(i16);
    impl BlockSource for Dc {
        fn fill(&mut self, block: &mut [i16]) {
            block.fill(self.0);
        }
    }

    struct Half;
    impl BlockEffect for Half {
        fn process(&mut self, block: &mut [i16]) {
            for v in block.iter_mut() {
                *v /= 2;
            }
        }
    }

    #[test]
    fn source_then_effect_compose() {
        let mut block = [0i16; BLOCK_LEN];
        Dc(1000).fill(&mut block);
        Half.process(&mut block);
        assert!(block.iter().all(|&v| v == 500));
    }
}
