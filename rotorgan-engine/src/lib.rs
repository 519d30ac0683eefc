//! Rotorgan Engine — tonewheel generator + rotary speaker chain.
//!
//! Crate layout:
//! - [`graph`]      : block-rate `BlockSource`/`BlockEffect` traits and timing constants
//! - [`manual`]     : keys + drawbars resolved to per-tonewheel volumes
//! - [`tonewheels`] : the 91-oscillator fixed-point generator bank
//! - [`scanner`]    : vibrato/chorus scanner delay line
//! - [`preamp`]     : arc-tangent drive stage
//! - [`rotary`]     : rotating-speaker AM/FM effect
//! - [`meter`]      : pass-through peak metering
//! - [`organ`]      : the assembled instrument
//!
//! The audio path is integer-only and allocation-free; floating point is
//! confined to control-rate table building and normalization.

pub mod graph;
pub mod manual;
pub mod meter;
pub mod organ;
pub mod preamp;
pub mod rotary;
pub mod scanner;
pub mod tonewheels;

// Re-export the items most hosts need to make downstream imports ergonomic.
pub use graph::{BlockEffect, BlockSource, BLOCK_LEN, SAMPLE_RATE_HZ};
pub use organ::Organ;
pub use scanner::VibratoMode;
