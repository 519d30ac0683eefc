//! C ABI wrapper for the Rotorgan engine.
//!
//! Exposes a small set of functions to create/destroy an organ, render
//! mono i16 samples, and drive the control surface (keys, drawbars,
//! vibrato, rotor).
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `RotorganOrgan` (heap-allocated; you own/delete it).
//! - The engine runs at a fixed 44100 Hz and renders mono.
//! - Control values out of range are ignored, matching the engine itself.
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same audio
//!   thread.

use rotorgan_engine::{Organ, VibratoMode, BLOCK_LEN};

/// Opaque organ wrapper we hand to C.
///
/// Rendering is block-internal at 128 samples; the carry buffer lets the
/// caller request any frame count without the block size leaking through
/// the ABI.
pub struct RotorganOrgan {
    inner: Organ,
    block: [i16; BLOCK_LEN],
    pos: usize,
}

impl RotorganOrgan {
    fn new() -> Self {
        Self {
            inner: Organ::new(),
            block: [0; BLOCK_LEN],
            pos: BLOCK_LEN,
        }
    }
}

// --- Creation / destruction ------------------------------------------------------

/// Create a new organ with all drawbars in and the rotor stopped.
/// Returns a non-null pointer on success.
#[no_mangle]
pub extern "C" fn rotorgan_create() -> *mut RotorganOrgan {
    Box::into_raw(Box::new(RotorganOrgan::new()))
}

/// Destroy an organ previously returned by `rotorgan_create`.
#[no_mangle]
pub extern "C" fn rotorgan_destroy(organ: *mut RotorganOrgan) {
    if !organ.is_null() {
        unsafe { drop(Box::from_raw(organ)); }
    }
}

// --- Rendering -------------------------------------------------------------------

/// Render `frames` of mono audio into `out`. Returns the number of frames
/// rendered (0 on a null argument).
#[no_mangle]
pub extern "C" fn rotorgan_render_i16(
    organ: *mut RotorganOrgan,
    out: *mut i16,
    frames: u32,
) -> u32 {
    if organ.is_null() || out.is_null() || frames == 0 {
        return 0;
    }
    let o = unsafe { &mut *organ };
    let out = unsafe { std::slice::from_raw_parts_mut(out, frames as usize) };

    for slot in out.iter_mut() {
        if o.pos == BLOCK_LEN {
            o.inner.render_block(&mut o.block);
            o.pos = 0;
        }
        *slot = o.block[o.pos];
        o.pos += 1;
    }
    frames
}

// --- Control surface -------------------------------------------------------------

/// Press a key, 1..=61. Out of range is ignored.
#[no_mangle]
pub extern "C" fn rotorgan_key_down(organ: *mut RotorganOrgan, key: u8) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.key_down(key);
}

/// Release a key, 1..=61. Out of range is ignored.
#[no_mangle]
pub extern "C" fn rotorgan_key_up(organ: *mut RotorganOrgan, key: u8) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.key_up(key);
}

/// Replace the whole key state from a 61-bit mask (bit 0 = key 1).
#[no_mangle]
pub extern "C" fn rotorgan_set_keys(organ: *mut RotorganOrgan, mask: u64) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.set_keys(mask);
}

/// Set drawbar 1..=9 to position 0..=8. Out of range is ignored.
#[no_mangle]
pub extern "C" fn rotorgan_set_drawbar(organ: *mut RotorganOrgan, drawbar: u8, position: u8) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.set_drawbar(drawbar, position);
}

/// Drive a pedal tonewheel (1..=12) at a linear volume 0..=255.
#[no_mangle]
pub extern "C" fn rotorgan_set_pedal_volume(organ: *mut RotorganOrgan, wheel: u8, volume: u8) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.set_pedal_volume(wheel, volume);
}

/// Vibrato switch position: 0 = off, 1..=3 = V1..V3, 4..=6 = C1..C3.
/// Anything else is ignored.
#[no_mangle]
pub extern "C" fn rotorgan_set_vibrato_mode(organ: *mut RotorganOrgan, mode: u8) {
    if organ.is_null() { return; }
    let mode = match mode {
        0 => VibratoMode::Off,
        1 => VibratoMode::V1,
        2 => VibratoMode::V2,
        3 => VibratoMode::V3,
        4 => VibratoMode::C1,
        5 => VibratoMode::C2,
        6 => VibratoMode::C3,
        _ => return,
    };
    unsafe { &mut *organ }.inner.set_vibrato_mode(mode);
}

/// Rotor speed in cycles per second.
#[no_mangle]
pub extern "C" fn rotorgan_set_rotation_rate(organ: *mut RotorganOrgan, hz: f32) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.set_rotation_rate(hz);
}

/// Tremolo depth, 0..=1.
#[no_mangle]
pub extern "C" fn rotorgan_set_tremolo_depth(organ: *mut RotorganOrgan, depth: f32) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.set_tremolo_depth(depth);
}

/// Doppler delay depth in milliseconds.
#[no_mangle]
pub extern "C" fn rotorgan_set_delay_depth(organ: *mut RotorganOrgan, ms: f32) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.set_delay_depth(ms);
}

/// Preamp drive amount. Non-positive values degenerate to clean.
#[no_mangle]
pub extern "C" fn rotorgan_set_drive(organ: *mut RotorganOrgan, k: f32) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.set_drive(k);
}

// --- Metering --------------------------------------------------------------------

/// Peak output level in dBFS since the last `rotorgan_meter_reset`.
/// Returns -120.0 for a null handle (indistinguishable from silence by
/// design; the meter floor is also -120).
#[no_mangle]
pub extern "C" fn rotorgan_meter_peak_dbfs(organ: *const RotorganOrgan) -> f32 {
    if organ.is_null() { return -120.0; }
    unsafe { &*organ }.inner.meter().peak_dbfs()
}

#[no_mangle]
pub extern "C" fn rotorgan_meter_reset(organ: *mut RotorganOrgan) {
    if organ.is_null() { return; }
    unsafe { &mut *organ }.inner.meter_reset();
}
