//! Rotorgan CLI — real-time player and offline renderer for the tonewheel
//! engine.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rotorgan_engine::{Organ, VibratoMode, BLOCK_LEN, SAMPLE_RATE_HZ};
use std::error::Error;
use std::time::Duration;

#[derive(Debug, Default)]
struct Args {
    list_devices: bool,
    device_name: Option<String>,
    duration_sec: Option<u64>,
    render_path: Option<String>,
    drawbars: Option<String>,
    keys: Option<String>,
    vibrato: Option<String>,
    rotor: Option<String>,
    drive: Option<f32>,
    gain: Option<f32>,
}

fn parse_args() -> Args {
    let mut a = Args::default();
    for s in std::env::args().skip(1) {
        if s == "--list-devices" { a.list_devices = true; continue; }
        if let Some(rest) = s.strip_prefix("--device=")   { a.device_name  = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--duration=") { a.duration_sec = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--render=")   { a.render_path  = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--drawbars=") { a.drawbars     = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--keys=")     { a.keys         = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--vibrato=")  { a.vibrato      = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--rotor=")    { a.rotor        = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--drive=")    { a.drive        = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--gain=")     { a.gain         = rest.parse().ok();      continue; }
        eprintln!("[warn] unknown arg: {s}");
    }
    a
}

/// Build an organ from the registration flags. Bad characters in the flag
/// values are warned about and skipped; the engine itself also ignores any
/// out-of-range control input.
fn make_organ(args: &Args) -> Organ {
    let mut organ = Organ::new();

    // Registration in the usual drawbar notation, e.g. 888000000.
    let registration = args.drawbars.as_deref().unwrap_or("888000000");
    for (i, ch) in registration.chars().take(9).enumerate() {
        match ch.to_digit(10) {
            Some(d) if d <= 8 => organ.set_drawbar(i as u8 + 1, d as u8),
            _ => eprintln!("[warn] bad drawbar digit: {ch}"),
        }
    }

    // Held keys as a comma-separated list of 1..61, e.g. 25,32,37.
    if let Some(keys) = &args.keys {
        for part in keys.split(',') {
            match part.trim().parse::<u8>() {
                Ok(key) => organ.key_down(key),
                Err(_) => eprintln!("[warn] bad key: {part}"),
            }
        }
    } else {
        organ.key_down(25); // middle C
    }

    let vibrato = match args.vibrato.as_deref().unwrap_or("c3").to_ascii_lowercase().as_str() {
        "off" => VibratoMode::Off,
        "v1" => VibratoMode::V1,
        "v2" => VibratoMode::V2,
        "v3" => VibratoMode::V3,
        "c1" => VibratoMode::C1,
        "c2" => VibratoMode::C2,
        other => {
            if other != "c3" {
                eprintln!("[warn] unknown vibrato mode: {other}, using c3");
            }
            VibratoMode::C3
        }
    };
    organ.set_vibrato_mode(vibrato);

    // Rotor speed: the two switch positions of the cabinet, or a raw rate.
    let rate = match args.rotor.as_deref().unwrap_or("fast") {
        "off" => 0.0,
        "slow" => 0.7,
        "fast" => 6.8,
        other => other.parse().unwrap_or_else(|_| {
            eprintln!("[warn] unknown rotor speed: {other}, using fast");
            6.8
        }),
    };
    organ.set_rotation_rate(rate);
    organ.set_delay_depth(if rate > 0.0 { 1.18 } else { 0.0 });
    organ.set_tremolo_depth(if rate > 0.0 { 0.5 } else { 0.0 });

    if let Some(k) = args.drive {
        organ.set_drive(k);
    }

    organ
}

fn list_output_devices() -> Result<(), Box<dyn Error>> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

fn pick_device(args: &Args) -> Result<cpal::Device, Box<dyn Error>> {
    let host = cpal::default_host();
    if let Some(name) = &args.device_name {
        for d in host.output_devices()? {
            if d.name()? == *name { return Ok(d); }
        }
        return Err(format!("requested device not found: {name}").into());
    }
    host.default_output_device()
        .ok_or_else(|| "no default output device".into())
}

/// Render to a mono 16-bit WAV instead of playing live.
fn render_wav(path: &str, mut organ: Organ, secs: u64, gain: f32) -> Result<(), Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE_HZ,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let blocks = (secs * u64::from(SAMPLE_RATE_HZ)).div_ceil(BLOCK_LEN as u64);
    let mut block = [0i16; BLOCK_LEN];
    for _ in 0..blocks {
        organ.render_block(&mut block);
        for &v in &block {
            let scaled = (f32::from(v) * gain).clamp(-32768.0, 32767.0);
            writer.write_sample(scaled as i16)?;
        }
    }
    writer.finalize()?;
    println!("Wrote {secs}s to {path}");
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut organ: Organ,
    gain: f32,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, Box<dyn Error>>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let channels = cfg.channels as usize;

    // ~1 second meter readout at the engine's block rate.
    let meter_interval = SAMPLE_RATE_HZ as usize / BLOCK_LEN;
    let mut meter_count: usize = 0;

    let mut block = [0i16; BLOCK_LEN];
    let mut pos = BLOCK_LEN;

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            for frame in output.chunks_mut(channels) {
                if pos == BLOCK_LEN {
                    organ.render_block(&mut block);
                    pos = 0;

                    meter_count += 1;
                    if meter_count >= meter_interval {
                        eprintln!("[meter] peak ~ {:.1} dBFS", organ.meter().peak_dbfs());
                        organ.meter_reset();
                        meter_count = 0;
                    }
                }
                let s = (f32::from(block[pos]) / 32768.0 * gain).clamp(-1.0, 1.0);
                pos += 1;

                let v: T = T::from_sample(s);
                for ch in frame.iter_mut() { *ch = v; }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();

    if args.list_devices {
        list_output_devices()?;
        return Ok(());
    }

    let gain = args.gain.unwrap_or(0.8);
    let organ = make_organ(&args);

    if let Some(path) = &args.render_path {
        let secs = args.duration_sec.unwrap_or(10);
        return render_wav(path, organ, secs, gain);
    }

    println!("rotorgan-cli — tonewheel organ through a rotary speaker\n");

    let device = pick_device(&args)?;
    let sup_cfg = device.default_output_config()?;
    let sample_format = sup_cfg.sample_format();
    let mut cfg = sup_cfg.config();
    cfg.sample_rate = cpal::SampleRate(SAMPLE_RATE_HZ);

    println!("Using device: {}", device.name()?);
    println!("Stream config: {:?} (sample_format: {:?})", cfg, sample_format);
    if let Some(d) = args.duration_sec { println!("Auto-stop after {d} seconds"); }
    println!("Press Ctrl+C to stop…\n");

    let err_fn = |e: cpal::StreamError| eprintln!("[cpal] stream error: {e}");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, organ, gain, err_fn)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, organ, gain, err_fn)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, organ, gain, err_fn)?,
        other => return Err(format!("unsupported device sample format: {other:?}").into()),
    };

    stream.play()?;

    if let Some(d) = args.duration_sec {
        std::thread::sleep(Duration::from_secs(d));
        return Ok(());
    }

    loop { std::thread::sleep(Duration::from_millis(500)); }
}
