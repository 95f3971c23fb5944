//! Run a short stereo signal through the standard effect chain
//!
//! Shows the host lifecycle: configure once, then per block apply pending
//! parameter changes and process. Parameters are changed from a second
//! thread while the "audio" loop runs.
//!
//! Run with: RUST_LOG=debug cargo run --example chain_demo --features tracing

use std::thread;

use fxchain_core::signal::{channel_slices, sine, to_channels};
use fxchain_effects::{ChainSettings, FxProcessor, Result};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZE: usize = 256;
const BLOCKS: usize = 400;

fn rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = ChainSettings::default()
        .with_delay_ms(250.0)
        .with_feedback(0.4)
        .with_room_size(0.7)
        .with_gain_db(0.0);
    let mut fx = FxProcessor::with_settings(&settings);
    fx.on_stream_start(SAMPLE_RATE, BLOCK_SIZE, 2)?;

    tracing::info!(
        tail_seconds = fx.tail_length_seconds(),
        "stream started"
    );

    // control thread: sweep the cutoff and pull the gain down
    let control = fx.control().clone();
    let sweeper = thread::spawn(move || {
        for step in 0..20u16 {
            control.set_cutoff_hz(200.0 + f32::from(step) * 500.0);
            thread::sleep(std::time::Duration::from_millis(2));
        }
        control.set_gain_db(-12.0);
    });

    let source = sine(BLOCK_SIZE * BLOCKS, 220.0, SAMPLE_RATE as f32, 0.5);
    let mut output = to_channels(&source, 2);

    for block in 0..BLOCKS {
        let range = block * BLOCK_SIZE..(block + 1) * BLOCK_SIZE;
        let mut channels: Vec<&mut [f32]> =
            output.iter_mut().map(|c| &mut c[range.clone()]).collect();
        fx.on_block(&mut channels, false)?;

        if block % 100 == 0 {
            tracing::info!(
                block,
                rms = rms(&output[0][block * BLOCK_SIZE..(block + 1) * BLOCK_SIZE]),
                cutoff_hz = ?fx.cutoff_hz(),
                "processed"
            );
        }
    }

    if sweeper.join().is_err() {
        tracing::warn!("control thread panicked");
    }

    // one more block so the final parameter values land
    let mut tail = vec![vec![0.0f32; BLOCK_SIZE]; 2];
    fx.on_block(&mut channel_slices(&mut tail), false)?;

    println!("input  RMS: {:.4}", rms(&source));
    println!("output RMS: {:.4} (left)", rms(&output[0]));
    println!("tail RMS:   {:.4}", rms(&tail[0]));
    println!(
        "final: cutoff {:?} Hz, gain {:?} dB, delay {:?} ms",
        fx.cutoff_hz(),
        fx.gain_db(),
        fx.delay_ms()
    );

    Ok(())
}
