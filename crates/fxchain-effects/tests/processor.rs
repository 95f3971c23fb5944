//! Host facade tests against a recording pipeline.

use std::sync::{Arc, Mutex};

use fxchain_core::StreamConfig;
use fxchain_effects::{ChainControl, ChainError, FxProcessor, Pipeline, Result};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Configure(f64, usize, usize),
    Apply,
    Process(usize, bool),
}

#[derive(Debug, Default, Clone)]
struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    configured: bool,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Pipeline for Recorder {
    fn configure_stream(&mut self, config: StreamConfig) {
        self.configured = true;
        self.calls.lock().unwrap().push(Call::Configure(
            config.sample_rate(),
            config.num_channels(),
            config.max_block_size(),
        ));
    }

    fn apply_pending_parameter_changes(&mut self) {
        self.calls.lock().unwrap().push(Call::Apply);
    }

    fn process_block(&mut self, block: &mut [&mut [f32]], bypassed: bool) -> Result<()> {
        if !self.configured {
            return Err(ChainError::NotConfigured);
        }
        self.calls
            .lock()
            .unwrap()
            .push(Call::Process(block.first().map_or(0, |c| c.len()), bypassed));
        Ok(())
    }

    fn tail_samples(&self) -> usize {
        4800
    }
}

#[test]
fn stream_start_configures() {
    let recorder = Recorder::default();
    let mut fx = FxProcessor::with_pipeline(recorder.clone(), ChainControl::default());

    fx.on_stream_start(48000.0, 256, 2).unwrap();
    assert_eq!(recorder.calls(), [Call::Configure(48000.0, 2, 256)]);
}

#[test]
fn block_applies_changes_then_processes() {
    let recorder = Recorder::default();
    let mut fx = FxProcessor::with_pipeline(recorder.clone(), ChainControl::default());
    fx.on_stream_start(44100.0, 64, 1).unwrap();

    let mut mono = [0.0f32; 32];
    fx.on_block(&mut [&mut mono], false).unwrap();
    fx.on_block(&mut [&mut mono[..16]], true).unwrap();

    assert_eq!(
        recorder.calls(),
        [
            Call::Configure(44100.0, 1, 64),
            Call::Apply,
            Call::Process(32, false),
            Call::Apply,
            Call::Process(16, true),
        ]
    );
}

#[test]
fn invalid_stream_never_reaches_pipeline() {
    let recorder = Recorder::default();
    let mut fx = FxProcessor::with_pipeline(recorder.clone(), ChainControl::default());

    assert!(fx.on_stream_start(-1.0, 64, 2).is_err());
    assert!(fx.on_stream_start(48000.0, 0, 2).is_err());
    assert!(recorder.calls().is_empty());
}

#[test]
fn block_errors_propagate() {
    let mut fx = FxProcessor::with_pipeline(Recorder::default(), ChainControl::default());
    let mut mono = [0.0f32; 8];
    assert_eq!(
        fx.on_block(&mut [&mut mono], false),
        Err(ChainError::NotConfigured)
    );
}

#[test]
fn tail_length_uses_stream_rate() {
    let mut fx = FxProcessor::with_pipeline(Recorder::default(), ChainControl::default());
    assert_eq!(fx.tail_length_seconds(), 0.0);
    fx.on_stream_start(48000.0, 64, 2).unwrap();
    assert!((fx.tail_length_seconds() - 0.1).abs() < 1e-12);
}

#[test]
fn accessors_without_stages_are_none() {
    let fx = FxProcessor::with_pipeline(Recorder::default(), ChainControl::default());
    fx.set_delay_ms(100.0);
    assert_eq!(fx.delay_ms(), None);
    assert_eq!(fx.gain_db(), None);
}

#[test]
fn standard_processor_runs_blocks() {
    let mut fx = FxProcessor::new();
    fx.on_stream_start(48000.0, 128, 2).unwrap();
    fx.set_room_size(0.9);
    fx.set_delay_ms(20.0);

    let mut left = [0.0f32; 128];
    let mut right = [0.0f32; 128];
    left[0] = 1.0;
    fx.on_block(&mut [&mut left, &mut right], false).unwrap();

    assert_eq!(fx.control().delay_samples(), Some(960));
    assert!(left.iter().chain(&right).all(|s| s.is_finite()));
}
