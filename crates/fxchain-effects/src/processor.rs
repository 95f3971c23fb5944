//! Host-facing facade.
//!
//! [`FxProcessor`] is the thin layer a plugin wrapper or audio callback talks
//! to. It translates the host's lifecycle events into pipeline calls:
//!
//! | Host event | Pipeline calls |
//! |------------|----------------|
//! | stream start | validate, then `configure_stream` |
//! | audio block | `apply_pending_parameter_changes`, then `process_block` |
//!
//! Parameter accessors go through the pipeline's [`ChainControl`], so they
//! may be called from any thread.

use fxchain_core::{StreamConfig, TAIL_INFINITE};

use crate::chain::{ChainControl, EffectChain};
use crate::error::Result;
use crate::settings::ChainSettings;

/// What [`FxProcessor`] drives. Implemented by [`EffectChain`].
pub trait Pipeline {
    /// Prepare for a validated stream.
    fn configure_stream(&mut self, config: StreamConfig);

    /// Pick up parameter changes made since the previous block.
    fn apply_pending_parameter_changes(&mut self);

    /// Process one block in place.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotConfigured`](crate::ChainError::NotConfigured) before
    /// the first `configure_stream`.
    fn process_block(&mut self, block: &mut [&mut [f32]], bypassed: bool) -> Result<()>;

    /// Tail length in samples.
    fn tail_samples(&self) -> usize;
}

impl Pipeline for EffectChain {
    fn configure_stream(&mut self, config: StreamConfig) {
        EffectChain::configure_stream(self, config);
    }

    fn apply_pending_parameter_changes(&mut self) {
        EffectChain::apply_pending_parameter_changes(self);
    }

    fn process_block(&mut self, block: &mut [&mut [f32]], bypassed: bool) -> Result<()> {
        EffectChain::process_block(self, block, bypassed)
    }

    fn tail_samples(&self) -> usize {
        EffectChain::tail_samples(self)
    }
}

/// Host boundary around a [`Pipeline`].
///
/// # Example
///
/// ```rust
/// use fxchain_effects::FxProcessor;
///
/// let mut fx = FxProcessor::new();
/// fx.on_stream_start(44100.0, 128, 2).unwrap();
///
/// fx.set_gain_db(-6.0);
/// fx.set_cutoff_hz(50.0);
/// assert_eq!(fx.cutoff_hz(), Some(100.0));
///
/// let mut left = [0.0f32; 128];
/// let mut right = [0.0f32; 128];
/// fx.on_block(&mut [&mut left, &mut right], false).unwrap();
/// ```
#[derive(Debug)]
pub struct FxProcessor<P = EffectChain> {
    pipeline: P,
    control: ChainControl,
    sample_rate: Option<f64>,
}

impl FxProcessor<EffectChain> {
    /// Standard chain with default settings.
    pub fn new() -> Self {
        Self::with_settings(&ChainSettings::default())
    }

    /// Standard chain initialised from `settings`.
    pub fn with_settings(settings: &ChainSettings) -> Self {
        let chain = EffectChain::standard(settings);
        let control = chain.control().clone();
        Self::with_pipeline(chain, control)
    }
}

impl Default for FxProcessor<EffectChain> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pipeline> FxProcessor<P> {
    /// Wrap any pipeline. `control` addresses its parameters; pass
    /// `ChainControl::default()` for a pipeline without any.
    pub fn with_pipeline(pipeline: P, control: ChainControl) -> Self {
        Self {
            pipeline,
            control,
            sample_rate: None,
        }
    }

    /// Host announces a stream.
    ///
    /// # Errors
    ///
    /// [`ChainError::Config`](crate::ChainError::Config) if the description
    /// is invalid; the pipeline is left as it was.
    pub fn on_stream_start(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<()> {
        let config = StreamConfig::new(sample_rate, num_channels, max_block_size)?;
        self.pipeline.configure_stream(config);
        self.sample_rate = Some(sample_rate);
        Ok(())
    }

    /// Host delivers a block.
    ///
    /// # Errors
    ///
    /// Propagates the pipeline's error, e.g. a block before
    /// [`on_stream_start`](Self::on_stream_start).
    pub fn on_block(&mut self, channels: &mut [&mut [f32]], bypassed: bool) -> Result<()> {
        self.pipeline.apply_pending_parameter_changes();
        self.pipeline.process_block(channels, bypassed)
    }

    /// Output length after silent input, in seconds.
    ///
    /// `0.0` before the first stream; infinite if the pipeline never decays.
    pub fn tail_length_seconds(&self) -> f64 {
        let Some(rate) = self.sample_rate else {
            return 0.0;
        };
        match self.pipeline.tail_samples() {
            TAIL_INFINITE => f64::INFINITY,
            samples => samples as f64 / rate,
        }
    }

    /// Parameter handle.
    pub fn control(&self) -> &ChainControl {
        &self.control
    }

    /// The wrapped pipeline.
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// The wrapped pipeline, mutably.
    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    /// Delay time in ms, 0–2000.
    pub fn delay_ms(&self) -> Option<f32> {
        self.control.delay_ms()
    }

    /// Set the delay time in ms.
    pub fn set_delay_ms(&self, ms: f32) {
        self.control.set_delay_ms(ms);
    }

    /// Delay feedback, 0–1.
    pub fn feedback(&self) -> Option<f32> {
        self.control.feedback()
    }

    /// Set the delay feedback.
    pub fn set_feedback(&self, feedback: f32) {
        self.control.set_feedback(feedback);
    }

    /// Filter cutoff in Hz, 100–20000.
    pub fn cutoff_hz(&self) -> Option<f32> {
        self.control.cutoff_hz()
    }

    /// Set the filter cutoff in Hz.
    pub fn set_cutoff_hz(&self, hz: f32) {
        self.control.set_cutoff_hz(hz);
    }

    /// Reverb room size, 0–1.
    pub fn room_size(&self) -> Option<f32> {
        self.control.room_size()
    }

    /// Set the reverb room size.
    pub fn set_room_size(&self, room_size: f32) {
        self.control.set_room_size(room_size);
    }

    /// Output gain in dB, −60–+24.
    pub fn gain_db(&self) -> Option<f32> {
        self.control.gain_db()
    }

    /// Set the output gain in dB.
    pub fn set_gain_db(&self, db: f32) {
        self.control.set_gain_db(db);
    }
}
