//! Effect chain orchestrator.
//!
//! [`EffectChain`] owns an ordered, fixed list of stages and drives them
//! through the stream lifecycle:
//!
//! ```text
//!  Unconfigured ──configure_stream──► Ready ──┐
//!                                       ▲     │ apply_pending_parameter_changes
//!                                       └─────┘ process_block
//! ```
//!
//! Stage order is fixed when the chain is built. Each block passes through
//! every stage in order, in place. Parameter setters work in either state
//! through the chain's [`ChainControl`]; they become audible when
//! `apply_pending_parameter_changes` runs in the `Ready` state (or when the
//! stream is configured).

use alloc::boxed::Box;
use alloc::vec::Vec;

use fxchain_core::{FilterMode, Stage, StreamConfig};

use crate::delay::{DelayControl, DelayStage};
use crate::error::{ChainError, Result};
use crate::filter::{FilterControl, FilterStage};
use crate::gain::{GainControl, GainStage};
use crate::reverb::{ReverbControl, ReverbStage};
use crate::settings::ChainSettings;

/// Lifecycle state of an [`EffectChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No stream has been configured; blocks are rejected.
    Unconfigured,
    /// Configured and processing.
    Ready,
}

/// Cloneable, thread-safe access to the parameters of a chain's stages.
///
/// Each setter routes to the stage that owns the parameter. If the chain has
/// no such stage, setters do nothing and getters return `None`. When a chain
/// contains two stages of the same kind, the handle addresses the last one
/// added.
#[derive(Debug, Clone, Default)]
pub struct ChainControl {
    filter: Option<FilterControl>,
    delay: Option<DelayControl>,
    reverb: Option<ReverbControl>,
    gain: Option<GainControl>,
}

impl ChainControl {
    /// Filter parameters, if the chain has a filter.
    pub fn filter(&self) -> Option<&FilterControl> {
        self.filter.as_ref()
    }

    /// Delay parameters, if the chain has a delay.
    pub fn delay(&self) -> Option<&DelayControl> {
        self.delay.as_ref()
    }

    /// Reverb parameters, if the chain has a reverb.
    pub fn reverb(&self) -> Option<&ReverbControl> {
        self.reverb.as_ref()
    }

    /// Gain parameters, if the chain has a gain stage.
    pub fn gain(&self) -> Option<&GainControl> {
        self.gain.as_ref()
    }

    /// Set the filter cutoff (Hz).
    pub fn set_cutoff_hz(&self, hz: f32) {
        if let Some(filter) = &self.filter {
            filter.set_cutoff_hz(hz);
        }
    }

    /// Filter cutoff (Hz).
    pub fn cutoff_hz(&self) -> Option<f32> {
        self.filter.as_ref().map(FilterControl::cutoff_hz)
    }

    /// Set the filter response.
    pub fn set_filter_mode(&self, mode: FilterMode) {
        if let Some(filter) = &self.filter {
            filter.set_mode(mode);
        }
    }

    /// Set the delay time (ms).
    pub fn set_delay_ms(&self, ms: f32) {
        if let Some(delay) = &self.delay {
            delay.set_delay_ms(ms);
        }
    }

    /// Requested delay time (ms).
    pub fn delay_ms(&self) -> Option<f32> {
        self.delay.as_ref().map(DelayControl::delay_ms)
    }

    /// Delay length in samples currently in effect.
    pub fn delay_samples(&self) -> Option<usize> {
        self.delay.as_ref().map(DelayControl::delay_samples)
    }

    /// Set the delay feedback.
    pub fn set_feedback(&self, feedback: f32) {
        if let Some(delay) = &self.delay {
            delay.set_feedback(feedback);
        }
    }

    /// Delay feedback.
    pub fn feedback(&self) -> Option<f32> {
        self.delay.as_ref().map(DelayControl::feedback)
    }

    /// Set the reverb room size.
    pub fn set_room_size(&self, room_size: f32) {
        if let Some(reverb) = &self.reverb {
            reverb.set_room_size(room_size);
        }
    }

    /// Reverb room size.
    pub fn room_size(&self) -> Option<f32> {
        self.reverb.as_ref().map(ReverbControl::room_size)
    }

    /// Set the output gain (dB).
    pub fn set_gain_db(&self, db: f32) {
        if let Some(gain) = &self.gain {
            gain.set_gain_db(db);
        }
    }

    /// Output gain (dB).
    pub fn gain_db(&self) -> Option<f32> {
        self.gain.as_ref().map(GainControl::gain_db)
    }
}

/// Builder for an [`EffectChain`]; stages run in the order they are added.
///
/// # Example
///
/// ```rust
/// use fxchain_core::FilterMode;
/// use fxchain_effects::{DelayStage, EffectChain, FilterStage, GainStage};
///
/// let chain = EffectChain::builder()
///     .delay(DelayStage::new(250.0, 0.4))
///     .filter(FilterStage::new(FilterMode::HighPass, 120.0))
///     .gain(GainStage::new(-3.0))
///     .build();
///
/// assert_eq!(chain.stage_names(), ["delay", "filter", "gain"]);
/// assert!(chain.control().room_size().is_none());
/// ```
#[derive(Default)]
pub struct EffectChainBuilder {
    stages: Vec<Box<dyn Stage>>,
    control: ChainControl,
}

impl EffectChainBuilder {
    /// Append a filter stage.
    pub fn filter(mut self, stage: FilterStage) -> Self {
        self.control.filter = Some(stage.control());
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a delay stage.
    pub fn delay(mut self, stage: DelayStage) -> Self {
        self.control.delay = Some(stage.control());
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a reverb stage.
    pub fn reverb(mut self, stage: ReverbStage) -> Self {
        self.control.reverb = Some(stage.control());
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a gain stage.
    pub fn gain(mut self, stage: GainStage) -> Self {
        self.control.gain = Some(stage.control());
        self.stages.push(Box::new(stage));
        self
    }

    /// Append any other stage. It is driven like the built-in ones but has
    /// no entry in [`ChainControl`].
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Finish the chain. It starts [`ChainState::Unconfigured`].
    pub fn build(self) -> EffectChain {
        EffectChain {
            stages: self.stages,
            control: self.control,
            config: None,
        }
    }
}

/// Ordered pipeline of stages processing blocks in place.
pub struct EffectChain {
    stages: Vec<Box<dyn Stage>>,
    control: ChainControl,
    config: Option<StreamConfig>,
}

impl EffectChain {
    /// Start building a chain.
    pub fn builder() -> EffectChainBuilder {
        EffectChainBuilder::default()
    }

    /// Filter → Delay → Reverb → Gain, initialised from `settings`.
    pub fn standard(settings: &ChainSettings) -> Self {
        Self::builder()
            .filter(FilterStage::new(settings.filter_mode, settings.cutoff_hz))
            .delay(DelayStage::new(settings.delay_ms, settings.feedback))
            .reverb(ReverbStage::new(settings.reverb))
            .gain(
                GainStage::new(settings.gain_db)
                    .with_ramp_duration_seconds(settings.gain_ramp_seconds),
            )
            .build()
    }

    /// Parameter handle for this chain. Clone it to hand to another thread.
    pub fn control(&self) -> &ChainControl {
        &self.control
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChainState {
        if self.config.is_some() {
            ChainState::Ready
        } else {
            ChainState::Unconfigured
        }
    }

    /// Stream the chain is configured for.
    pub fn config(&self) -> Option<&StreamConfig> {
        self.config.as_ref()
    }

    /// Stage names in processing order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Configure every stage for `config`, in chain order, and enter
    /// [`ChainState::Ready`].
    ///
    /// Stages adopt all parameter values immediately, without ramps.
    /// Allocates; the audio thread must not be running.
    pub fn configure_stream(&mut self, config: StreamConfig) {
        for stage in &mut self.stages {
            stage.configure(&config);
        }
        self.config = Some(config);

        #[cfg(feature = "tracing")]
        tracing::info!(
            sample_rate = config.sample_rate(),
            channels = config.num_channels(),
            max_block_size = config.max_block_size(),
            stages = self.stages.len(),
            "effect chain configured"
        );
    }

    /// Validate a stream description and configure for it.
    pub fn configure(
        &mut self,
        sample_rate: f64,
        num_channels: usize,
        max_block_size: usize,
    ) -> Result<()> {
        let config = StreamConfig::new(sample_rate, num_channels, max_block_size)?;
        self.configure_stream(config);
        Ok(())
    }

    /// Let every stage, in chain order, pick up parameter changes made since
    /// the previous block. Call once per block before
    /// [`process_block`](Self::process_block).
    ///
    /// Does nothing while unconfigured; pending values are adopted by
    /// [`configure_stream`](Self::configure_stream) instead.
    pub fn apply_pending_parameter_changes(&mut self) {
        if self.config.is_none() {
            return;
        }
        for stage in &mut self.stages {
            stage.apply_pending_changes();
        }
    }

    /// Run a block through every stage, in place.
    ///
    /// Returns [`ChainError::NotConfigured`], leaving the audio untouched,
    /// if no stream has been configured.
    ///
    /// # Panics
    ///
    /// If the block's channel count differs from the configured count, its
    /// channels differ in length, or it is longer than the configured
    /// maximum block size.
    pub fn process_block(&mut self, block: &mut [&mut [f32]], bypassed: bool) -> Result<()> {
        let config = self.config.as_ref().ok_or(ChainError::NotConfigured)?;
        assert_eq!(
            block.len(),
            config.num_channels(),
            "block has {} channels, chain configured for {}",
            block.len(),
            config.num_channels()
        );
        let frames = block.first().map_or(0, |ch| ch.len());
        assert!(
            block.iter().all(|ch| ch.len() == frames),
            "channels have different lengths"
        );
        assert!(
            frames <= config.max_block_size(),
            "block of {} samples exceeds configured maximum {}",
            frames,
            config.max_block_size()
        );

        for stage in &mut self.stages {
            stage.process(block, bypassed);
        }
        Ok(())
    }

    /// Clear the audio state of every stage; parameters are kept.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Total tail of the chain in samples, saturating at
    /// [`TAIL_INFINITE`](fxchain_core::TAIL_INFINITE).
    pub fn tail_samples(&self) -> usize {
        self.stages
            .iter()
            .fold(0usize, |acc, s| acc.saturating_add(s.tail_samples()))
    }
}

impl core::fmt::Debug for EffectChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectChain")
            .field("stages", &self.stage_names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use fxchain_core::signal::channel_slices;

    #[test]
    fn standard_order() {
        let chain = EffectChain::standard(&ChainSettings::default());
        assert_eq!(chain.stage_names(), ["filter", "delay", "reverb", "gain"]);
        assert_eq!(chain.state(), ChainState::Unconfigured);
    }

    #[test]
    fn rejects_blocks_before_configure() {
        let mut chain = EffectChain::standard(&ChainSettings::default());
        let mut signal = vec![vec![0.5; 16]; 2];
        let result = chain.process_block(&mut channel_slices(&mut signal), false);
        assert_eq!(result, Err(ChainError::NotConfigured));
        assert_eq!(signal, vec![vec![0.5; 16]; 2]);
    }

    #[test]
    fn configure_validates() {
        let mut chain = EffectChain::standard(&ChainSettings::default());
        assert!(chain.configure(0.0, 2, 512).is_err());
        assert_eq!(chain.state(), ChainState::Unconfigured);
        chain.configure(48000.0, 2, 512).unwrap();
        assert_eq!(chain.state(), ChainState::Ready);
        assert_eq!(chain.config().map(StreamConfig::num_channels), Some(2));
    }

    #[test]
    fn control_routes_to_stages() {
        let mut chain = EffectChain::standard(&ChainSettings::default());
        chain.configure(48000.0, 2, 512).unwrap();
        let control = chain.control().clone();

        control.set_delay_ms(100.0);
        control.set_feedback(0.25);
        control.set_cutoff_hz(1000.0);
        control.set_room_size(0.75);
        control.set_gain_db(-3.0);

        assert_eq!(control.delay_samples(), Some(24000));
        chain.apply_pending_parameter_changes();
        assert_eq!(control.delay_samples(), Some(4800));
        assert_eq!(control.delay_ms(), Some(100.0));
        assert_eq!(control.feedback(), Some(0.25));
        assert_eq!(control.cutoff_hz(), Some(1000.0));
        assert_eq!(control.room_size(), Some(0.75));
        assert_eq!(control.gain_db(), Some(-3.0));
    }

    #[test]
    fn missing_stage_is_none() {
        let chain = EffectChain::builder().gain(GainStage::new(0.0)).build();
        let control = chain.control();
        control.set_delay_ms(10.0);
        assert_eq!(control.delay_ms(), None);
        assert_eq!(control.cutoff_hz(), None);
        assert_eq!(control.gain_db(), Some(0.0));
    }

    #[test]
    #[should_panic]
    fn oversized_block_panics() {
        let mut chain = EffectChain::builder().gain(GainStage::new(0.0)).build();
        chain.configure(48000.0, 1, 8).unwrap();
        let mut signal = vec![vec![0.0; 9]];
        let _ = chain.process_block(&mut channel_slices(&mut signal), false);
    }

    #[test]
    #[should_panic]
    fn wrong_channel_count_panics() {
        let mut chain = EffectChain::standard(&ChainSettings::default());
        chain.configure(48000.0, 2, 64).unwrap();
        let mut signal = vec![vec![0.0; 8]];
        let _ = chain.process_block(&mut channel_slices(&mut signal), false);
    }

    #[test]
    fn tail_saturates() {
        let mut chain = EffectChain::standard(&ChainSettings::default().with_feedback(1.0));
        chain.configure(48000.0, 2, 64).unwrap();
        assert_eq!(chain.tail_samples(), fxchain_core::TAIL_INFINITE);
    }
}
