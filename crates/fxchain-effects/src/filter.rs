//! First-order filter stage.
//!
//! A 6 dB/oct low-pass (default) or high-pass. The cutoff and mode are set
//! from any thread; coefficients are recomputed once, at the next block
//! boundary, never mid-block. Each channel keeps its own filter registers.
//!
//! # Parameters
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | Cutoff | 100–20000 Hz | 200 Hz |
//! | Mode | LowPass / HighPass | LowPass |
//!
//! At low sample rates the cutoff is additionally held below 0.49 · fs when
//! coefficients are computed.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use fxchain_core::{
    FilterMode, FirstOrderCoefficients, FirstOrderState, SharedFlag, SharedParam, Stage,
    StreamConfig,
};

/// Cutoff range in Hz.
pub const CUTOFF_HZ_RANGE: (f32, f32) = (100.0, 20000.0);

/// Default cutoff in Hz.
pub const DEFAULT_CUTOFF_HZ: f32 = 200.0;

#[derive(Debug)]
struct FilterParams {
    cutoff_hz: SharedParam,
    highpass: SharedFlag,
}

/// Thread-safe handle to a [`FilterStage`]'s parameters.
#[derive(Debug, Clone)]
pub struct FilterControl {
    params: Arc<FilterParams>,
}

impl FilterControl {
    /// Request a new cutoff, clamped to [`CUTOFF_HZ_RANGE`].
    pub fn set_cutoff_hz(&self, hz: f32) {
        self.params.cutoff_hz.set(hz);
    }

    /// Most recently requested cutoff in Hz.
    pub fn cutoff_hz(&self) -> f32 {
        self.params.cutoff_hz.get()
    }

    /// Switch between low-pass and high-pass.
    pub fn set_mode(&self, mode: FilterMode) {
        self.params.highpass.set(mode == FilterMode::HighPass);
    }

    /// Most recently requested mode.
    pub fn mode(&self) -> FilterMode {
        mode_from_flag(self.params.highpass.get())
    }
}

/// First-order IIR pipeline stage.
///
/// # Example
///
/// ```rust
/// use fxchain_core::{FilterMode, Stage, StreamConfig};
/// use fxchain_effects::FilterStage;
///
/// let mut filter = FilterStage::new(FilterMode::LowPass, 1000.0);
/// filter.configure(&StreamConfig::new(48000.0, 1, 64).unwrap());
///
/// let mut dc = [1.0f32; 64];
/// filter.process(&mut [&mut dc[..]], false);
/// assert!(dc[0] < 0.1); // step response starts low
/// ```
#[derive(Debug)]
pub struct FilterStage {
    coefficients: FirstOrderCoefficients,
    states: Vec<FirstOrderState>,
    mode: FilterMode,
    cutoff_hz: f32,
    sample_rate: f64,
    params: Arc<FilterParams>,
}

impl FilterStage {
    /// Create a filter with an initial mode and cutoff (clamped).
    pub fn new(mode: FilterMode, cutoff_hz: f32) -> Self {
        let params = FilterParams {
            cutoff_hz: SharedParam::new(cutoff_hz, CUTOFF_HZ_RANGE.0, CUTOFF_HZ_RANGE.1),
            highpass: SharedFlag::new(mode == FilterMode::HighPass),
        };
        Self {
            coefficients: FirstOrderCoefficients::IDENTITY,
            states: Vec::new(),
            mode,
            cutoff_hz: params.cutoff_hz.get(),
            sample_rate: 0.0,
            params: Arc::new(params),
        }
    }

    /// Handle for changing parameters from another thread.
    pub fn control(&self) -> FilterControl {
        FilterControl {
            params: Arc::clone(&self.params),
        }
    }

    /// Coefficients currently in use.
    pub fn coefficients(&self) -> &FirstOrderCoefficients {
        &self.coefficients
    }

    /// Cutoff in Hz currently in use.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Mode currently in use.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    fn recompute(&mut self) {
        self.coefficients =
            FirstOrderCoefficients::new(self.mode, f64::from(self.cutoff_hz), self.sample_rate);
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new(FilterMode::LowPass, DEFAULT_CUTOFF_HZ)
    }
}

impl Stage for FilterStage {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn configure(&mut self, config: &StreamConfig) {
        self.cutoff_hz = self.params.cutoff_hz.take_current();
        self.mode = mode_from_flag(self.params.highpass.take_current());
        self.sample_rate = config.sample_rate();
        self.states = vec![FirstOrderState::default(); config.num_channels()];
        self.recompute();
    }

    fn apply_pending_changes(&mut self) {
        let mut dirty = false;
        if let Some(hz) = self.params.cutoff_hz.take() {
            self.cutoff_hz = hz;
            dirty = true;
        }
        if let Some(highpass) = self.params.highpass.take() {
            self.mode = mode_from_flag(highpass);
            dirty = true;
        }
        if dirty {
            self.recompute();

            #[cfg(feature = "tracing")]
            tracing::debug!(
                cutoff_hz = self.cutoff_hz,
                mode = ?self.mode,
                "filter coefficients recomputed"
            );
        }
    }

    fn process(&mut self, block: &mut [&mut [f32]], bypassed: bool) {
        assert_eq!(
            block.len(),
            self.states.len(),
            "block has {} channels, filter configured for {}",
            block.len(),
            self.states.len()
        );
        if bypassed {
            return;
        }
        let coefficients = self.coefficients;
        for (state, channel) in self.states.iter_mut().zip(block.iter_mut()) {
            for sample in channel.iter_mut() {
                *sample = state.process(&coefficients, *sample);
            }
        }
    }

    fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    fn tail_samples(&self) -> usize {
        // Impulse response decays as |a1|^n; -60 dB when |a1|^n = 0.001.
        let pole = f64::from(self.coefficients.a1.abs());
        if pole <= 0.0 {
            return 0;
        }
        if pole >= 1.0 {
            return fxchain_core::TAIL_INFINITE;
        }
        libm::ceil(libm::log(0.001) / libm::log(pole)) as usize
    }
}

fn mode_from_flag(highpass: bool) -> FilterMode {
    if highpass {
        FilterMode::HighPass
    } else {
        FilterMode::LowPass
    }
}
