//! Feedback delay stage.
//!
//! Wraps a [`DelayLine`] with lock-free parameters so the delay time and
//! feedback can be changed from a control thread.
//!
//! # Parameters
//!
//! | Parameter | Range | Default | Applied |
//! |-----------|-------|---------|---------|
//! | Delay time | 0–2000 ms | 500 ms | Next block; contents cleared |
//! | Feedback | 0–1 | 0.5 | Next block; 10 ms linear ramp |
//!
//! Changing the delay time zero-fills the line inside its pre-allocated
//! 2 s capacity, so it is safe on the audio thread. The result is a short
//! gap in the echoes rather than a crossfade.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};

use fxchain_core::{DelayLine, SharedParam, Stage, StreamConfig};

/// Delay time range in milliseconds.
pub const DELAY_MS_RANGE: (f32, f32) = (0.0, 2000.0);

/// Default delay time in milliseconds.
pub const DEFAULT_DELAY_MS: f32 = 500.0;

/// Feedback range.
pub const FEEDBACK_RANGE: (f32, f32) = (0.0, 1.0);

/// Default feedback.
pub const DEFAULT_FEEDBACK: f32 = 0.5;

#[derive(Debug)]
struct DelayParams {
    delay_ms: SharedParam,
    feedback: SharedParam,
    /// Delay in samples as last applied by the audio thread.
    applied_samples: AtomicUsize,
}

/// Thread-safe handle to a [`DelayStage`]'s parameters.
///
/// Cloning is cheap; all clones address the same stage.
#[derive(Debug, Clone)]
pub struct DelayControl {
    params: Arc<DelayParams>,
}

impl DelayControl {
    /// Request a new delay time, clamped to [`DELAY_MS_RANGE`].
    pub fn set_delay_ms(&self, ms: f32) {
        self.params.delay_ms.set(ms);
    }

    /// Most recently requested delay time in milliseconds.
    pub fn delay_ms(&self) -> f32 {
        self.params.delay_ms.get()
    }

    /// Delay length in samples currently in effect on the audio thread.
    ///
    /// Zero until the stage has been configured.
    pub fn delay_samples(&self) -> usize {
        self.params.applied_samples.load(Ordering::Acquire)
    }

    /// Request a new feedback amount, clamped to [`FEEDBACK_RANGE`].
    pub fn set_feedback(&self, feedback: f32) {
        self.params.feedback.set(feedback);
    }

    /// Most recently requested feedback.
    pub fn feedback(&self) -> f32 {
        self.params.feedback.get()
    }
}

/// Feedback delay pipeline stage.
///
/// # Example
///
/// ```rust
/// use fxchain_core::{Stage, StreamConfig};
/// use fxchain_effects::DelayStage;
///
/// let mut delay = DelayStage::new(500.0, 0.5);
/// let control = delay.control();
///
/// delay.configure(&StreamConfig::new(48000.0, 2, 512).unwrap());
/// assert_eq!(control.delay_samples(), 24000);
///
/// control.set_delay_ms(10.0);
/// delay.apply_pending_changes();
/// assert_eq!(control.delay_samples(), 480);
/// ```
#[derive(Debug)]
pub struct DelayStage {
    line: DelayLine,
    params: Arc<DelayParams>,
}

impl DelayStage {
    /// Create a stage with an initial delay time and feedback.
    ///
    /// Both values are clamped and adopted at the first
    /// [`configure`](Stage::configure).
    pub fn new(delay_ms: f32, feedback: f32) -> Self {
        let params = DelayParams {
            delay_ms: SharedParam::new(delay_ms, DELAY_MS_RANGE.0, DELAY_MS_RANGE.1),
            feedback: SharedParam::new(feedback, FEEDBACK_RANGE.0, FEEDBACK_RANGE.1),
            applied_samples: AtomicUsize::new(0),
        };

        let mut line = DelayLine::new();
        line.set_max_delay_ms(f64::from(DELAY_MS_RANGE.1));
        line.set_delay_ms(f64::from(params.delay_ms.get()));
        line.set_feedback(params.feedback.get());

        Self {
            line,
            params: Arc::new(params),
        }
    }

    /// Handle for changing parameters from another thread.
    pub fn control(&self) -> DelayControl {
        DelayControl {
            params: Arc::clone(&self.params),
        }
    }

    /// The underlying delay line.
    pub fn line(&self) -> &DelayLine {
        &self.line
    }

    fn publish(&self) {
        self.params
            .applied_samples
            .store(self.line.delay_samples(), Ordering::Release);
    }
}

impl Default for DelayStage {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY_MS, DEFAULT_FEEDBACK)
    }
}

impl Stage for DelayStage {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn configure(&mut self, config: &StreamConfig) {
        // Feedback set before configure lands without a ramp.
        self.line.set_feedback(self.params.feedback.take_current());

        // An unchanged delay is rescaled to the new rate by the line itself;
        // a changed one is converted at the new rate.
        let requested = self.params.delay_ms.take();
        self.line.configure_stream(config);
        if let Some(ms) = requested {
            self.line.set_delay_ms(f64::from(ms));
        }
        self.publish();
    }

    fn apply_pending_changes(&mut self) {
        if let Some(ms) = self.params.delay_ms.take() {
            self.line.set_delay_ms(f64::from(ms));
            self.publish();

            #[cfg(feature = "tracing")]
            tracing::debug!(ms, samples = self.line.delay_samples(), "delay time applied");
        }
        if let Some(feedback) = self.params.feedback.take() {
            self.line.set_feedback(feedback);
        }
    }

    fn process(&mut self, block: &mut [&mut [f32]], bypassed: bool) {
        self.line.process_in_place(block, bypassed);
    }

    fn reset(&mut self) {
        self.line.reset();
    }

    fn tail_samples(&self) -> usize {
        self.line.tail_samples()
    }
}
