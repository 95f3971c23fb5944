//! Initial parameter values for a chain.

use fxchain_core::FilterMode;

use crate::reverb::ReverbParameters;

/// Starting values for every stage of a standard chain.
///
/// The defaults are a gentle low-pass at 200 Hz, a half-second echo at 0.5
/// feedback, a medium room, and +6 dB of make-up gain.
///
/// # Example
///
/// ```rust
/// use fxchain_effects::ChainSettings;
///
/// let settings = ChainSettings::default()
///     .with_delay_ms(125.0)
///     .with_feedback(0.3)
///     .with_gain_db(0.0);
/// assert_eq!(settings.delay_ms, 125.0);
/// assert_eq!(settings.cutoff_hz, 200.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    /// Filter cutoff in Hz.
    pub cutoff_hz: f32,
    /// Filter response.
    pub filter_mode: FilterMode,
    /// Delay time in milliseconds.
    pub delay_ms: f32,
    /// Delay feedback.
    pub feedback: f32,
    /// Reverberator settings.
    pub reverb: ReverbParameters,
    /// Output gain in dB.
    pub gain_db: f32,
    /// Output gain ramp length in seconds.
    pub gain_ramp_seconds: f32,
}

impl ChainSettings {
    /// Set the filter cutoff.
    pub fn with_cutoff_hz(mut self, hz: f32) -> Self {
        self.cutoff_hz = hz;
        self
    }

    /// Set the filter response.
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Set the delay time.
    pub fn with_delay_ms(mut self, ms: f32) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Set the delay feedback.
    pub fn with_feedback(mut self, feedback: f32) -> Self {
        self.feedback = feedback;
        self
    }

    /// Set the reverb room size.
    pub fn with_room_size(mut self, room_size: f32) -> Self {
        self.reverb.room_size = room_size;
        self
    }

    /// Replace all reverberator settings.
    pub fn with_reverb(mut self, reverb: ReverbParameters) -> Self {
        self.reverb = reverb;
        self
    }

    /// Set the output gain.
    pub fn with_gain_db(mut self, db: f32) -> Self {
        self.gain_db = db;
        self
    }

    /// Set the output gain ramp.
    pub fn with_gain_ramp_seconds(mut self, seconds: f32) -> Self {
        self.gain_ramp_seconds = seconds;
        self
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            cutoff_hz: crate::filter::DEFAULT_CUTOFF_HZ,
            filter_mode: FilterMode::LowPass,
            delay_ms: crate::delay::DEFAULT_DELAY_MS,
            feedback: crate::delay::DEFAULT_FEEDBACK,
            reverb: ReverbParameters::default(),
            gain_db: 6.0,
            gain_ramp_seconds: crate::gain::DEFAULT_RAMP_SECONDS,
        }
    }
}
