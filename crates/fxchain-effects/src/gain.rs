//! Gain stage with a click-free linear ramp.
//!
//! The gain is set in dB (clamped to −60..+24), converted with
//! `10^(db / 20)`, and reached over a linear ramp of configurable length.
//! One ramp step is taken per sample index and applied to every channel,
//! so all channels carry the same gain at any sample.
//!
//! While bypassed the ramp does not advance: on resume the gain continues
//! exactly where it stopped.

use alloc::sync::Arc;

use fxchain_core::{
    LinearSmoothedParam, SharedParam, Stage, StreamConfig, db_to_linear, linear_to_db,
};

/// Gain range in dB.
pub const GAIN_DB_RANGE: (f32, f32) = (-60.0, 24.0);

/// Default gain in dB.
pub const DEFAULT_GAIN_DB: f32 = 0.0;

/// Default ramp length in seconds.
pub const DEFAULT_RAMP_SECONDS: f32 = 0.01;

/// Longest accepted ramp in seconds.
pub const MAX_RAMP_SECONDS: f32 = 10.0;

#[derive(Debug)]
struct GainParams {
    gain_db: SharedParam,
    ramp_seconds: SharedParam,
}

/// Thread-safe handle to a [`GainStage`]'s parameters.
#[derive(Debug, Clone)]
pub struct GainControl {
    params: Arc<GainParams>,
}

impl GainControl {
    /// Request a new gain in dB, clamped to [`GAIN_DB_RANGE`].
    pub fn set_gain_db(&self, db: f32) {
        self.params.gain_db.set(db);
    }

    /// Most recently requested gain in dB.
    pub fn gain_db(&self) -> f32 {
        self.params.gain_db.get()
    }

    /// Request a new linear gain; stored as dB, so the same clamp applies.
    pub fn set_gain_linear(&self, gain: f32) {
        self.set_gain_db(linear_to_db(gain));
    }

    /// Most recently requested gain as a linear factor.
    pub fn gain_linear(&self) -> f32 {
        db_to_linear(self.gain_db())
    }

    /// Set the ramp length used for future gain changes.
    pub fn set_ramp_duration_seconds(&self, seconds: f32) {
        self.params.ramp_seconds.set(seconds);
    }

    /// Ramp length in seconds.
    pub fn ramp_duration_seconds(&self) -> f32 {
        self.params.ramp_seconds.get()
    }
}

/// Gain pipeline stage.
///
/// # Example
///
/// ```rust
/// use fxchain_core::{Stage, StreamConfig};
/// use fxchain_effects::GainStage;
///
/// let mut gain = GainStage::new(-6.0);
/// gain.configure(&StreamConfig::new(48000.0, 1, 64).unwrap());
///
/// let mut block = [1.0f32; 4];
/// gain.process(&mut [&mut block[..]], false);
/// assert!((block[0] - 0.501).abs() < 1e-3);
/// ```
#[derive(Debug)]
pub struct GainStage {
    gain: LinearSmoothedParam,
    sample_rate: f64,
    params: Arc<GainParams>,
}

impl GainStage {
    /// Create a stage at `gain_db` (clamped) with the default 10 ms ramp.
    pub fn new(gain_db: f32) -> Self {
        let params = GainParams {
            gain_db: SharedParam::new(gain_db, GAIN_DB_RANGE.0, GAIN_DB_RANGE.1),
            ramp_seconds: SharedParam::new(DEFAULT_RAMP_SECONDS, 0.0, MAX_RAMP_SECONDS),
        };
        Self {
            gain: LinearSmoothedParam::new(db_to_linear(params.gain_db.get())),
            sample_rate: 0.0,
            params: Arc::new(params),
        }
    }

    /// Builder-style ramp length.
    pub fn with_ramp_duration_seconds(self, seconds: f32) -> Self {
        self.params.ramp_seconds.set(seconds);
        self
    }

    /// Handle for changing parameters from another thread.
    pub fn control(&self) -> GainControl {
        GainControl {
            params: Arc::clone(&self.params),
        }
    }

    /// Linear gain the ramp is heading to.
    pub fn gain_linear(&self) -> f32 {
        self.gain.current_target()
    }

    /// Gain target in dB.
    pub fn gain_db(&self) -> f32 {
        linear_to_db(self.gain_linear())
    }

    /// True while the gain is ramping.
    pub fn is_smoothing(&self) -> bool {
        self.gain.is_smoothing()
    }

    fn set_ramp_seconds(&mut self, seconds: f32) {
        self.gain
            .set_ramp_duration_seconds(self.sample_rate, f64::from(seconds));
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(DEFAULT_GAIN_DB)
    }
}

impl Stage for GainStage {
    fn name(&self) -> &'static str {
        "gain"
    }

    fn configure(&mut self, config: &StreamConfig) {
        self.sample_rate = config.sample_rate();
        let seconds = self.params.ramp_seconds.take_current();
        self.gain
            .set_immediate(db_to_linear(self.params.gain_db.take_current()));
        self.set_ramp_seconds(seconds);
    }

    fn apply_pending_changes(&mut self) {
        if let Some(seconds) = self.params.ramp_seconds.take() {
            self.set_ramp_seconds(seconds);
        }
        if let Some(db) = self.params.gain_db.take() {
            self.gain.glide_to(db_to_linear(db));

            #[cfg(feature = "tracing")]
            tracing::debug!(db, ramp_samples = self.gain.ramp_samples(), "gain target applied");
        }
    }

    fn process(&mut self, block: &mut [&mut [f32]], bypassed: bool) {
        let frames = block.first().map_or(0, |ch| ch.len());
        assert!(
            block.iter().all(|ch| ch.len() == frames),
            "channels have different lengths"
        );
        if bypassed {
            return;
        }

        if !self.gain.is_smoothing() {
            let g = self.gain.current();
            for channel in block.iter_mut() {
                for sample in channel.iter_mut() {
                    *sample *= g;
                }
            }
            return;
        }

        for i in 0..frames {
            let g = self.gain.next_value();
            for channel in block.iter_mut() {
                channel[i] *= g;
            }
        }
    }

    fn reset(&mut self) {
        self.gain.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxchain_core::signal::{channel_slices, to_channels};

    fn configured(db: f32) -> GainStage {
        let mut stage = GainStage::new(db);
        stage.configure(&StreamConfig::new(48000.0, 2, 1024).unwrap());
        stage
    }

    #[test]
    fn six_db_restores_unity() {
        let mut stage = configured(0.0);
        stage.control().set_gain_db(6.0);
        stage.apply_pending_changes();
        assert!(stage.is_smoothing());

        let amplitude = db_to_linear(-6.0);
        let mut signal = to_channels(&[amplitude; 1024], 2);
        stage.process(&mut channel_slices(&mut signal), false);

        assert!(!stage.is_smoothing());
        for channel in &signal {
            assert!((channel[1023] - 1.0).abs() < 1e-6, "got {}", channel[1023]);
            // 480-sample ramp
            assert!(channel[100] < channel[400]);
        }
    }

    #[test]
    fn ramp_shared_across_channels() {
        let mut stage = configured(0.0);
        stage.control().set_gain_db(-20.0);
        stage.apply_pending_changes();

        let mut signal = to_channels(&[1.0; 600], 2);
        stage.process(&mut channel_slices(&mut signal), false);
        assert_eq!(signal[0], signal[1]);
    }

    #[test]
    fn bypass_freezes_ramp() {
        let mut reference = configured(0.0);
        let mut stage = configured(0.0);
        for s in [&mut reference, &mut stage] {
            s.control().set_gain_db(12.0);
            s.apply_pending_changes();
        }

        let mut expected = to_channels(&[0.5; 400], 2);
        reference.process(&mut channel_slices(&mut expected), false);

        let mut first = to_channels(&[0.5; 150], 2);
        stage.process(&mut channel_slices(&mut first), false);

        let mut bypassed = to_channels(&[0.25; 64], 2);
        stage.process(&mut channel_slices(&mut bypassed), true);
        assert_eq!(bypassed, to_channels(&[0.25; 64], 2));

        let mut rest = to_channels(&[0.5; 250], 2);
        stage.process(&mut channel_slices(&mut rest), false);

        assert_eq!(&expected[0][..150], &first[0][..]);
        assert_eq!(&expected[0][150..], &rest[0][..]);
    }

    #[test]
    fn configure_adopts_without_ramp() {
        let mut stage = GainStage::new(0.0);
        stage.control().set_gain_db(-6.0);
        stage.configure(&StreamConfig::new(44100.0, 1, 64).unwrap());
        assert!(!stage.is_smoothing());
        assert!((stage.gain_db() + 6.0).abs() < 1e-4);
    }

    #[test]
    fn linear_and_db_accessors() {
        let stage = GainStage::default();
        let control = stage.control();
        control.set_gain_linear(0.5);
        assert!((control.gain_db() + 6.0206).abs() < 1e-3);
        assert!((control.gain_linear() - 0.5).abs() < 1e-5);

        control.set_gain_db(100.0);
        assert_eq!(control.gain_db(), 24.0);
        control.set_gain_linear(0.0);
        assert_eq!(control.gain_db(), -60.0);
    }

    #[test]
    fn ramp_duration_changes() {
        let mut stage = configured(0.0);
        let control = stage.control();
        control.set_ramp_duration_seconds(0.0);
        control.set_gain_db(-12.0);
        stage.apply_pending_changes();
        assert!(!stage.is_smoothing(), "zero-length ramp jumps");
        assert_eq!(control.ramp_duration_seconds(), 0.0);

        let mut signal = to_channels(&[1.0; 4], 2);
        stage.process(&mut channel_slices(&mut signal), false);
        assert!((signal[0][0] - db_to_linear(-12.0)).abs() < 1e-6);
    }
}
