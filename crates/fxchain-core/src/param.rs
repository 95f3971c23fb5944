//! Linear parameter ramps for click-free control changes.
//!
//! A control value (feedback, gain, reverb coefficients) that jumps between
//! two samples produces an audible click. [`LinearSmoothedParam`] instead
//! moves toward a new target in equal steps and lands on it exactly.
//!
//! ## Usage
//!
//! ```rust
//! use fxchain_core::LinearSmoothedParam;
//!
//! let mut gain = LinearSmoothedParam::new(1.0);
//! gain.set_target(0.5, 4);
//!
//! assert_eq!(gain.next_value(), 0.875);
//! assert_eq!(gain.next_value(), 0.75);
//! assert_eq!(gain.next_value(), 0.625);
//! assert_eq!(gain.next_value(), 0.5);
//! assert_eq!(gain.next_value(), 0.5); // holds
//! assert_eq!(gain.current_target(), 0.5);
//! ```
//!
//! ## Ownership
//!
//! A ramp is advanced by the audio thread only. Values set from another thread
//! travel through a [`SharedParam`](crate::SharedParam) and are turned into a
//! new ramp target when the owning stage applies pending changes.

/// A parameter that ramps linearly (constant rate) to its target.
///
/// After exactly `ramp_samples` calls to [`next_value`](Self::next_value) the
/// value equals the target bit-for-bit and stays there.
///
/// # Invariants
///
/// - `samples_remaining == 0` implies `current == target`
/// - When a range is configured, `target` always lies inside it
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    /// Current value
    current: f32,
    /// Target value
    target: f32,
    /// Increment per sample (can be positive or negative)
    increment: f32,
    /// Samples remaining until target reached
    samples_remaining: u32,
    /// Ramp length used by [`glide_to`](Self::glide_to)
    default_ramp_samples: u32,
    /// Optional clamp range applied by every setter
    range: Option<(f32, f32)>,
}

impl LinearSmoothedParam {
    /// Create a parameter resting at `initial`, with no clamp range and a
    /// zero-length default ramp.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            samples_remaining: 0,
            default_ramp_samples: 0,
            range: None,
        }
    }

    /// Clamp every future target (and the current value) to `[min, max]`.
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        debug_assert!(min <= max, "invalid range [{min}, {max}]");
        self.range = Some((min, max));
        self.current = self.clamp(self.current);
        self.target = self.current;
        self
    }

    /// Start a linear ramp from the current value to `value` over
    /// `ramp_samples` steps.
    ///
    /// The value is clamped to the configured range first. A zero-length ramp
    /// jumps immediately. Re-issuing the target that is already being ramped
    /// to keeps the ramp in progress if it lands within `ramp_samples`;
    /// otherwise the ramp restarts with the shorter length.
    pub fn set_target(&mut self, value: f32, ramp_samples: u32) {
        let value = self.clamp(value);
        if value == self.target && self.samples_remaining <= ramp_samples {
            return;
        }

        self.target = value;
        if ramp_samples == 0 || value == self.current {
            self.snap_to_target();
        } else {
            self.increment = (value - self.current) / ramp_samples as f32;
            self.samples_remaining = ramp_samples;
        }
    }

    /// Ramp to `value` over the default ramp length.
    ///
    /// See [`set_ramp_duration_seconds`](Self::set_ramp_duration_seconds).
    pub fn glide_to(&mut self, value: f32) {
        self.set_target(value, self.default_ramp_samples);
    }

    /// Set value immediately, cancelling any ramp in progress.
    pub fn set_immediate(&mut self, value: f32) {
        self.target = self.clamp(value);
        self.snap_to_target();
    }

    /// Set the default ramp length from a duration and sample rate.
    ///
    /// A ramp in progress finishes at its target immediately, mirroring how a
    /// host re-prepares a processor.
    pub fn set_ramp_duration_seconds(&mut self, sample_rate: f64, seconds: f64) {
        let samples = libm::round(sample_rate * seconds.max(0.0));
        self.default_ramp_samples = if samples.is_finite() && samples > 0.0 {
            samples.min(f64::from(u32::MAX)) as u32
        } else {
            0
        };
        self.snap_to_target();
    }

    /// Default ramp length in samples.
    #[inline]
    pub fn ramp_samples(&self) -> u32 {
        self.default_ramp_samples
    }

    /// Advance one sample and return the new value.
    ///
    /// Call once per sample index. On the final step the value snaps to the
    /// exact target so accumulated rounding never leaves it short.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.increment;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                self.current = self.target; // Snap to exact target
            }
        }
        self.current
    }

    /// Advance `samples` steps at once.
    pub fn skip(&mut self, samples: u32) -> f32 {
        if samples >= self.samples_remaining {
            self.snap_to_target();
        } else {
            self.current += self.increment * samples as f32;
            self.samples_remaining -= samples;
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Target value without advancing.
    #[inline]
    pub fn current_target(&self) -> f32 {
        self.target
    }

    /// True while a ramp is in progress.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.samples_remaining > 0
    }

    /// Snap to target immediately.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }

    #[inline]
    fn clamp(&self, value: f32) -> f32 {
        match self.range {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        }
    }
}

impl Default for LinearSmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
