//! First-order (6 dB/oct) IIR low-pass and high-pass sections.
//!
//! Coefficients come from the bilinear transform of the analog one-pole
//! prototypes with frequency pre-warping:
//!
//! ```text
//! K  = tan(π · fc / fs)
//! a1 = (K − 1) / (K + 1)
//!
//! low-pass:   b0 = b1 = K / (K + 1)
//! high-pass:  b0 = 1 / (K + 1),  b1 = −b0
//!
//! y[n] = b0 · x[n] + b1 · x[n−1] − a1 · y[n−1]
//! ```
//!
//! Both responses are monotonic: unity gain in the pass band, exactly −3 dB
//! at `fc`, and a zero at Nyquist (LP) or DC (HP).
//!
//! The coefficients are shared; each channel owns a [`FirstOrderState`].
//!
//! # Reference
//!
//! Udo Zölzer, "Digital Audio Signal Processing", 2nd ed., Section 5.2.

use crate::flush_denormal;

/// Highest cutoff, as a fraction of the sample rate, used when computing
/// coefficients. Keeps `tan` well away from its pole at Nyquist.
pub const MAX_CUTOFF_RATIO: f64 = 0.49;

/// Response of a first-order section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Passes frequencies below the cutoff.
    #[default]
    LowPass,
    /// Passes frequencies above the cutoff.
    HighPass,
}

/// Coefficients of a first-order section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrderCoefficients {
    /// Feed-forward gain for x[n].
    pub b0: f32,
    /// Feed-forward gain for x[n−1].
    pub b1: f32,
    /// Feedback gain for y[n−1] (subtracted).
    pub a1: f32,
}

impl FirstOrderCoefficients {
    /// Pass-through section (`b0 = 1`).
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        a1: 0.0,
    };

    /// Compute coefficients for `mode` at `cutoff_hz`.
    ///
    /// The cutoff is limited to `(0, 0.49 · sample_rate]`. A non-positive
    /// sample rate yields [`IDENTITY`](Self::IDENTITY).
    ///
    /// # Example
    ///
    /// ```rust
    /// use fxchain_core::{FilterMode, FirstOrderCoefficients};
    ///
    /// let lp = FirstOrderCoefficients::new(FilterMode::LowPass, 1000.0, 48000.0);
    /// // DC gain: (b0 + b1) / (1 + a1) = 1
    /// assert!(((lp.b0 + lp.b1) / (1.0 + lp.a1) - 1.0).abs() < 1e-6);
    /// ```
    pub fn new(mode: FilterMode, cutoff_hz: f64, sample_rate: f64) -> Self {
        if sample_rate <= 0.0 || !sample_rate.is_finite() {
            return Self::IDENTITY;
        }
        let cutoff = cutoff_hz.clamp(1e-3, MAX_CUTOFF_RATIO * sample_rate);
        let k = libm::tan(core::f64::consts::PI * cutoff / sample_rate);
        let norm = 1.0 / (k + 1.0);
        let a1 = ((k - 1.0) * norm) as f32;

        match mode {
            FilterMode::LowPass => {
                let b = (k * norm) as f32;
                Self { b0: b, b1: b, a1 }
            }
            FilterMode::HighPass => {
                let b = norm as f32;
                Self { b0: b, b1: -b, a1 }
            }
        }
    }

    /// Magnitude response at `freq_hz` (linear).
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * core::f64::consts::PI * freq_hz / sample_rate;
        let (sin, cos) = (libm::sin(w), libm::cos(w));
        // H(e^jw) = (b0 + b1 e^-jw) / (1 + a1 e^-jw)
        let (b0, b1, a1) = (f64::from(self.b0), f64::from(self.b1), f64::from(self.a1));
        let num_re = b0 + b1 * cos;
        let num_im = -b1 * sin;
        let den_re = 1.0 + a1 * cos;
        let den_im = -a1 * sin;
        libm::sqrt((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im))
    }
}

impl Default for FirstOrderCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-channel registers of a first-order section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FirstOrderState {
    x1: f32,
    y1: f32,
}

impl FirstOrderState {
    /// Process one sample.
    #[inline]
    pub fn process(&mut self, coeffs: &FirstOrderCoefficients, input: f32) -> f32 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 - coeffs.a1 * self.y1;
        self.x1 = input;
        self.y1 = flush_denormal(output);
        output
    }

    /// Clear the registers.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
