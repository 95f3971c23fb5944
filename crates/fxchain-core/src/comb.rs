//! Damped feedback comb filter for reverb algorithms.
//!
//! A fixed-length delay whose output is low-passed (one pole, the "damping")
//! and fed back into its input. Eight of these in parallel form the body of
//! a Freeverb tank.

use alloc::vec;
use alloc::vec::Vec;

use crate::flush_denormal;

/// Comb filter with feedback and damping.
///
/// The feedback path includes a one-pole lowpass filter for high-frequency
/// damping, simulating the absorption of high frequencies in real acoustic
/// spaces. Feedback and damping are passed per sample so a reverb can ramp
/// them without touching every comb.
///
/// # Example
///
/// ```rust
/// use fxchain_core::CombFilter;
///
/// let mut comb = CombFilter::new(3);
/// assert_eq!(comb.process(1.0, 0.5, 0.0), 0.0);
/// comb.process(0.0, 0.5, 0.0);
/// comb.process(0.0, 0.5, 0.0);
/// assert_eq!(comb.process(0.0, 0.5, 0.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    last: f32,
}

impl CombFilter {
    /// Create a comb with a delay of `delay_samples` (at least one).
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            last: 0.0,
        }
    }

    /// Process one sample.
    ///
    /// `damp` in [0, 1]: 0 is bright, 1 holds the previous feedback forever.
    #[inline]
    pub fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let output = self.buffer[self.index];
        self.last = flush_denormal(output * (1.0 - damp) + self.last * damp);
        self.buffer[self.index] = input + self.last * feedback;
        self.index += 1;
        if self.index == self.buffer.len() {
            self.index = 0;
        }
        output
    }

    /// Clear the comb filter state.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
        self.last = 0.0;
    }

    /// Delay length in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false: a comb holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comb_basic() {
        let mut comb = CombFilter::new(100);

        let first = comb.process(1.0, 0.5, 0.2);
        assert_eq!(first, 0.0); // First output is from empty delay

        for _ in 0..99 {
            comb.process(0.0, 0.5, 0.2);
        }

        let echo = comb.process(0.0, 0.5, 0.2);
        assert!(echo.abs() > 0.1, "Should have echo, got {}", echo);
    }

    #[test]
    fn test_comb_feedback_decay() {
        let mut comb = CombFilter::new(10);
        comb.process(1.0, 0.8, 0.0);

        let mut last_peak = 0.0f32;
        for _ in 0..100 {
            let out = comb.process(0.0, 0.8, 0.0);
            if out.abs() > 0.01 {
                if last_peak > 0.0 {
                    assert!(out.abs() <= last_peak + 0.01, "Echo should decay");
                }
                last_peak = out.abs();
            }
        }
    }

    #[test]
    fn test_comb_damping_darkens() {
        let mut bright = CombFilter::new(20);
        let mut dark = CombFilter::new(20);
        bright.process(1.0, 0.8, 0.0);
        dark.process(1.0, 0.8, 0.8);

        let mut bright_sum = 0.0f32;
        let mut dark_sum = 0.0f32;
        for _ in 0..200 {
            bright_sum += bright.process(0.0, 0.8, 0.0).abs();
            dark_sum += dark.process(0.0, 0.8, 0.8).abs();
        }
        assert!(dark_sum < bright_sum, "Damping should remove energy");
    }

    #[test]
    fn test_comb_clear() {
        let mut comb = CombFilter::new(10);
        for _ in 0..20 {
            comb.process(1.0, 0.7, 0.2);
        }

        comb.clear();

        for _ in 0..20 {
            let out = comb.process(0.0, 0.7, 0.2);
            assert!(out.abs() < 1e-10, "Should be silent after clear");
        }
    }

    #[test]
    fn zero_length_is_one() {
        let comb = CombFilter::new(0);
        assert_eq!(comb.len(), 1);
        assert!(!comb.is_empty());
    }
}
