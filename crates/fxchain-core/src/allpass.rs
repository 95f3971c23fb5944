//! Allpass filter for reverb diffusion.
//!
//! A Schroeder allpass with a fixed gain of 0.5, as used by Freeverb. Four
//! of them in series smear the comb outputs into a dense tail.

use alloc::vec;
use alloc::vec::Vec;

use crate::flush_denormal;

/// Diffusion gain of the allpass.
const ALLPASS_GAIN: f32 = 0.5;

/// Schroeder allpass filter for diffusion.
///
/// Allpass filters pass all frequencies at equal amplitude but modify
/// the phase. In reverb, they "smear" the impulse response, creating
/// a denser, more diffuse sound.
///
/// # Example
///
/// ```rust
/// use fxchain_core::AllpassFilter;
///
/// let mut allpass = AllpassFilter::new(500);
/// assert_eq!(allpass.process(1.0), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
}

impl AllpassFilter {
    /// Create an allpass with a delay of `delay_samples` (at least one).
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
        }
    }

    /// Process one sample.
    ///
    /// ```text
    /// output       = delayed − input
    /// delay_input  = input + delayed · 0.5
    /// ```
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.index];
        self.buffer[self.index] = flush_denormal(input + delayed * ALLPASS_GAIN);
        self.index += 1;
        if self.index == self.buffer.len() {
            self.index = 0;
        }
        delayed - input
    }

    /// Clear the allpass filter state.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }

    /// Delay length in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false: an allpass holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
