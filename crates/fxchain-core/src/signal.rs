//! Deterministic test signals.
//!
//! Small generators used by tests, benches, and the demo to drive a pipeline
//! with known input. Not intended for the audio thread (they allocate).

use alloc::vec;
use alloc::vec::Vec;

/// `len` samples: `amplitude` at index 0, zeros after.
///
/// ```rust
/// assert_eq!(fxchain_core::signal::impulse(4, 0.5), [0.5, 0.0, 0.0, 0.0]);
/// ```
pub fn impulse(len: usize, amplitude: f32) -> Vec<f32> {
    let mut signal = vec![0.0; len];
    if let Some(first) = signal.first_mut() {
        *first = amplitude;
    }
    signal
}

/// `len` samples rising linearly: `start, start + step, start + 2·step, …`
///
/// ```rust
/// assert_eq!(fxchain_core::signal::ramp(4, 1.0, 1.0), [1.0, 2.0, 3.0, 4.0]);
/// ```
pub fn ramp(len: usize, start: f32, step: f32) -> Vec<f32> {
    (0..len).map(|i| start + step * i as f32).collect()
}

/// `len` samples of a sine at `freq_hz`.
pub fn sine(len: usize, freq_hz: f32, sample_rate: f32, amplitude: f32) -> Vec<f32> {
    let w = 2.0 * core::f32::consts::PI * freq_hz / sample_rate;
    (0..len)
        .map(|i| amplitude * libm::sinf(w * i as f32))
        .collect()
}

/// Copy one signal onto `num_channels` channels.
pub fn to_channels(signal: &[f32], num_channels: usize) -> Vec<Vec<f32>> {
    vec![signal.to_vec(); num_channels]
}

/// Borrow owned channels as the `&mut [&mut [f32]]` block shape.
///
/// ```rust
/// use fxchain_core::signal::{channel_slices, to_channels, ramp};
///
/// let mut channels = to_channels(&ramp(3, 0.0, 1.0), 2);
/// let block = channel_slices(&mut channels);
/// assert_eq!(block.len(), 2);
/// assert_eq!(block[1], [0.0, 1.0, 2.0]);
/// ```
pub fn channel_slices(channels: &mut [Vec<f32>]) -> Vec<&mut [f32]> {
    channels.iter_mut().map(Vec::as_mut_slice).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_of_zero_length() {
        assert!(impulse(0, 1.0).is_empty());
    }

    #[test]
    fn tenth_steps() {
        let r = ramp(4, 0.1, 0.1);
        assert!((r[3] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn sine_starts_at_zero_and_stays_bounded() {
        let s = sine(480, 1000.0, 48000.0, 0.5);
        assert_eq!(s[0], 0.0);
        assert!(s.iter().all(|x| x.abs() <= 0.5 + 1e-6));
        // quarter period at 1 kHz / 48 kHz
        assert!((s[12] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn channels_are_copies() {
        let channels = to_channels(&[1.0, 2.0], 3);
        assert_eq!(channels.len(), 3);
        assert!(channels.iter().all(|c| *c == [1.0f32, 2.0]));
    }
}
