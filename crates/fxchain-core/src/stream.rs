//! Stream description shared by every stage.
//!
//! A [`StreamConfig`] is handed to the pipeline once before streaming starts
//! (and again whenever the host changes rate or layout). Construction is the
//! only place it is validated; stages may rely on a positive finite sample
//! rate and non-zero channel/block counts.

use crate::error::{ConfigError, Result};

/// Sample rate, channel count, and maximum block size for a stream.
///
/// Immutable between two configuration events.
///
/// # Example
///
/// ```rust
/// use fxchain_core::{ConfigError, StreamConfig};
///
/// let config = StreamConfig::new(48000.0, 2, 512).unwrap();
/// assert_eq!(config.num_channels(), 2);
///
/// assert_eq!(
///     StreamConfig::new(0.0, 2, 512),
///     Err(ConfigError::InvalidSampleRate(0.0))
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamConfig {
    sample_rate: f64,
    num_channels: usize,
    max_block_size: usize,
}

impl StreamConfig {
    /// Validate and build a stream description.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidSampleRate`] if `sample_rate` is not finite or not > 0
    /// - [`ConfigError::NoChannels`] if `num_channels == 0`
    /// - [`ConfigError::ZeroBlockSize`] if `max_block_size == 0`
    pub fn new(sample_rate: f64, num_channels: usize, max_block_size: usize) -> Result<Self> {
        validate_layout(sample_rate, num_channels)?;
        if max_block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        Ok(Self {
            sample_rate,
            num_channels,
            max_block_size,
        })
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of channels in every block.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Largest block the host will deliver, in samples per channel.
    #[inline]
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }
}

/// Check a sample rate and channel count without a block size.
///
/// Used by components that are configured from a rate and channel count
/// alone, such as [`DelayLine`](crate::DelayLine).
///
/// # Errors
///
/// - [`ConfigError::InvalidSampleRate`] if `sample_rate` is not finite or not > 0
/// - [`ConfigError::NoChannels`] if `num_channels == 0`
pub fn validate_layout(sample_rate: f64, num_channels: usize) -> Result<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ConfigError::InvalidSampleRate(sample_rate));
    }
    if num_channels == 0 {
        return Err(ConfigError::NoChannels);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_streams() {
        for rate in [22050.0, 44100.0, 48000.0, 96000.0, 192000.0] {
            let config = StreamConfig::new(rate, 2, 256).unwrap();
            assert_eq!(config.sample_rate(), rate);
            assert_eq!(config.max_block_size(), 256);
        }
    }

    #[test]
    fn rejects_bad_sample_rates() {
        for rate in [0.0, -44100.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                StreamConfig::new(rate, 2, 256),
                Err(ConfigError::InvalidSampleRate(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_channels_and_blocks() {
        assert_eq!(
            StreamConfig::new(48000.0, 0, 256),
            Err(ConfigError::NoChannels)
        );
        assert_eq!(
            StreamConfig::new(48000.0, 1, 0),
            Err(ConfigError::ZeroBlockSize)
        );
    }
}
