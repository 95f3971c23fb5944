//! Error types for stream configuration.

use thiserror::Error;

/// Errors raised while validating a stream description.
///
/// Processing never returns these: once a [`StreamConfig`](crate::StreamConfig)
/// exists it is known to be usable, so the audio path has no error branch.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Sample rate was zero, negative, or not a finite number.
    #[error("invalid sample rate: {0} Hz (must be finite and > 0)")]
    InvalidSampleRate(f64),

    /// Stream has zero channels.
    #[error("stream must have at least one channel")]
    NoChannels,

    /// Maximum block size was zero.
    #[error("maximum block size must be at least one sample")]
    ZeroBlockSize,
}

/// Result type for configuration operations.
pub type Result<T> = core::result::Result<T, ConfigError>;
