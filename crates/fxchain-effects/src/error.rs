//! Error types for the effect chain.

use fxchain_core::ConfigError;
use thiserror::Error;

/// Errors returned by the chain and the host facade.
///
/// Shape mismatches between a block and the configured stream are not
/// errors: they are programming mistakes and panic.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ChainError {
    /// The stream description was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A block arrived before `configure_stream`.
    #[error("effect chain has not been configured for a stream")]
    NotConfigured,
}

/// Result type for chain operations.
pub type Result<T> = core::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn config_errors_convert_and_display_transparently() {
        let err: ChainError = ConfigError::NoChannels.into();
        assert_eq!(err, ChainError::Config(ConfigError::NoChannels));
        assert_eq!(err.to_string(), ConfigError::NoChannels.to_string());
    }

    #[test]
    fn not_configured_display() {
        assert!(ChainError::NotConfigured.to_string().contains("not been configured"));
    }
}
