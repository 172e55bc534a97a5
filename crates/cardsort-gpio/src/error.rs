//! Error types for GPIO operations.
//!
//! Configuration errors ([`GpioError::NotConfigured`],
//! [`GpioError::ConfigurationConflict`]) are programming errors: the fix is
//! to correct the configuration order, not to retry. Backend errors wrap
//! whatever the underlying driver reports.

/// Result type alias for GPIO operations.
pub type Result<T> = std::result::Result<T, GpioError>;

/// Errors that can occur during GPIO channel operations.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// Channel was used before being configured for the requested role.
    #[error("Channel {channel} is not configured for this operation")]
    NotConfigured { channel: u8 },

    /// Channel was reconfigured with different parameters without a reset.
    #[error("Channel {channel} is already configured with different parameters")]
    ConfigurationConflict { channel: u8 },

    /// Channel number is outside the usable header range.
    #[error("Invalid channel number: {channel}")]
    InvalidChannel { channel: u8 },

    /// Actuator group was constructed without any member channels.
    #[error("Actuator group '{group}' has no member channels")]
    EmptyGroup { group: String },

    /// Underlying hardware driver reported a failure.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GpioError {
    /// Create a new not-configured error.
    pub fn not_configured(channel: impl Into<u8>) -> Self {
        Self::NotConfigured {
            channel: channel.into(),
        }
    }

    /// Create a new configuration-conflict error.
    pub fn configuration_conflict(channel: impl Into<u8>) -> Self {
        Self::ConfigurationConflict {
            channel: channel.into(),
        }
    }

    /// Create a new invalid-channel error.
    pub fn invalid_channel(channel: u8) -> Self {
        Self::InvalidChannel { channel }
    }

    /// Create a new empty-group error.
    pub fn empty_group(group: impl Into<String>) -> Self {
        Self::EmptyGroup {
            group: group.into(),
        }
    }

    /// Create a new backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_error() {
        let error = GpioError::not_configured(24u8);
        assert!(matches!(error, GpioError::NotConfigured { channel: 24 }));
        assert_eq!(
            error.to_string(),
            "Channel 24 is not configured for this operation"
        );
    }

    #[test]
    fn test_configuration_conflict_error() {
        let error = GpioError::configuration_conflict(14u8);
        assert!(matches!(
            error,
            GpioError::ConfigurationConflict { channel: 14 }
        ));
    }

    #[test]
    fn test_empty_group_error() {
        let error = GpioError::empty_group("flaps");
        assert_eq!(
            error.to_string(),
            "Actuator group 'flaps' has no member channels"
        );
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            GpioError::invalid_channel(99),
            GpioError::backend("driver unavailable"),
            GpioError::not_configured(7u8),
        ];

        for error in errors {
            let _ = format!("{}", error);
            let _ = format!("{:?}", error);
        }
    }
}
