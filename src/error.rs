//! Error types shared by environments, action selection and agents.

use thiserror::Error;

/// Result type alias for bandit operations.
pub type Result<T> = std::result::Result<T, BanditError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    /// Malformed arguments handed to an operation at call time.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// An agent, strategy or environment was built with inconsistent parameters.
    #[error("configuration error: {message}")]
    ConfigurationError { message: String },
}

impl BanditError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        BanditError::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        BanditError::ConfigurationError {
            message: message.into(),
        }
    }
}
