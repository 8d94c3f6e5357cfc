//! The error type every client and session operation returns.

use std::fmt;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::stream::StreamError;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    Network(NetworkError),
    Stream(StreamError),
    /// Configuration could not be loaded.
    Config { message: String },
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Network(NetworkError::HttpStatus { status, .. }) => match *status {
                401 | 403 => ErrorCategory::Auth,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            ClientError::Network(NetworkError::InvalidResponse { .. })
            | ClientError::Network(NetworkError::InvalidRequest { .. }) => ErrorCategory::Client,
            ClientError::Network(_) => ErrorCategory::Network,
            ClientError::Stream(StreamError::ConnectionLost { .. }) => ErrorCategory::Network,
            ClientError::Stream(StreamError::BackendError { .. }) => ErrorCategory::Server,
            ClientError::Stream(StreamError::InvalidJson { .. }) => ErrorCategory::Client,
            ClientError::Config { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(err) => err.is_retryable(),
            ClientError::Stream(err) => err.is_retryable(),
            ClientError::Config { .. } => false,
        }
    }

    /// Message suitable for showing next to the failed conversation.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(err) => err.user_message(),
            ClientError::Stream(err) => err.user_message(),
            ClientError::Config { message } => format!("Configuration error: {}", message),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network(err) => err.error_code(),
            ClientError::Stream(err) => err.error_code(),
            ClientError::Config { .. } => "E_CONFIG",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(err) => write!(f, "{}", err),
            ClientError::Stream(err) => write!(f, "{}", err),
            ClientError::Config { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Network(err) => Some(err),
            ClientError::Stream(err) => Some(err),
            ClientError::Config { .. } => None,
        }
    }
}

impl From<NetworkError> for ClientError {
    fn from(err: NetworkError) -> Self {
        ClientError::Network(err)
    }
}

impl From<StreamError> for ClientError {
    fn from(err: StreamError) -> Self {
        ClientError::Stream(err)
    }
}
