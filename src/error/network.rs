//! Transport failures, classified.
//!
//! [`HttpError`] is what the HTTP seam reports; [`NetworkError`] is the same
//! failure with the endpoint attached and enough structure to decide on
//! retries and user messages.

use std::fmt;

use crate::traits::HttpError;

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Could not connect to the server.
    ConnectionFailed { url: String, message: String },

    /// Request did not complete in time.
    Timeout { url: String },

    /// Server answered with a non-2xx status.
    HttpStatus { status: u16, message: String },

    /// Response body could not be read or decoded.
    InvalidResponse { message: String },

    /// Request could not be built (bad URL, bad header value).
    InvalidRequest { message: String },

    Other { message: String },
}

impl NetworkError {
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. }
            | NetworkError::InvalidRequest { .. }
            | NetworkError::Other { .. } => false,
        }
    }

    /// Status code, for `HttpStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { url, .. } => {
                format!("Unable to connect to the chat server at {}.", url)
            }
            NetworkError::Timeout { .. } => {
                "The chat server took too long to respond.".to_string()
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The server rejected the request.".to_string(),
                401 => "Authentication required. Check your credentials.".to_string(),
                403 => "Access denied.".to_string(),
                404 => "Conversation not found.".to_string(),
                429 => "Too many requests. Please wait a moment.".to_string(),
                500..=599 => "The chat server is having problems.".to_string(),
                other => format!("The chat server returned HTTP {}.", other),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an unreadable response from the server.".to_string()
            }
            NetworkError::InvalidRequest { message } => {
                format!("Could not build the request: {}", message)
            }
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::InvalidRequest { .. } => "E_NET_REQUEST",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { url } => write!(f, "Request to '{}' timed out", url),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::InvalidRequest { message } => {
                write!(f, "Invalid request: {}", message)
            }
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Attach the endpoint to a raw transport error.
pub fn classify_http_error(err: HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        HttpError::Timeout(_) => NetworkError::Timeout {
            url: url.to_string(),
        },
        HttpError::ServerError { status, message } => NetworkError::HttpStatus { status, message },
        HttpError::Body(message) => NetworkError::InvalidResponse { message },
        HttpError::InvalidRequest(message) => NetworkError::InvalidRequest { message },
        HttpError::Other(message) => NetworkError::Other { message },
    }
}
