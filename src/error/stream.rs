//! Failures that happen after a request was accepted: while reading the event
//! stream or decoding a response body.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The byte stream failed part way through.
    ConnectionLost { message: String },

    /// The server sent an `error` event.
    BackendError { message: String },

    /// A buffered response body was not the expected JSON.
    InvalidJson { context: String, message: String },
}

impl StreamError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::ConnectionLost { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "The connection to the server was lost mid-reply.".to_string()
            }
            StreamError::BackendError { message } => format!("Server error: {}", message),
            StreamError::InvalidJson { .. } => {
                "Received invalid data from the server.".to_string()
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
            StreamError::InvalidJson { .. } => "E_STREAM_JSON",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::BackendError { message } => write!(f, "Backend error: {}", message),
            StreamError::InvalidJson { context, message } => {
                write!(f, "Invalid JSON in {}: {}", context, message)
            }
        }
    }
}

impl std::error::Error for StreamError {}
