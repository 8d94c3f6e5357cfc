//! Coarse classification of client errors.

use std::fmt;

/// High-level bucket an error falls into.
///
/// Drives retry decisions and the hint shown next to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Could not reach the backend, or the connection dropped.
    Network,
    /// Backend rejected the credentials (401/403).
    Auth,
    /// Backend failed (5xx) or reported an error in the stream.
    Server,
    /// The request itself was wrong (4xx other than auth), or the client
    /// could not understand a response.
    Client,
    /// Missing or invalid configuration.
    Configuration,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Configuration => "configuration",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the chat server is running and reachable",
            ErrorCategory::Auth => "Check CONFAB_TOKEN or CONFAB_SESSION_COOKIE",
            ErrorCategory::Server => "The server had a problem. Try again in a moment",
            ErrorCategory::Client => "The request was rejected. Check the conversation id",
            ErrorCategory::Configuration => "Check the CONFAB_* environment variables",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
