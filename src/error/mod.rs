//! Error taxonomy for the chat client.
//!
//! - [`NetworkError`]: the request never produced a usable response
//! - [`StreamError`]: the response started but could not be read to the end
//! - [`ClientError`]: what public operations return, with a category,
//!   an error code for logs and a user-facing message
//!
//! | Category | Typical cause | Retryable |
//! |----------|---------------|-----------|
//! | Network | Server unreachable, timeout, dropped stream | Yes |
//! | Auth | 401 / 403 | No |
//! | Server | 5xx, `error` event | Yes |
//! | Client | Other 4xx, unreadable body | No |
//! | Configuration | Bad `CONFAB_*` variable | No |

mod category;
mod client_error;
mod network;
mod stream;

pub use category::ErrorCategory;
pub use client_error::ClientError;
pub use network::{classify_http_error, NetworkError};
pub use stream::StreamError;

/// Result alias for client and session operations.
pub type ClientResult<T> = Result<T, ClientError>;
