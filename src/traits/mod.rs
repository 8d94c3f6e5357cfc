//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP transport used by the chat client
//! - [`ConversationListObserver`] - outward "conversation list changed" signal

pub mod http;
pub mod observer;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use observer::{ConversationListObserver, NoopObserver};
