//! confab - a streaming chat client for a conversation backend
//!
//! The backend replies to a message as a line-delimited event stream. This
//! crate decodes that stream ([`sse`]), talks to the HTTP API ([`client`]),
//! and folds events into an observable conversation session ([`session`]).
//!
//! This library exposes modules for use in integration tests and the binary.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;

pub use client::{ChatClient, EventStream};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Phase, SessionController, SessionState};
