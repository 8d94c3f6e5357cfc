//! Mock implementations for testing.
//!
//! Lets the client and session run end to end without network access.

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
