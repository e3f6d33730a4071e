//! HTTP request execution.
//!
//! Requests are resolved into [`HttpCall`]s against the saved values visible
//! to them and dispatched through an [`HttpClient`]. [`Workflow`] sequences
//! those calls over a request list.

pub mod client;
pub mod config;
pub mod error;
pub mod sequencer;

// reqwest-backed client, not available without the native feature
#[cfg(feature = "native")]
pub mod native;

pub use client::{HttpCall, HttpClient};
pub use config::{ExecutionConfig, RunConfig};
pub use error::RequestError;
pub use sequencer::Workflow;

#[cfg(feature = "native")]
pub use native::ReqwestClient;
