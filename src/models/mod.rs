//! Data models for workflows.
//!
//! This module contains the request definitions a user authors, the response
//! records kept per request position, and the saved values passed between
//! requests.

pub mod request;
pub mod response;
pub mod saved;

pub use request::{HttpMethod, RequestDefinition};
pub use response::{HttpResponse, ResponseRecord};
pub use saved::{Availability, SaveConfig, SavedValue};
