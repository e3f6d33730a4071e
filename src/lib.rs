//! Chained HTTP request workflows.
//!
//! A workflow is an ordered list of HTTP requests. Requests are executed one
//! at a time or in sequence, values are extracted from their responses, and
//! later requests reference those values with `!name!` tokens in their URL,
//! headers and payload.
//!
//! # Architecture
//!
//! - **models**: Request definitions, response records and saved values
//! - **variables**: Token parsing, scope resolution, substitution and
//!   extraction of values from responses
//! - **formatter**: Tolerant pretty-printing of request JSON text
//! - **workflow**: The request list with its re-indexing rules, workflow
//!   files and validation
//! - **executor**: The HTTP client seam, the reqwest client and the
//!   sequencer that runs requests
//! - **config**: Global settings
//!
//! # Tokens
//!
//! In headers and arguments text:
//!
//! ```text
//! !name!                             value as JSON, strings quoted
//! !name:no-quotes!                   strings inserted without quotes
//! !name:pattern:replacement!         regex rewrite before quoting
//! !name:no-quotes:pattern:replacement!
//! ```
//!
//! In URLs, `raw` takes the place of `no-quotes` and turns off percent-encoding.
//!
//! A value captured from the response of request `i` is visible to requests
//! after `i` only. Values entered by hand are visible everywhere.
//!
//! # Example
//!
//! ```no_run
//! use apex::executor::{ReqwestClient, Workflow};
//! use apex::models::{HttpMethod, RequestDefinition, SaveConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = Workflow::new(ReqwestClient::from_global_config()?);
//!
//! workflow.submit(RequestDefinition::new(HttpMethod::GET, "https://httpbin.org/uuid"));
//! workflow.submit(
//!     RequestDefinition::new(HttpMethod::POST, "https://httpbin.org/post")
//!         .with_arguments(r#"{"id": !uuid!}"#),
//! );
//! workflow.save_value(SaveConfig::from_response("uuid", "uuid", json!(null), 0))?;
//!
//! workflow.run_all().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod executor;
pub mod formatter;
pub mod models;
pub mod variables;
pub mod workflow;

pub use executor::{HttpCall, HttpClient, RequestError, Workflow};
pub use models::{HttpMethod, RequestDefinition, ResponseRecord, SaveConfig, SavedValue};
pub use workflow::{WorkflowError, WorkflowState};
