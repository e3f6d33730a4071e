//! Variables module.
//!
//! Parsing of `!name!` tokens, scope resolution against the saved-value
//! store, substitution into request text, and extraction of values from
//! stored responses.

pub mod error;
pub mod extract;
pub mod scope;
pub mod substitution;
pub mod token;

pub use error::VarError;
pub use extract::{extract_nested_response_data, extract_path, response_keys};
pub use scope::{compute_scope, Scope};
pub use substitution::{stringify, substitute_body, substitute_url};
pub use token::{is_valid_name, tokens, EncodingMode, Rewrite, Token, TokenContext};
