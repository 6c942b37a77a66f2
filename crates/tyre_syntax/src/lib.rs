//! Textual notation for types.
//!
//! Fixtures, workspace files and the command line write types as text:
//! `(inout Array<?0>, #integer) -> any Equatable & Hashable`. This crate turns
//! that text into [`tyre_types::Type`] values.

pub mod error;
pub mod parser;
pub mod scanner;

pub use error::SyntaxError;
pub use parser::{parse_type, parse_type_with_params, TypeParser};
