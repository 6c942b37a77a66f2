//! tyre_traits: conformance and member queries.
//!
//! The solver never owns declarations. It asks a [`TypeContext`] whether a
//! type conforms to a trait, what members a type has, and which types a
//! literal can become. [`TraitTable`] is the in-memory implementation used by
//! the driver and the tests.

pub mod context;
pub mod table;

pub use context::{Candidate, GenericParam, TypeContext};
pub use table::{TableError, TraitTable};
