//! tyre_core: Core utilities for the tyre type resolution engine.
//!
//! Provides interned names, entity handles, text spans, and the provenance
//! locators that tie constraints and diagnostics back to source constructs.

pub mod ids;
pub mod intern;
pub mod locator;
pub mod text;

// Re-export commonly used types
pub use ids::{DeclId, NodeId};
pub use intern::{Name, NameTable};
pub use locator::{Locator, PathElement};
pub use text::TextSpan;
