//! Provenance locators.
//!
//! A locator names the AST node a constraint was generated from (its anchor)
//! and, optionally, a path refining which part of that node's type the
//! constraint is about. When the solver decomposes a constraint into smaller
//! ones it appends path elements, so a failure deep inside a function type
//! still reports the exact parameter that did not fit.

use crate::ids::{DeclId, NodeId};
use crate::intern::{Name, NameTable};
use crate::text::TextSpan;
use std::fmt;

/// One step of a locator path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// The i-th parameter of a function type.
    Argument(u32),
    /// The return type of a function type.
    Result,
    /// The i-th element of a tuple type.
    TupleElement(u32),
    /// The i-th generic argument of a nominal type.
    GenericArgument(u32),
    /// A member access.
    Member(Name),
    /// An overload candidate being tried.
    Candidate(DeclId),
    /// The i-th alternative of a disjunction.
    Minterm(u32),
}

/// Provenance of a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub anchor: NodeId,
    pub span: Option<TextSpan>,
    pub path: Vec<PathElement>,
}

impl Locator {
    pub fn new(anchor: NodeId) -> Self {
        Self {
            anchor,
            span: None,
            path: Vec::new(),
        }
    }

    pub fn with_span(anchor: NodeId, span: TextSpan) -> Self {
        Self {
            anchor,
            span: Some(span),
            path: Vec::new(),
        }
    }

    /// Return a copy of this locator extended by one path element.
    pub fn appending(&self, element: PathElement) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(element);
        Self {
            anchor: self.anchor,
            span: self.span,
            path,
        }
    }

    /// Length of the path; longer paths point at smaller sub-terms.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Render the locator, resolving member names through `names`.
    pub fn display<'a>(&'a self, names: &'a NameTable) -> LocatorDisplay<'a> {
        LocatorDisplay {
            locator: self,
            names,
        }
    }
}

/// Display wrapper for [`Locator`]; member names need the name table.
pub struct LocatorDisplay<'a> {
    locator: &'a Locator,
    names: &'a NameTable,
}

impl fmt::Display for LocatorDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.locator.anchor)?;
        if let Some(span) = self.locator.span {
            write!(f, "{}", span)?;
        }
        for element in &self.locator.path {
            match element {
                PathElement::Argument(i) => write!(f, " -> argument {}", i)?,
                PathElement::Result => write!(f, " -> result")?,
                PathElement::TupleElement(i) => write!(f, " -> element {}", i)?,
                PathElement::GenericArgument(i) => write!(f, " -> generic argument {}", i)?,
                PathElement::Member(name) => write!(f, " -> member '{}'", self.names.resolve(*name))?,
                PathElement::Candidate(decl) => write!(f, " -> candidate {}", decl)?,
                PathElement::Minterm(i) => write!(f, " -> alternative {}", i)?,
            }
        }
        Ok(())
    }
}
