//! tyre_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Defines the message catalogue for type-checking failures and the
//! `Diagnostic` values the solver produces. Diagnostics carry the provenance
//! locator of the constraint that failed; turning a locator into a file and
//! line is left to the rendering collaborator.

use tyre_core::locator::Locator;
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Suggestion => write!(f, "suggestion"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 2001).
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with provenance and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Where the diagnosed constraint came from, if known.
    pub locator: Option<Locator>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
    /// Notes attached to this diagnostic (rejected or tied candidates).
    pub related_information: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create a new diagnostic without provenance.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            locator: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Create a new diagnostic anchored at `locator` when one is available.
    pub fn at(locator: Option<&Locator>, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            locator: locator.cloned(),
            ..Self::new(message, args)
        }
    }

    pub fn with_related(mut self, related: Diagnostic) -> Self {
        self.related_information.push(related);
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    pub fn is_warning(&self) -> bool {
        self.category == DiagnosticCategory::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref locator) = self.locator {
            write!(f, "{}", locator.anchor)?;
            if let Some(span) = locator.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} E{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated while checking a unit.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn extend_from_slice(&mut self, diagnostics: &[Diagnostic]) {
        self.diagnostics.extend_from_slice(diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by anchor node; unanchored diagnostics come first.
    /// The sort is stable, so diagnostics on the same node keep their order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let a_key = a.locator.as_ref().map(|l| (l.anchor, l.span.map(|s| s.start)));
            let b_key = b.locator.as_ref().map(|l| (l.anchor, l.span.map(|s| s.start)));
            a_key.cmp(&b_key)
        });
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::{DiagnosticCategory, DiagnosticMessage};

    macro_rules! diag {
        ($name:ident, $code:expr, $cat:ident, $msg:expr) => {
            pub const $name: DiagnosticMessage = DiagnosticMessage {
                code: $code,
                category: DiagnosticCategory::$cat,
                message: $msg,
            };
        };
    }

    // Relation failures
    diag!(TYPE_0_IS_NOT_COMPATIBLE_WITH_TYPE_1, 2001, Error, "Type '{0}' is not compatible with type '{1}'.");
    diag!(TYPE_0_IS_NOT_A_SUBTYPE_OF_1, 2002, Error, "Type '{0}' is not a subtype of '{1}'.");
    diag!(CANNOT_RETURN_VALUE_OF_TYPE_0_FROM_FUNCTION_RETURNING_1, 2003, Error, "Cannot return a value of type '{0}' from a function whose return type is '{1}'.");
    diag!(INFINITE_TYPE_0_OCCURS_IN_1, 2004, Error, "Infinite type: '{0}' occurs in '{1}'.");
    diag!(TYPE_0_DOES_NOT_CONFORM_TO_TRAIT_1, 2005, Error, "Type '{0}' does not conform to trait '{1}'.");
    diag!(TYPE_0_IS_NOT_EXPRESSIBLE_BY_1_LITERAL, 2006, Error, "Type '{0}' is not expressible by {1} literal.");
    diag!(TYPE_0_HAS_NO_MEMBER_1, 2007, Error, "Type '{0}' has no member '{1}'.");

    // Overload resolution
    diag!(NO_VIABLE_CANDIDATE_FOR_0_AMONG_1_DECLARATIONS, 2010, Error, "No viable candidate for '{0}' among {1} declarations.");
    diag!(CANDIDATE_0_OF_TYPE_1_REJECTED_2, 2011, Message, "Candidate {0} of type '{1}' rejected: {2}");
    diag!(AMBIGUOUS_USE_OF_0, 2012, Error, "Ambiguous use of '{0}'.");
    diag!(FOUND_CANDIDATE_0_OF_TYPE_1, 2013, Message, "Found candidate {0} of type '{1}'.");
    diag!(AMBIGUOUS_TYPE_INFERENCE, 2014, Error, "Type inference is ambiguous: more than one solution with equal rank.");

    // Search limits
    diag!(TYPE_CHECKING_ABORTED_AFTER_0_STEPS, 2020, Error, "Type checking aborted after {0} steps; the expression is too complex.");
    diag!(NO_SOLUTION_WITHIN_PENALTY_BOUND_0, 2021, Error, "No solution found within the penalty bound {0}.");
    diag!(COULD_NOT_INFER_TYPES_OF_0, 2022, Error, "Could not infer the types of {0}.");
    diag!(MALFORMED_CONSTRAINT_0, 2023, Error, "Malformed constraint: {0}");

    // Warnings
    diag!(LITERAL_DEFAULTED_TO_TYPE_0, 2100, Warning, "Literal type inferred as default '{0}'.");
}
