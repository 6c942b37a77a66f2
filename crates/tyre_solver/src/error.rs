//! Solver failures and their rendering.

use thiserror::Error;
use tyre_core::{DeclId, Locator, Name, NameTable};
use tyre_diagnostics::{messages, Diagnostic};
use tyre_types::{LiteralKind, Type, TypeVar};

/// Which relation a [`SolveError::TypeMismatch`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    Subtype,
    Return,
}

/// Why a search stopped without an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The step bound was exhausted.
    StepLimit(u64),
    /// Every remaining alternative exceeded the penalty bound.
    PenaltyLimit(u32),
    /// Nothing is left to try, but these variables are still unknown.
    Incomplete(Vec<TypeVar>),
}

/// A candidate that was tried and failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCandidate {
    pub decl: DeclId,
    pub ty: Type,
    pub reason: Box<SolveError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("type mismatch ({relation:?}): {left:?} vs {right:?}")]
    TypeMismatch {
        relation: Relation,
        left: Type,
        right: Type,
        locator: Option<Locator>,
    },

    #[error("occurs check failed: {var} occurs in {ty:?}")]
    OccursCheckFailure {
        var: TypeVar,
        ty: Type,
        locator: Option<Locator>,
    },

    #[error("{ty:?} does not conform to {trait_name:?}")]
    ConformanceFailure {
        ty: Type,
        trait_name: Name,
        locator: Option<Locator>,
    },

    #[error("{ty:?} is not expressible by a {literal:?} literal")]
    ConversionFailure {
        ty: Type,
        literal: LiteralKind,
        locator: Option<Locator>,
    },

    #[error("{base:?} has no member {member:?}")]
    MissingMember {
        base: Type,
        member: Name,
        locator: Option<Locator>,
    },

    #[error("no viable overload among {} candidates", .rejected.len())]
    NoViableOverload {
        name: Name,
        rejected: Vec<RejectedCandidate>,
        locator: Option<Locator>,
    },

    #[error("ambiguous: {} candidates tie", .candidates.len())]
    AmbiguousOverload {
        /// `None` when the tied solutions differ only in their bindings.
        name: Option<Name>,
        candidates: Vec<(DeclId, Type)>,
        locator: Option<Locator>,
    },

    #[error("search aborted: {reason:?}")]
    SearchAborted {
        reason: AbortReason,
        locator: Option<Locator>,
    },

    #[error("malformed constraint: {description}")]
    Malformed {
        description: String,
        locator: Option<Locator>,
    },
}

/// Fieldless classification of [`SolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TypeMismatch,
    OccursCheckFailure,
    ConformanceFailure,
    ConversionFailure,
    MissingMember,
    NoViableOverload,
    AmbiguousOverload,
    SearchAborted,
    Malformed,
}

impl SolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            SolveError::OccursCheckFailure { .. } => ErrorKind::OccursCheckFailure,
            SolveError::ConformanceFailure { .. } => ErrorKind::ConformanceFailure,
            SolveError::ConversionFailure { .. } => ErrorKind::ConversionFailure,
            SolveError::MissingMember { .. } => ErrorKind::MissingMember,
            SolveError::NoViableOverload { .. } => ErrorKind::NoViableOverload,
            SolveError::AmbiguousOverload { .. } => ErrorKind::AmbiguousOverload,
            SolveError::SearchAborted { .. } => ErrorKind::SearchAborted,
            SolveError::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    pub fn locator(&self) -> Option<&Locator> {
        match self {
            SolveError::TypeMismatch { locator, .. }
            | SolveError::OccursCheckFailure { locator, .. }
            | SolveError::ConformanceFailure { locator, .. }
            | SolveError::ConversionFailure { locator, .. }
            | SolveError::MissingMember { locator, .. }
            | SolveError::NoViableOverload { locator, .. }
            | SolveError::AmbiguousOverload { locator, .. }
            | SolveError::SearchAborted { locator, .. }
            | SolveError::Malformed { locator, .. } => locator.as_ref(),
        }
    }

    /// Render through the diagnostic message catalogue.
    pub fn to_diagnostic(&self, names: &NameTable) -> Diagnostic {
        let ty = |t: &Type| t.to_string_with(names);
        let at = self.locator();
        match self {
            SolveError::TypeMismatch {
                relation,
                left,
                right,
                ..
            } => {
                let message = match relation {
                    Relation::Equal => &messages::TYPE_0_IS_NOT_COMPATIBLE_WITH_TYPE_1,
                    Relation::Subtype => &messages::TYPE_0_IS_NOT_A_SUBTYPE_OF_1,
                    Relation::Return => &messages::CANNOT_RETURN_VALUE_OF_TYPE_0_FROM_FUNCTION_RETURNING_1,
                };
                Diagnostic::at(at, message, &[ty(left).as_str(), ty(right).as_str()])
            }
            SolveError::OccursCheckFailure { var, ty: t, .. } => Diagnostic::at(
                at,
                &messages::INFINITE_TYPE_0_OCCURS_IN_1,
                &[var.to_string().as_str(), ty(t).as_str()],
            ),
            SolveError::ConformanceFailure { ty: t, trait_name, .. } => Diagnostic::at(
                at,
                &messages::TYPE_0_DOES_NOT_CONFORM_TO_TRAIT_1,
                &[ty(t).as_str(), names.resolve(*trait_name)],
            ),
            SolveError::ConversionFailure { ty: t, literal, .. } => Diagnostic::at(
                at,
                &messages::TYPE_0_IS_NOT_EXPRESSIBLE_BY_1_LITERAL,
                &[ty(t).as_str(), literal.keyword()],
            ),
            SolveError::MissingMember { base, member, .. } => Diagnostic::at(
                at,
                &messages::TYPE_0_HAS_NO_MEMBER_1,
                &[ty(base).as_str(), names.resolve(*member)],
            ),
            SolveError::NoViableOverload { name, rejected, .. } => {
                let mut diag = Diagnostic::at(
                    at,
                    &messages::NO_VIABLE_CANDIDATE_FOR_0_AMONG_1_DECLARATIONS,
                    &[names.resolve(*name), rejected.len().to_string().as_str()],
                );
                for candidate in rejected {
                    let reason = candidate.reason.to_diagnostic(names);
                    diag = diag.with_related(Diagnostic::at(
                        candidate.reason.locator(),
                        &messages::CANDIDATE_0_OF_TYPE_1_REJECTED_2,
                        &[candidate.decl.to_string().as_str(), ty(&candidate.ty).as_str(), reason.message_text.as_str()],
                    ));
                }
                diag
            }
            SolveError::AmbiguousOverload { name, candidates, .. } => {
                let mut diag = match name {
                    Some(name) => Diagnostic::at(at, &messages::AMBIGUOUS_USE_OF_0, &[names.resolve(*name)]),
                    None => Diagnostic::at(at, &messages::AMBIGUOUS_TYPE_INFERENCE, &[]),
                };
                for (decl, t) in candidates {
                    diag = diag.with_related(Diagnostic::at(
                        at,
                        &messages::FOUND_CANDIDATE_0_OF_TYPE_1,
                        &[decl.to_string().as_str(), ty(t).as_str()],
                    ));
                }
                diag
            }
            SolveError::SearchAborted { reason, .. } => match reason {
                AbortReason::StepLimit(steps) => Diagnostic::at(
                    at,
                    &messages::TYPE_CHECKING_ABORTED_AFTER_0_STEPS,
                    &[steps.to_string().as_str()],
                ),
                AbortReason::PenaltyLimit(bound) => Diagnostic::at(
                    at,
                    &messages::NO_SOLUTION_WITHIN_PENALTY_BOUND_0,
                    &[bound.to_string().as_str()],
                ),
                AbortReason::Incomplete(vars) => {
                    let list = vars.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                    Diagnostic::at(at, &messages::COULD_NOT_INFER_TYPES_OF_0, &[list.as_str()])
                }
            },
            SolveError::Malformed { description, .. } => {
                Diagnostic::at(at, &messages::MALFORMED_CONSTRAINT_0, &[description.as_str()])
            }
        }
    }
}

/// The result of a failed solve: the errors to report and the bindings that
/// were certain before the search had to guess.
#[derive(Debug, Clone, Error)]
#[error("type checking failed with {} error(s)", .errors.len())]
pub struct SolveFailure {
    pub errors: Vec<SolveError>,
    /// Indexed by free variable; unbound variables map to themselves.
    pub partial: Vec<Type>,
}

impl SolveFailure {
    pub fn diagnostics(&self, names: &NameTable) -> Vec<Diagnostic> {
        self.errors.iter().map(|e| e.to_diagnostic(names)).collect()
    }

    /// The partial binding of `var`, if it was resolved to a non-variable.
    pub fn partial_binding(&self, var: TypeVar) -> Option<&Type> {
        self.partial.get(var.index()).filter(|t| !t.is_var())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyre_core::NodeId;

    #[test]
    fn test_mismatch_diagnostic_uses_relation() {
        let names = NameTable::new();
        let int = Type::nominal(names.intern("Int"));
        let string = Type::nominal(names.intern("String"));
        let err = SolveError::TypeMismatch {
            relation: Relation::Return,
            left: string,
            right: int,
            locator: Some(Locator::new(NodeId(3))),
        };
        let diag = err.to_diagnostic(&names);
        assert_eq!(diag.code, 2003);
        assert!(diag.message_text.contains("'String'"));
        assert_eq!(diag.locator.map(|l| l.anchor), Some(NodeId(3)));
    }

    #[test]
    fn test_no_viable_overload_lists_rejections() {
        let names = NameTable::new();
        let int = Type::nominal(names.intern("Int"));
        let double = Type::nominal(names.intern("Double"));
        let err = SolveError::NoViableOverload {
            name: names.intern("f"),
            rejected: vec![RejectedCandidate {
                decl: DeclId(4),
                ty: Type::function(vec![double.clone()], double.clone()),
                reason: Box::new(SolveError::TypeMismatch {
                    relation: Relation::Equal,
                    left: int,
                    right: double,
                    locator: None,
                }),
            }],
            locator: None,
        };
        let diag = err.to_diagnostic(&names);
        assert_eq!(diag.code, 2010);
        assert_eq!(diag.related_information.len(), 1);
        let note = &diag.related_information[0].message_text;
        assert!(note.contains("decl#4"));
        assert!(note.contains("(Double) -> Double"));
        assert!(note.contains("Type 'Int' is not compatible with type 'Double'."));
    }

    #[test]
    fn test_incomplete_lists_variables() {
        let names = NameTable::new();
        let err = SolveError::SearchAborted {
            reason: AbortReason::Incomplete(vec![TypeVar(0), TypeVar(2)]),
            locator: None,
        };
        assert_eq!(err.kind(), ErrorKind::SearchAborted);
        assert!(err.to_diagnostic(&names).message_text.contains("?0, ?2"));
    }
}
