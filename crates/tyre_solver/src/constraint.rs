//! The constraint model.
//!
//! A constraint is a closed sum of typing relations. Every match over
//! [`ConstraintKind`] in the solver is exhaustive, so adding a kind means
//! visiting every rule that has to know about it.

use tyre_core::{Locator, Name, NodeId};
use tyre_traits::Candidate;
use tyre_types::{LiteralKind, TraitSet, Type};

/// An opaque value-level predicate. The solver does not interpret it; it is
/// handed to the solution's consumers untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SizePredicate {
    pub id: u32,
    pub description: String,
}

/// One alternative of a disjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minterm {
    pub constraints: Vec<Constraint>,
    /// Higher is less preferred.
    pub penalty: u32,
}

impl Minterm {
    pub fn new(constraints: Vec<Constraint>, penalty: u32) -> Self {
        Self { constraints, penalty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `L == R`.
    Equality(Type, Type),
    /// `L <: R`.
    Subtyping(Type, Type),
    /// `L` satisfies every trait in the set.
    Conformance(Type, TraitSet),
    /// A literal of the given kind can be used as an `L`.
    Conversion(Type, LiteralKind),
    /// `L <: R` where `R` is the declared result of the enclosing function.
    ReturnBinding(Type, Type),
    /// `base` has a member `member` of type `ty`; `site` is the member
    /// expression, which records the chosen declaration.
    ValueMember {
        base: Type,
        member: Name,
        ty: Type,
        site: NodeId,
    },
    /// The name expression at `site` has type `ty` and refers to exactly one
    /// of `candidates`.
    Overload {
        ty: Type,
        name: Name,
        site: NodeId,
        candidates: Vec<Candidate>,
    },
    Size(SizePredicate),
    Disjunction(Vec<Minterm>),
}

/// Processing order of constraint kinds. Cheap, decisive kinds come first;
/// branch points come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Equality,
    Subtyping,
    Conversion,
    Conformance,
    Member,
    Size,
    Overload,
    Disjunction,
}

impl ConstraintKind {
    pub fn precedence(&self) -> Precedence {
        match self {
            ConstraintKind::Equality(..) => Precedence::Equality,
            ConstraintKind::Subtyping(..) | ConstraintKind::ReturnBinding(..) => Precedence::Subtyping,
            ConstraintKind::Conversion(..) => Precedence::Conversion,
            ConstraintKind::Conformance(..) => Precedence::Conformance,
            ConstraintKind::ValueMember { .. } => Precedence::Member,
            ConstraintKind::Size(_) => Precedence::Size,
            ConstraintKind::Overload { .. } => Precedence::Overload,
            ConstraintKind::Disjunction(_) => Precedence::Disjunction,
        }
    }

    /// Whether the search engine branches on this constraint instead of
    /// simplifying it.
    pub fn is_branch_point(&self) -> bool {
        matches!(self, ConstraintKind::Overload { .. } | ConstraintKind::Disjunction(_))
    }

    /// Number of alternatives of a branch point; zero for other kinds.
    pub fn alternative_count(&self) -> usize {
        match self {
            ConstraintKind::Overload { candidates, .. } => candidates.len(),
            ConstraintKind::Disjunction(minterms) => minterms.len(),
            _ => 0,
        }
    }
}

/// A constraint with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub locator: Option<Locator>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind) -> Self {
        Self { kind, locator: None }
    }

    pub fn at(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn equality(left: Type, right: Type) -> Self {
        Self::new(ConstraintKind::Equality(left, right))
    }

    pub fn subtyping(sub: Type, sup: Type) -> Self {
        Self::new(ConstraintKind::Subtyping(sub, sup))
    }

    pub fn conformance(ty: Type, traits: impl IntoIterator<Item = Name>) -> Self {
        Self::new(ConstraintKind::Conformance(ty, TraitSet::new(traits)))
    }

    pub fn conversion(ty: Type, literal: LiteralKind) -> Self {
        Self::new(ConstraintKind::Conversion(ty, literal))
    }

    pub fn return_binding(value: Type, declared: Type) -> Self {
        Self::new(ConstraintKind::ReturnBinding(value, declared))
    }

    pub fn value_member(base: Type, member: Name, ty: Type, site: NodeId) -> Self {
        Self::new(ConstraintKind::ValueMember { base, member, ty, site })
    }

    pub fn overload(ty: Type, name: Name, site: NodeId, candidates: Vec<Candidate>) -> Self {
        Self::new(ConstraintKind::Overload {
            ty,
            name,
            site,
            candidates,
        })
    }

    pub fn size(predicate: SizePredicate) -> Self {
        Self::new(ConstraintKind::Size(predicate))
    }

    pub fn disjunction(minterms: Vec<Minterm>) -> Self {
        Self::new(ConstraintKind::Disjunction(minterms))
    }

    /// Visit every type operand, including those nested in minterms and
    /// candidate signatures.
    pub fn for_each_type(&self, f: &mut impl FnMut(&Type)) {
        match &self.kind {
            ConstraintKind::Equality(l, r)
            | ConstraintKind::Subtyping(l, r)
            | ConstraintKind::ReturnBinding(l, r) => {
                f(l);
                f(r);
            }
            ConstraintKind::Conformance(ty, _) | ConstraintKind::Conversion(ty, _) => f(ty),
            ConstraintKind::ValueMember { base, ty, .. } => {
                f(base);
                f(ty);
            }
            ConstraintKind::Overload { ty, candidates, .. } => {
                f(ty);
                for candidate in candidates {
                    f(&candidate.ty);
                }
            }
            ConstraintKind::Size(_) => {}
            ConstraintKind::Disjunction(minterms) => {
                for minterm in minterms {
                    for c in &minterm.constraints {
                        c.for_each_type(f);
                    }
                }
            }
        }
    }

    /// Rebuild the constraint with every operand passed through `f`.
    /// Candidate signatures are declarations, not operands, and are kept.
    pub fn map_types(&self, f: &mut impl FnMut(&Type) -> Type) -> Constraint {
        let kind = match &self.kind {
            ConstraintKind::Equality(l, r) => ConstraintKind::Equality(f(l), f(r)),
            ConstraintKind::Subtyping(l, r) => ConstraintKind::Subtyping(f(l), f(r)),
            ConstraintKind::ReturnBinding(l, r) => ConstraintKind::ReturnBinding(f(l), f(r)),
            ConstraintKind::Conformance(ty, traits) => ConstraintKind::Conformance(f(ty), traits.clone()),
            ConstraintKind::Conversion(ty, literal) => ConstraintKind::Conversion(f(ty), *literal),
            ConstraintKind::ValueMember { base, member, ty, site } => ConstraintKind::ValueMember {
                base: f(base),
                member: *member,
                ty: f(ty),
                site: *site,
            },
            ConstraintKind::Overload { ty, name, site, candidates } => ConstraintKind::Overload {
                ty: f(ty),
                name: *name,
                site: *site,
                candidates: candidates.clone(),
            },
            ConstraintKind::Size(predicate) => ConstraintKind::Size(predicate.clone()),
            ConstraintKind::Disjunction(minterms) => ConstraintKind::Disjunction(
                minterms
                    .iter()
                    .map(|m| Minterm {
                        constraints: m.constraints.iter().map(|c| c.map_types(&mut *f)).collect(),
                        penalty: m.penalty,
                    })
                    .collect(),
            ),
        };
        Constraint {
            kind,
            locator: self.locator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyre_core::{DeclId, NameTable};
    use tyre_types::TypeVar;

    #[test]
    fn test_precedence_order() {
        assert!(Precedence::Equality < Precedence::Subtyping);
        assert!(Precedence::Member < Precedence::Size);
        assert!(Precedence::Overload < Precedence::Disjunction);
        let names = NameTable::new();
        let c = Constraint::return_binding(Type::Var(TypeVar(0)), Type::nominal(names.intern("Int")));
        assert_eq!(c.kind.precedence(), Precedence::Subtyping);
    }

    #[test]
    fn test_branch_points() {
        let names = NameTable::new();
        let f = names.intern("f");
        let overload = Constraint::overload(
            Type::Var(TypeVar(0)),
            f,
            NodeId(1),
            vec![Candidate::new(DeclId(0), Type::unit())],
        );
        assert!(overload.kind.is_branch_point());
        assert_eq!(overload.kind.alternative_count(), 1);
        assert!(!Constraint::equality(Type::unit(), Type::unit()).kind.is_branch_point());
    }

    #[test]
    fn test_map_types_reaches_minterms() {
        let inner = Constraint::equality(Type::Var(TypeVar(0)), Type::unit());
        let d = Constraint::disjunction(vec![
            Minterm::new(vec![inner.clone()], 0),
            Minterm::new(vec![inner], 1),
        ]);
        let mapped = d.map_types(&mut |t| if t.is_var() { Type::Error } else { t.clone() });
        let mut seen = Vec::new();
        mapped.for_each_type(&mut |t| seen.push(t.clone()));
        assert_eq!(seen, vec![Type::Error, Type::unit(), Type::Error, Type::unit()]);
    }
}
