//! Simplification rules: one step per constraint kind.

use crate::constraint::{Constraint, ConstraintKind};
use crate::error::{Relation, SolveError};
use crate::solver::{Solver, WorkSet};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::trace;
use tyre_core::{Locator, Name, NodeId, PathElement};
use tyre_types::{Convention, LiteralKind, TraitSet, Type, TypeVar, UnifyError};

/// What simplifying one constraint did.
pub(crate) enum Step {
    /// Discharged; any bindings it implied are in the substitution.
    Solved,
    /// Replaced by these smaller constraints.
    Expand(Vec<Constraint>),
    /// Nothing to do until one of these variables is bound.
    Defer(Vec<TypeVar>),
    Fail(SolveError),
}

pub(crate) fn unify_failure(error: UnifyError, relation: Relation, locator: Option<Locator>) -> SolveError {
    match error {
        UnifyError::Mismatch { left, right } => SolveError::TypeMismatch {
            relation,
            left,
            right,
            locator,
        },
        UnifyError::Occurs { var, ty } => SolveError::OccursCheckFailure { var, ty, locator },
    }
}

fn appended(locator: &Option<Locator>, element: PathElement) -> Option<Locator> {
    locator.as_ref().map(|l| l.appending(element))
}

fn related(relation: Relation, sub: Type, sup: Type) -> ConstraintKind {
    match relation {
        Relation::Return => ConstraintKind::ReturnBinding(sub, sup),
        _ => ConstraintKind::Subtyping(sub, sup),
    }
}

fn watch(types: &[&Type]) -> Vec<TypeVar> {
    types.iter().filter_map(|t| t.as_var()).collect()
}

impl Solver<'_> {
    pub(crate) fn simplify(&mut self, constraint: &Constraint, work: &mut WorkSet) -> Step {
        let locator = &constraint.locator;
        match &constraint.kind {
            ConstraintKind::Equality(l, r) => match self.subst.unify(l, r) {
                Ok(()) => Step::Solved,
                Err(error) => Step::Fail(unify_failure(error, Relation::Equal, locator.clone())),
            },
            ConstraintKind::Subtyping(l, r) => self.simplify_subtyping(l, r, Relation::Subtype, locator),
            ConstraintKind::ReturnBinding(l, r) => self.simplify_subtyping(l, r, Relation::Return, locator),
            ConstraintKind::Conformance(ty, traits) => self.simplify_conformance(ty, traits, locator),
            ConstraintKind::Conversion(ty, literal) => self.simplify_conversion(ty, *literal, locator, work),
            ConstraintKind::ValueMember { base, member, ty, site } => {
                self.simplify_member(base, *member, ty, *site, locator, work)
            }
            ConstraintKind::Size(predicate) => {
                work.predicates.push(predicate.clone());
                Step::Solved
            }
            ConstraintKind::Overload { .. } | ConstraintKind::Disjunction(_) => Step::Fail(SolveError::Malformed {
                description: "branch point reached simplification".to_string(),
                locator: locator.clone(),
            }),
        }
    }

    fn simplify_subtyping(&mut self, sub: &Type, sup: &Type, relation: Relation, locator: &Option<Locator>) -> Step {
        let l = self.subst.shallow(sub);
        let r = self.subst.shallow(sup);
        if l == r {
            return Step::Solved;
        }
        match (&l, &r) {
            (Type::Error, _) | (_, Type::Error) => Step::Solved,
            (Type::Var(_), _) | (_, Type::Var(_)) => Step::Defer(watch(&[&l, &r])),
            (_, Type::Existential(traits)) => Step::Expand(vec![Constraint {
                kind: ConstraintKind::Conformance(l.clone(), traits.clone()),
                locator: locator.clone(),
            }]),
            (Type::Literal(literal), _) => Step::Expand(vec![Constraint {
                kind: ConstraintKind::Conversion(r.clone(), *literal),
                locator: locator.clone(),
            }]),
            (Type::Function(f), Type::Function(g))
                if f.params.len() == g.params.len()
                    && f.params.iter().zip(&g.params).all(|(p, q)| p.convention == q.convention) =>
            {
                let mut children = Vec::with_capacity(f.params.len() + 1);
                for (i, (p, q)) in f.params.iter().zip(&g.params).enumerate() {
                    let kind = match p.convention {
                        Convention::Inout | Convention::Set => ConstraintKind::Equality(p.ty.clone(), q.ty.clone()),
                        Convention::Let | Convention::Sink => ConstraintKind::Subtyping(q.ty.clone(), p.ty.clone()),
                    };
                    children.push(Constraint {
                        kind,
                        locator: appended(locator, PathElement::Argument(i as u32)),
                    });
                }
                children.push(Constraint {
                    kind: related(relation, (*f.ret).clone(), (*g.ret).clone()),
                    locator: appended(locator, PathElement::Result),
                });
                Step::Expand(children)
            }
            (Type::Tuple(a), Type::Tuple(b)) if a.len() == b.len() => Step::Expand(
                a.iter()
                    .zip(b)
                    .enumerate()
                    .map(|(i, (x, y))| Constraint {
                        kind: related(relation, x.clone(), y.clone()),
                        locator: appended(locator, PathElement::TupleElement(i as u32)),
                    })
                    .collect(),
            ),
            (Type::Nominal { name: n, args: a }, Type::Nominal { name: m, args: b }) if n == m && a.len() == b.len() => {
                Step::Expand(
                    a.iter()
                        .zip(b)
                        .enumerate()
                        .map(|(i, (x, y))| Constraint {
                            kind: ConstraintKind::Equality(x.clone(), y.clone()),
                            locator: appended(locator, PathElement::GenericArgument(i as u32)),
                        })
                        .collect(),
                )
            }
            (Type::Nominal { .. }, Type::Nominal { name: target, .. }) => match self.find_supertype(&l, *target) {
                Some(sup) => {
                    trace!("subtyping through declared supertype");
                    let sup = self.open_params(&sup, &mut FxHashMap::default());
                    Step::Expand(vec![Constraint {
                        kind: ConstraintKind::Equality(sup, r.clone()),
                        locator: locator.clone(),
                    }])
                }
                None => Step::Fail(self.mismatch(relation, &l, &r, locator)),
            },
            _ => Step::Fail(self.mismatch(relation, &l, &r, locator)),
        }
    }

    fn mismatch(&self, relation: Relation, l: &Type, r: &Type, locator: &Option<Locator>) -> SolveError {
        SolveError::TypeMismatch {
            relation,
            left: self.subst.apply(l),
            right: self.subst.apply(r),
            locator: locator.clone(),
        }
    }

    /// Breadth-first search of the declared supertypes of `ty` for one named
    /// `target`.
    fn find_supertype(&self, ty: &Type, target: Name) -> Option<Type> {
        let mut queue: VecDeque<Type> = self.ctx.supertypes(&self.subst.apply(ty)).into();
        let mut seen: Vec<Type> = Vec::new();
        while let Some(candidate) = queue.pop_front() {
            if matches!(&candidate, Type::Nominal { name, .. } if *name == target) {
                return Some(candidate);
            }
            if seen.contains(&candidate) {
                continue;
            }
            queue.extend(self.ctx.supertypes(&candidate));
            seen.push(candidate);
        }
        None
    }

    fn simplify_conformance(&mut self, ty: &Type, traits: &TraitSet, locator: &Option<Locator>) -> Step {
        let ty = self.subst.shallow(ty);
        match ty {
            Type::Var(v) => Step::Defer(vec![v]),
            Type::Error => Step::Solved,
            _ => {
                let applied = self.subst.apply(&ty);
                match traits.iter().find(|&t| !self.ctx.conforms(&applied, t)) {
                    Some(trait_name) => Step::Fail(SolveError::ConformanceFailure {
                        ty: applied,
                        trait_name,
                        locator: locator.clone(),
                    }),
                    None => Step::Solved,
                }
            }
        }
    }

    fn simplify_conversion(
        &mut self,
        ty: &Type,
        literal: LiteralKind,
        locator: &Option<Locator>,
        work: &mut WorkSet,
    ) -> Step {
        let ty = self.subst.shallow(ty);
        match ty {
            Type::Var(v) => Step::Defer(vec![v]),
            Type::Error => Step::Solved,
            Type::Literal(kind) if kind == literal => Step::Solved,
            _ => {
                let applied = self.subst.apply(&ty);
                if self.ctx.is_literal_expressible(&applied, literal) {
                    work.conversions += 1;
                    Step::Solved
                } else {
                    Step::Fail(SolveError::ConversionFailure {
                        ty: applied,
                        literal,
                        locator: locator.clone(),
                    })
                }
            }
        }
    }

    fn simplify_member(
        &mut self,
        base: &Type,
        member: Name,
        ty: &Type,
        site: NodeId,
        locator: &Option<Locator>,
        work: &mut WorkSet,
    ) -> Step {
        let receiver = self.subst.shallow(base);
        let member_locator = appended(locator, PathElement::Member(member));
        match &receiver {
            Type::Var(v) => Step::Defer(vec![*v]),
            Type::Error => Step::Expand(vec![Constraint {
                kind: ConstraintKind::Equality(ty.clone(), Type::Error),
                locator: member_locator,
            }]),
            Type::Tuple(elements) => {
                let element = self
                    .ctx
                    .names()
                    .resolve(member)
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| elements.get(i));
                match element {
                    Some(element) => Step::Expand(vec![Constraint {
                        kind: ConstraintKind::Equality(element.clone(), ty.clone()),
                        locator: member_locator,
                    }]),
                    None => Step::Fail(SolveError::MissingMember {
                        base: self.subst.apply(&receiver),
                        member,
                        locator: locator.clone(),
                    }),
                }
            }
            _ => {
                let receiver = self.subst.apply(&receiver);
                let mut candidates = self.ctx.members(&receiver, member);
                trace!(candidates = candidates.len(), "member lookup");
                match candidates.len() {
                    0 => Step::Fail(SolveError::MissingMember {
                        base: receiver,
                        member,
                        locator: locator.clone(),
                    }),
                    1 => {
                        let candidate = candidates.remove(0);
                        if candidate.is_generic() {
                            work.generic_choices += 1;
                        }
                        self.open_candidate(work, ty, member, site, &candidate, member_locator);
                        Step::Solved
                    }
                    _ => Step::Expand(vec![Constraint {
                        kind: ConstraintKind::Overload {
                            ty: ty.clone(),
                            name: member,
                            site,
                            candidates,
                        },
                        locator: member_locator,
                    }]),
                }
            }
        }
    }
}
