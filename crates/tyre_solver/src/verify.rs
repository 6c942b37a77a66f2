//! Independent check of a solution against the system it solves.
//!
//! The rules here restate the typing relations directly over fully resolved
//! types, without a substitution store or search, so a solver that reports
//! a solution it has not earned is caught by a second opinion.

use crate::constraint::{Constraint, ConstraintKind};
use crate::solution::Solution;
use crate::system::ConstraintSystem;
use rustc_hash::FxHashMap;
use tyre_core::{Name, NodeId};
use tyre_traits::{Candidate, TypeContext};
use tyre_types::{Convention, Type};

/// Check that every constraint of `system` holds under `solution`.
/// Returns the constraints that do not.
pub fn verify(ctx: &dyn TypeContext, system: &ConstraintSystem, solution: &Solution) -> Result<(), Vec<Constraint>> {
    let mut violated: Vec<Constraint> = system
        .constraints()
        .iter()
        .filter(|c| !holds(ctx, c, solution))
        .cloned()
        .collect();
    // A declaration's generic parameter is never a type of its own.
    for (var, ty) in solution.bindings() {
        if ty.has_params() {
            violated.push(Constraint::equality(Type::Var(var), ty.clone()));
        }
    }
    if violated.is_empty() {
        Ok(())
    } else {
        Err(violated)
    }
}

fn holds(ctx: &dyn TypeContext, constraint: &Constraint, solution: &Solution) -> bool {
    let apply = |t: &Type| solution.apply(t);
    match &constraint.kind {
        ConstraintKind::Equality(l, r) => equivalent(&apply(l), &apply(r)),
        ConstraintKind::Subtyping(l, r) | ConstraintKind::ReturnBinding(l, r) => {
            is_subtype(ctx, &apply(l), &apply(r))
        }
        ConstraintKind::Conformance(ty, traits) => {
            let ty = apply(ty);
            traits.iter().all(|t| ctx.conforms(&ty, t))
        }
        ConstraintKind::Conversion(ty, literal) => {
            let ty = apply(ty);
            matches!(ty, Type::Error) || ctx.is_literal_expressible(&ty, *literal)
        }
        ConstraintKind::ValueMember { base, member, ty, site } => {
            let base = apply(base);
            let ty = apply(ty);
            match &base {
                Type::Error => true,
                Type::Tuple(elements) => ctx
                    .names()
                    .resolve(*member)
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| elements.get(i))
                    .is_some_and(|element| equivalent(element, &ty)),
                _ => chosen_instance(ctx, &ctx.members(&base, *member), *site, &ty, solution),
            }
        }
        ConstraintKind::Overload { ty, site, candidates, .. } => {
            chosen_instance(ctx, candidates, *site, &apply(ty), solution)
        }
        ConstraintKind::Size(predicate) => solution.predicates().contains(predicate),
        ConstraintKind::Disjunction(minterms) => minterms
            .iter()
            .any(|m| m.constraints.iter().all(|c| holds(ctx, c, solution))),
    }
}

fn chosen_instance(ctx: &dyn TypeContext, candidates: &[Candidate], site: NodeId, ty: &Type, solution: &Solution) -> bool {
    solution
        .reference(site)
        .and_then(|decl| candidates.iter().find(|c| c.decl == decl))
        .is_some_and(|candidate| is_instance(ctx, candidate, ty))
}

/// Whether `ty` is the signature of `candidate` with its generic parameters
/// replaced by types satisfying their bounds.
fn is_instance(ctx: &dyn TypeContext, candidate: &Candidate, ty: &Type) -> bool {
    let mut assigned = FxHashMap::default();
    if !matches_pattern(&candidate.ty, ty, &mut assigned) {
        return false;
    }
    candidate.generic_params.iter().all(|param| {
        assigned
            .get(&param.name)
            .map_or(true, |arg| param.bounds.iter().all(|&b| ctx.conforms(arg, b)))
    })
}

fn matches_pattern(pattern: &Type, ty: &Type, assigned: &mut FxHashMap<Name, Type>) -> bool {
    match (pattern, ty) {
        (Type::Param(name), _) => match assigned.get(name) {
            Some(existing) => equivalent(existing, ty),
            None => {
                assigned.insert(*name, ty.clone());
                true
            }
        },
        (_, Type::Error) => true,
        (Type::Nominal { name: n, args: a }, Type::Nominal { name: m, args: b }) => {
            n == m && a.len() == b.len() && a.iter().zip(b).all(|(x, y)| matches_pattern(x, y, assigned))
        }
        (Type::Function(f), Type::Function(g)) => {
            f.params.len() == g.params.len()
                && f.params.iter().zip(&g.params).all(|(p, q)| {
                    p.convention == q.convention && matches_pattern(&p.ty, &q.ty, assigned)
                })
                && matches_pattern(&f.ret, &g.ret, assigned)
        }
        (Type::Tuple(a), Type::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| matches_pattern(x, y, assigned))
        }
        _ => pattern == ty,
    }
}

/// Structural equality in which the error type matches anything.
fn equivalent(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::Nominal { name: n, args: x }, Type::Nominal { name: m, args: y }) => {
            n == m && x.len() == y.len() && x.iter().zip(y).all(|(p, q)| equivalent(p, q))
        }
        (Type::Function(f), Type::Function(g)) => {
            f.params.len() == g.params.len()
                && f.params
                    .iter()
                    .zip(&g.params)
                    .all(|(p, q)| p.convention == q.convention && equivalent(&p.ty, &q.ty))
                && equivalent(&f.ret, &g.ret)
        }
        (Type::Tuple(x), Type::Tuple(y)) => x.len() == y.len() && x.iter().zip(y).all(|(p, q)| equivalent(p, q)),
        _ => a == b,
    }
}

fn is_subtype(ctx: &dyn TypeContext, sub: &Type, sup: &Type) -> bool {
    if equivalent(sub, sup) {
        return true;
    }
    match (sub, sup) {
        (_, Type::Existential(traits)) => traits.iter().all(|t| ctx.conforms(sub, t)),
        (Type::Literal(literal), _) => ctx.is_literal_expressible(sup, *literal),
        (Type::Function(f), Type::Function(g)) => {
            f.params.len() == g.params.len()
                && f.params.iter().zip(&g.params).all(|(p, q)| {
                    p.convention == q.convention
                        && match p.convention {
                            Convention::Inout | Convention::Set => equivalent(&p.ty, &q.ty),
                            Convention::Let | Convention::Sink => is_subtype(ctx, &q.ty, &p.ty),
                        }
                })
                && is_subtype(ctx, &f.ret, &g.ret)
        }
        (Type::Tuple(a), Type::Tuple(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_subtype(ctx, x, y)),
        (Type::Nominal { name: n, .. }, Type::Nominal { name: m, .. }) if n != m => {
            ctx.supertypes(sub).iter().any(|s| {
                (s.has_params() && matches_pattern(s, sup, &mut FxHashMap::default())) || is_subtype(ctx, s, sup)
            })
        }
        _ => false,
    }
}
