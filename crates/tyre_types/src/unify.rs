//! Structural unification.

use crate::subst::Substitution;
use crate::ty::{Type, TypeVar};
use thiserror::Error;

/// Errors that can occur during unification.
///
/// The types are reported fully resolved. Rendering them needs the name
/// table, so the `Display` impl only gives the debug form; diagnostics are
/// built by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnifyError {
    /// The innermost pair of types whose shapes differ.
    #[error("cannot unify {left:?} with {right:?}")]
    Mismatch { left: Type, right: Type },

    /// Binding `var` to `ty` would create an infinite type.
    #[error("occurs check failed: {var} occurs in {ty:?}")]
    Occurs { var: TypeVar, ty: Type },
}

impl Substitution {
    /// Make `a` and `b` equal, binding variables as needed.
    ///
    /// On failure the store may hold bindings made before the conflicting
    /// component was reached; callers that need atomicity take a snapshot.
    pub fn unify(&mut self, a: &Type, b: &Type) -> Result<(), UnifyError> {
        let a = self.shallow(a);
        let b = self.shallow(b);
        if a == b {
            return Ok(());
        }
        match (&a, &b) {
            (Type::Error, _) | (_, Type::Error) => Ok(()),
            (Type::Var(v), other) | (other, Type::Var(v)) => self.bind(*v, other.clone()),
            (
                Type::Nominal { name: n1, args: a1 },
                Type::Nominal { name: n2, args: a2 },
            ) if n1 == n2 && a1.len() == a2.len() => {
                for (x, y) in a1.iter().zip(a2) {
                    self.unify(x, y)?;
                }
                Ok(())
            }
            (Type::Function(f1), Type::Function(f2))
                if f1.params.len() == f2.params.len()
                    && f1
                        .params
                        .iter()
                        .zip(&f2.params)
                        .all(|(p, q)| p.convention == q.convention) =>
            {
                for (p, q) in f1.params.iter().zip(&f2.params) {
                    self.unify(&p.ty, &q.ty)?;
                }
                self.unify(&f1.ret, &f2.ret)
            }
            (Type::Tuple(e1), Type::Tuple(e2)) if e1.len() == e2.len() => {
                for (x, y) in e1.iter().zip(e2) {
                    self.unify(x, y)?;
                }
                Ok(())
            }
            _ => Err(UnifyError::Mismatch {
                left: self.apply(&a),
                right: self.apply(&b),
            }),
        }
    }
}
