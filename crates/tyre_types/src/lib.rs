//! tyre_types: The type model and the substitution store.
//!
//! Types are immutable values compared structurally; type variables are
//! arena indices compared by identity. The `Substitution` binds variables
//! with union-find semantics and supports cheap snapshot/restore so the
//! solver can backtrack without copying the store.

mod display;
mod subst;
mod ty;
mod unify;

pub use display::TypeDisplay;
pub use subst::{Snapshot, Substitution};
pub use ty::{Convention, FunctionType, LiteralKind, Parameter, TraitSet, Type, TypeVar};
pub use unify::UnifyError;
