//! tyre_solver: Constraint solving for type inference.
//!
//! A [`ConstraintSystem`] holds the typing constraints of one unit. The
//! [`Solver`] finds the single best assignment of types to its free
//! variables and of declarations to its overloaded references, or reports
//! why none exists.
//!
//! ```text
//!   ConstraintSystem ──▶ Solver::solve ──▶ Solution
//!                                     └──▶ SolveFailure ──▶ Diagnostic
//! ```

mod constraint;
mod error;
mod simplify;
mod solution;
mod solver;
mod system;
mod verify;

pub use constraint::{Constraint, ConstraintKind, Minterm, Precedence, SizePredicate};
pub use error::{AbortReason, ErrorKind, RejectedCandidate, Relation, SolveError, SolveFailure};
pub use solution::Solution;
pub use solver::Solver;
pub use system::ConstraintSystem;
pub use verify::verify;

use tyre_options::SolverOptions;
use tyre_traits::TypeContext;

/// Solve `system` against `ctx` with the given options.
pub fn solve(ctx: &dyn TypeContext, options: &SolverOptions, system: &ConstraintSystem) -> Result<Solution, SolveFailure> {
    Solver::new(ctx, options.clone()).solve(system)
}
