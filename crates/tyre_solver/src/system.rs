//! The solver's input: the constraints of one type-checking unit.

use crate::constraint::Constraint;
use crate::solution::Solution;
use tyre_types::{Type, TypeVar};

/// Constraints and free variables of one unit, as built by the constraint
/// generator.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSystem {
    var_count: u32,
    constraints: Vec<Constraint>,
    seeds: Vec<(TypeVar, Type)>,
}

impl ConstraintSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A system whose free variables are `?0 .. ?count-1`.
    pub fn with_vars(count: u32) -> Self {
        Self {
            var_count: count,
            ..Self::default()
        }
    }

    /// Allocate a new free variable.
    pub fn fresh_var(&mut self) -> TypeVar {
        let var = TypeVar(self.var_count);
        self.var_count += 1;
        var
    }

    pub fn var_count(&self) -> u32 {
        self.var_count
    }

    pub fn free_vars(&self) -> impl Iterator<Item = TypeVar> {
        (0..self.var_count).map(TypeVar)
    }

    pub fn insert(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Pre-bind `var` to `ty` before solving starts.
    pub fn seed(&mut self, var: TypeVar, ty: Type) {
        self.seeds.push((var, ty));
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn seeds(&self) -> &[(TypeVar, Type)] {
        &self.seeds
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// This system with `solution` substituted into every constraint and
    /// its bindings added as seeds. Solving the result must reproduce
    /// `solution`.
    pub fn rewritten(&self, solution: &Solution) -> ConstraintSystem {
        let mut apply = |t: &Type| solution.apply(t);
        let constraints = self.constraints.iter().map(|c| c.map_types(&mut apply)).collect();
        let seeds = self
            .free_vars()
            .filter_map(|var| solution.binding(var).map(|ty| (var, ty.clone())))
            .collect();
        ConstraintSystem {
            var_count: self.var_count,
            constraints,
            seeds,
        }
    }
}

impl Extend<Constraint> for ConstraintSystem {
    fn extend<I: IntoIterator<Item = Constraint>>(&mut self, iter: I) {
        self.constraints.extend(iter);
    }
}
