use crate::constraint::SizePredicate;
use indexmap::IndexMap;
use tyre_core::{DeclId, NodeId};
use tyre_diagnostics::{Diagnostic, DiagnosticCollection};
use tyre_types::{Type, TypeVar};

/// The answer for one unit: a type for every free variable, the declaration
/// every overloaded reference resolved to, and non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct Solution {
    bindings: Vec<Type>,
    references: IndexMap<NodeId, DeclId>,
    predicates: Vec<SizePredicate>,
    penalty: u32,
    diagnostics: DiagnosticCollection,
}

impl Solution {
    pub(crate) fn new(
        bindings: Vec<Type>,
        references: IndexMap<NodeId, DeclId>,
        predicates: Vec<SizePredicate>,
        penalty: u32,
        warnings: Vec<Diagnostic>,
    ) -> Self {
        let mut diagnostics = DiagnosticCollection::new();
        for warning in warnings {
            diagnostics.add(warning);
        }
        Self {
            bindings,
            references,
            predicates,
            penalty,
            diagnostics,
        }
    }

    /// The type `var` was resolved to. `None` for variables outside the
    /// unit or still unbound.
    pub fn binding(&self, var: TypeVar) -> Option<&Type> {
        self.bindings.get(var.index()).filter(|t| !t.is_var())
    }

    /// Every resolved variable with its type, in variable order.
    pub fn bindings(&self) -> impl Iterator<Item = (TypeVar, &Type)> + '_ {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_var())
            .map(|(i, t)| (TypeVar(i as u32), t))
    }

    /// Substitute the solution into `ty`.
    pub fn apply(&self, ty: &Type) -> Type {
        ty.map_vars(&mut |v| self.bindings.get(v.index()).cloned())
    }

    /// The declaration the reference at `site` resolved to.
    pub fn reference(&self, site: NodeId) -> Option<DeclId> {
        self.references.get(&site).copied()
    }

    /// Every resolved reference, in the order the search committed to them.
    pub fn references(&self) -> impl Iterator<Item = (NodeId, DeclId)> + '_ {
        self.references.iter().map(|(site, decl)| (*site, *decl))
    }

    pub fn predicates(&self) -> &[SizePredicate] {
        &self.predicates
    }

    /// Total penalty of the alternatives this solution chose.
    pub fn penalty(&self) -> u32 {
        self.penalty
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Attach a warning from a downstream collaborator.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.add(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyre_core::NameTable;
    use tyre_diagnostics::messages;

    #[test]
    fn test_unbound_variables_have_no_binding() {
        let names = NameTable::new();
        let int = Type::nominal(names.intern("Int"));
        let solution = Solution::new(
            vec![int.clone(), Type::Var(TypeVar(1))],
            IndexMap::new(),
            Vec::new(),
            0,
            Vec::new(),
        );
        assert_eq!(solution.binding(TypeVar(0)), Some(&int));
        assert_eq!(solution.binding(TypeVar(1)), None);
        assert_eq!(solution.binding(TypeVar(9)), None);
        assert_eq!(solution.bindings().count(), 1);
        assert_eq!(
            solution.apply(&Type::Tuple(vec![Type::Var(TypeVar(0)), Type::Var(TypeVar(5))])),
            Type::Tuple(vec![int, Type::Var(TypeVar(5))])
        );
    }

    #[test]
    fn test_warnings_do_not_block() {
        let mut solution = Solution::new(Vec::new(), IndexMap::new(), Vec::new(), 0, Vec::new());
        solution.warn(Diagnostic::new(&messages::LITERAL_DEFAULTED_TO_TYPE_0, &["Int"]));
        assert_eq!(solution.diagnostics().warning_count(), 1);
        assert!(!solution.diagnostics().has_errors());
    }
}
