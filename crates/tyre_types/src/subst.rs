//! The substitution store.
//!
//! A union-find over type variables. Each variable's slot is either a root
//! (unbound, carrying a rank), a link to another variable of the same class,
//! or a binding to a non-variable type. Binding a variable to another
//! variable merges their classes instead of storing a `Var` binding, so a
//! `Bound` slot never holds a bare variable.
//!
//! Every slot write made while a snapshot is open goes to an undo log.
//! Restoring a snapshot replays the log backwards, which costs time
//! proportional to the changes made since the snapshot, not to the size of
//! the store. Snapshots nest and must be restored/committed in LIFO order.

use crate::ty::{Type, TypeVar};
use crate::unify::UnifyError;

#[derive(Debug, Clone)]
enum Slot {
    Root { rank: u32 },
    Link(TypeVar),
    Bound(Type),
}

#[derive(Debug, Clone)]
enum UndoEntry {
    Write { var: TypeVar, old: Slot },
    NewVar,
}

/// A point in the store's history that can be returned to.
#[derive(Debug)]
#[must_use = "a snapshot must be restored or committed"]
pub struct Snapshot {
    undo_len: usize,
    depth: usize,
}

/// Mapping from type variables to types, with union-find semantics.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    slots: Vec<Slot>,
    undo: Vec<UndoEntry>,
    open_snapshots: usize,
    version: u64,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `count` unbound variables `?0 .. ?count-1`.
    pub fn with_vars(count: u32) -> Self {
        Self {
            slots: (0..count).map(|_| Slot::Root { rank: 0 }).collect(),
            ..Self::default()
        }
    }

    pub fn var_count(&self) -> usize {
        self.slots.len()
    }

    /// Monotonic counter bumped by every write and every restore. Callers use
    /// it to tell whether anything changed between two points.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Allocate a new unbound variable.
    pub fn fresh_var(&mut self) -> TypeVar {
        let var = TypeVar(self.slots.len() as u32);
        self.slots.push(Slot::Root { rank: 0 });
        if self.open_snapshots > 0 {
            self.undo.push(UndoEntry::NewVar);
        }
        var
    }

    fn write(&mut self, var: TypeVar, slot: Slot) {
        let old = std::mem::replace(&mut self.slots[var.index()], slot);
        if self.open_snapshots > 0 {
            self.undo.push(UndoEntry::Write { var, old });
        }
        self.version += 1;
    }

    /// Find the representative of `var`'s class without modifying the store.
    pub fn find_root(&self, var: TypeVar) -> TypeVar {
        let mut current = var;
        while let Slot::Link(next) = &self.slots[current.index()] {
            current = *next;
        }
        current
    }

    /// Find the representative of `var`'s class, compressing the path.
    pub fn find(&mut self, var: TypeVar) -> TypeVar {
        let root = self.find_root(var);
        let mut current = var;
        while current != root {
            let next = match &self.slots[current.index()] {
                Slot::Link(next) => *next,
                _ => break,
            };
            if next != root {
                self.write(current, Slot::Link(root));
            }
            current = next;
        }
        root
    }

    /// Follow bindings to a fixed point. Returns the class representative as
    /// a type when the variable is unbound.
    pub fn resolve(&mut self, var: TypeVar) -> Type {
        let root = self.find(var);
        match &self.slots[root.index()] {
            Slot::Bound(ty) => ty.clone(),
            _ => Type::Var(root),
        }
    }

    /// Like [`resolve`](Self::resolve), but without path compression.
    pub fn probe(&self, var: TypeVar) -> Type {
        let root = self.find_root(var);
        match &self.slots[root.index()] {
            Slot::Bound(ty) => ty.clone(),
            _ => Type::Var(root),
        }
    }

    pub fn is_bound(&self, var: TypeVar) -> bool {
        let root = self.find_root(var);
        matches!(self.slots[root.index()], Slot::Bound(_))
    }

    /// Resolve the outermost layer of `ty` only.
    pub fn shallow(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Var(v) => self.resolve(*v),
            other => other.clone(),
        }
    }

    /// Resolve `ty` completely: every bound variable anywhere inside it is
    /// replaced by its binding. Unbound variables are replaced by their
    /// class representative.
    pub fn apply(&self, ty: &Type) -> Type {
        ty.map_vars(&mut |v| match self.probe(v) {
            Type::Var(root) => Some(Type::Var(root)),
            bound => Some(self.apply(&bound)),
        })
    }

    /// Whether `var` occurs in `ty` once bindings are followed.
    pub fn occurs(&self, var: TypeVar, ty: &Type) -> bool {
        let root = self.find_root(var);
        ty.any(&mut |t| match t {
            Type::Var(v) => match self.probe(*v) {
                Type::Var(r) => r == root,
                bound => self.occurs(root, &bound),
            },
            _ => false,
        })
    }

    /// Record that `var` stands for `ty`.
    ///
    /// If `var` is already bound, the existing binding is unified with `ty`
    /// instead. Fails with [`UnifyError::Occurs`] if `ty` contains `var`.
    pub fn bind(&mut self, var: TypeVar, ty: Type) -> Result<(), UnifyError> {
        let root = self.find(var);
        if let Slot::Bound(existing) = &self.slots[root.index()] {
            let existing = existing.clone();
            return self.unify(&existing, &ty);
        }
        match self.shallow(&ty) {
            Type::Var(other) => {
                self.link(root, other);
                Ok(())
            }
            ty => {
                if self.occurs(root, &ty) {
                    return Err(UnifyError::Occurs {
                        var: root,
                        ty: self.apply(&ty),
                    });
                }
                tracing::trace!(var = %root, "bind");
                self.write(root, Slot::Bound(ty));
                Ok(())
            }
        }
    }

    /// Merge two unbound classes. The root with the higher rank wins; on
    /// equal ranks the lower index wins, so the result does not depend on
    /// argument order.
    fn link(&mut self, a: TypeVar, b: TypeVar) {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return;
        }
        let rank_of = |slot: &Slot| match slot {
            Slot::Root { rank } => *rank,
            _ => 0,
        };
        let rank_a = rank_of(&self.slots[a.index()]);
        let rank_b = rank_of(&self.slots[b.index()]);
        let (root, child) = match rank_a.cmp(&rank_b) {
            std::cmp::Ordering::Greater => (a, b),
            std::cmp::Ordering::Less => (b, a),
            std::cmp::Ordering::Equal => {
                let (root, child) = if a < b { (a, b) } else { (b, a) };
                self.write(root, Slot::Root { rank: rank_a + 1 });
                (root, child)
            }
        };
        self.write(child, Slot::Link(root));
    }

    pub fn snapshot(&mut self) -> Snapshot {
        self.open_snapshots += 1;
        Snapshot {
            undo_len: self.undo.len(),
            depth: self.open_snapshots,
        }
    }

    /// Undo every change made since `snapshot` was taken. The snapshot stays
    /// open and can be restored again.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        debug_assert_eq!(snapshot.depth, self.open_snapshots, "snapshots restored out of order");
        while self.undo.len() > snapshot.undo_len {
            match self.undo.pop() {
                Some(UndoEntry::Write { var, old }) => self.slots[var.index()] = old,
                Some(UndoEntry::NewVar) => {
                    self.slots.pop();
                }
                None => break,
            }
        }
        self.version += 1;
    }

    /// Close `snapshot`, keeping every change made since it was taken.
    pub fn commit(&mut self, snapshot: Snapshot) {
        debug_assert_eq!(snapshot.depth, self.open_snapshots, "snapshots committed out of order");
        self.open_snapshots -= 1;
        if self.open_snapshots == 0 {
            self.undo.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyre_core::NameTable;

    fn int(names: &NameTable) -> Type {
        Type::nominal(names.intern("Int"))
    }

    #[test]
    fn test_resolve_unbound_returns_var() {
        let mut s = Substitution::with_vars(2);
        assert_eq!(s.resolve(TypeVar(1)), Type::Var(TypeVar(1)));
        assert!(!s.is_bound(TypeVar(1)));
    }

    #[test]
    fn test_bind_and_resolve() {
        let names = NameTable::new();
        let mut s = Substitution::with_vars(1);
        s.bind(TypeVar(0), int(&names)).unwrap();
        assert_eq!(s.resolve(TypeVar(0)), int(&names));
    }

    #[test]
    fn test_chain_of_links_resolves_to_binding() {
        let names = NameTable::new();
        let mut s = Substitution::with_vars(4);
        s.bind(TypeVar(0), Type::Var(TypeVar(1))).unwrap();
        s.bind(TypeVar(2), Type::Var(TypeVar(3))).unwrap();
        s.bind(TypeVar(1), Type::Var(TypeVar(3))).unwrap();
        s.bind(TypeVar(3), int(&names)).unwrap();
        for i in 0..4 {
            assert_eq!(s.resolve(TypeVar(i)), int(&names));
        }
        assert_eq!(s.find_root(TypeVar(0)), s.find_root(TypeVar(2)));
    }

    #[test]
    fn test_occurs_check() {
        let names = NameTable::new();
        let array = names.intern("Array");
        let mut s = Substitution::with_vars(2);
        s.bind(TypeVar(1), Type::Var(TypeVar(0))).unwrap();
        let err = s
            .bind(TypeVar(0), Type::generic(array, vec![Type::Var(TypeVar(1))]))
            .unwrap_err();
        assert!(matches!(err, UnifyError::Occurs { .. }));
        assert!(!s.is_bound(TypeVar(0)));
    }

    #[test]
    fn test_self_binding_is_noop() {
        let mut s = Substitution::with_vars(1);
        s.bind(TypeVar(0), Type::Var(TypeVar(0))).unwrap();
        assert!(!s.is_bound(TypeVar(0)));
    }

    #[test]
    fn test_snapshot_restore_undoes_bindings_and_vars() {
        let names = NameTable::new();
        let mut s = Substitution::with_vars(2);
        s.bind(TypeVar(0), int(&names)).unwrap();

        let snap = s.snapshot();
        let fresh = s.fresh_var();
        s.bind(TypeVar(1), Type::Var(fresh)).unwrap();
        s.bind(fresh, Type::Tuple(vec![])).unwrap();
        assert_eq!(s.var_count(), 3);
        assert_eq!(s.resolve(TypeVar(1)), Type::unit());

        s.restore(&snap);
        assert_eq!(s.var_count(), 2);
        assert_eq!(s.probe(TypeVar(1)), Type::Var(TypeVar(1)));
        assert_eq!(s.probe(TypeVar(0)), int(&names));
        s.commit(snap);
    }

    #[test]
    fn test_nested_snapshots() {
        let names = NameTable::new();
        let mut s = Substitution::with_vars(2);
        let outer = s.snapshot();
        s.bind(TypeVar(0), int(&names)).unwrap();
        let inner = s.snapshot();
        s.bind(TypeVar(1), int(&names)).unwrap();
        s.restore(&inner);
        s.commit(inner);
        assert!(s.is_bound(TypeVar(0)));
        assert!(!s.is_bound(TypeVar(1)));
        s.restore(&outer);
        s.commit(outer);
        assert!(!s.is_bound(TypeVar(0)));
    }

    #[test]
    fn test_apply_resolves_nested() {
        let names = NameTable::new();
        let array = names.intern("Array");
        let mut s = Substitution::with_vars(2);
        s.bind(TypeVar(0), Type::generic(array, vec![Type::Var(TypeVar(1))])).unwrap();
        s.bind(TypeVar(1), int(&names)).unwrap();
        assert_eq!(
            s.apply(&Type::Var(TypeVar(0))),
            Type::generic(array, vec![int(&names)])
        );
    }

    #[test]
    fn test_link_prefers_lower_index_on_equal_rank() {
        let mut a = Substitution::with_vars(2);
        a.bind(TypeVar(0), Type::Var(TypeVar(1))).unwrap();
        let mut b = Substitution::with_vars(2);
        b.bind(TypeVar(1), Type::Var(TypeVar(0))).unwrap();
        assert_eq!(a.find_root(TypeVar(1)), TypeVar(0));
        assert_eq!(b.find_root(TypeVar(1)), TypeVar(0));
    }
}
