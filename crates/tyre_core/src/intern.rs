//! Name interning.
//!
//! Type, trait, member, and generic parameter names are interned so that the
//! solver compares them as integers. The table is shared by every solver
//! instance checking units of the same program, possibly on different threads.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::Arc;

/// An interned name. This is a lightweight handle (u32) that can be used to
/// look up the actual string content in the [`NameTable`] that produced it.
///
/// Comparing two `Name` values is an O(1) integer comparison. The ordering is
/// interning order, which is stable for a given table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Name(Spur);

impl Name {
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

/// Thread-safe name interner.
///
/// Cloning is cheap: clones share the same underlying storage.
#[derive(Clone)]
pub struct NameTable {
    rodeo: Arc<ThreadedRodeo>,
}

impl NameTable {
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a string, returning the existing handle if it was seen before.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        Name::from_spur(self.rodeo.get_or_intern(s))
    }

    /// Intern a static string.
    #[inline]
    pub fn intern_static(&self, s: &'static str) -> Name {
        Name::from_spur(self.rodeo.get_or_intern_static(s))
    }

    /// Look up an already-interned name without interning it if absent.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Name> {
        self.rodeo.get(s).map(Name::from_spur)
    }

    /// Resolve a name back to its text.
    #[inline]
    pub fn resolve(&self, name: Name) -> &str {
        self.rodeo.resolve(&name.as_spur())
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTable")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let names = NameTable::new();
        let a = names.intern("Int");
        let b = names.intern("Int");
        let c = names.intern("Double");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(names.resolve(a), "Int");
        assert_eq!(names.resolve(c), "Double");
    }

    #[test]
    fn test_get() {
        let names = NameTable::new();
        assert!(names.get("Array").is_none());
        let a = names.intern("Array");
        assert_eq!(names.get("Array"), Some(a));
    }

    #[test]
    fn test_clones_share_storage() {
        let names = NameTable::new();
        let other = names.clone();
        let a = names.intern("Comparable");
        assert_eq!(other.get("Comparable"), Some(a));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_intern_from_threads() {
        let names = NameTable::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let names = names.clone();
                std::thread::spawn(move || names.intern("Shared"))
            })
            .collect();
        let ids: Vec<Name> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }
}
