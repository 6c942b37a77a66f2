//! Type representation.

use rustc_hash::FxHashMap;
use std::fmt;
use tyre_core::Name;

/// A unification variable: an index into the substitution store.
///
/// Variables have no value of their own; two variables are the same variable
/// only if their indices are equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeVar(pub u32);

impl TypeVar {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// Parameter passing conventions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Convention {
    #[default]
    Let,
    Inout,
    Sink,
    Set,
}

impl Convention {
    pub fn keyword(self) -> &'static str {
        match self {
            Convention::Let => "let",
            Convention::Inout => "inout",
            Convention::Sink => "sink",
            Convention::Set => "set",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Convention> {
        match s {
            "let" => Some(Convention::Let),
            "inout" => Some(Convention::Inout),
            "sink" => Some(Convention::Sink),
            "set" => Some(Convention::Set),
            _ => None,
        }
    }
}

/// The kinds of built-in literal types.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
}

impl LiteralKind {
    pub const ALL: [LiteralKind; 4] = [
        LiteralKind::Integer,
        LiteralKind::Float,
        LiteralKind::String,
        LiteralKind::Boolean,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            LiteralKind::Integer => "integer",
            LiteralKind::Float => "float",
            LiteralKind::String => "string",
            LiteralKind::Boolean => "boolean",
        }
    }

    pub fn from_keyword(s: &str) -> Option<LiteralKind> {
        LiteralKind::ALL.into_iter().find(|k| k.keyword() == s)
    }

    /// Name of the trait whose conformers can be written with this literal.
    pub fn expressible_by_trait(self) -> &'static str {
        match self {
            LiteralKind::Integer => "ExpressibleByIntegerLiteral",
            LiteralKind::Float => "ExpressibleByFloatLiteral",
            LiteralKind::String => "ExpressibleByStringLiteral",
            LiteralKind::Boolean => "ExpressibleByBooleanLiteral",
        }
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub convention: Convention,
    pub ty: Type,
}

impl Parameter {
    pub fn new(convention: Convention, ty: Type) -> Self {
        Self { convention, ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Parameter>,
    pub ret: Box<Type>,
}

/// A sorted, duplicate-free set of trait names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TraitSet(Vec<Name>);

impl TraitSet {
    pub fn new(traits: impl IntoIterator<Item = Name>) -> Self {
        let mut traits: Vec<Name> = traits.into_iter().collect();
        traits.sort();
        traits.dedup();
        Self(traits)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.0.binary_search(&name).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Name> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Name] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A type.
///
/// Types compare structurally, except `Var`, which compares by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A type variable, meaningful only through a substitution.
    Var(TypeVar),
    /// A generic parameter of a declaration's signature. Replaced by a fresh
    /// variable whenever the declaration is opened.
    Param(Name),
    /// A nominal type with its generic arguments.
    Nominal { name: Name, args: Vec<Type> },
    Function(FunctionType),
    Tuple(Vec<Type>),
    /// An existential over a set of traits (`any P & Q`).
    Existential(TraitSet),
    /// The type of a literal expression before it is given a concrete type.
    Literal(LiteralKind),
    /// The type of an ill-formed expression. Relates to every type.
    Error,
    /// Placeholder for a type nobody has computed yet. Never valid as a
    /// constraint operand.
    Unresolved,
}

impl Type {
    pub fn var(var: TypeVar) -> Type {
        Type::Var(var)
    }

    pub fn nominal(name: Name) -> Type {
        Type::Nominal { name, args: Vec::new() }
    }

    pub fn generic(name: Name, args: Vec<Type>) -> Type {
        Type::Nominal { name, args }
    }

    /// A function type whose parameters all use the `let` convention.
    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function(FunctionType {
            params: params
                .into_iter()
                .map(|ty| Parameter::new(Convention::Let, ty))
                .collect(),
            ret: Box::new(ret),
        })
    }

    pub fn function_with(params: Vec<Parameter>, ret: Type) -> Type {
        Type::Function(FunctionType {
            params,
            ret: Box::new(ret),
        })
    }

    pub fn existential(traits: impl IntoIterator<Item = Name>) -> Type {
        Type::Existential(TraitSet::new(traits))
    }

    pub fn unit() -> Type {
        Type::Tuple(Vec::new())
    }

    #[inline]
    pub fn as_var(&self) -> Option<TypeVar> {
        match self {
            Type::Var(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    /// Visit every direct component type.
    pub fn for_each_child(&self, mut f: impl FnMut(&Type)) {
        match self {
            Type::Nominal { args, .. } => args.iter().for_each(f),
            Type::Function(func) => {
                for p in &func.params {
                    f(&p.ty);
                }
                f(func.ret.as_ref());
            }
            Type::Tuple(elements) => elements.iter().for_each(f),
            Type::Var(_)
            | Type::Param(_)
            | Type::Existential(_)
            | Type::Literal(_)
            | Type::Error
            | Type::Unresolved => {}
        }
    }

    /// Whether `pred` holds for this type or any type nested in it.
    pub fn any(&self, pred: &mut impl FnMut(&Type) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        let mut found = false;
        self.for_each_child(|child| {
            if !found && child.any(&mut *pred) {
                found = true;
            }
        });
        found
    }

    /// Collect the variables occurring in this type, in first-occurrence order.
    pub fn free_vars(&self, out: &mut Vec<TypeVar>) {
        if let Type::Var(v) = self {
            if !out.contains(v) {
                out.push(*v);
            }
            return;
        }
        self.for_each_child(|child| child.free_vars(out));
    }

    pub fn has_vars(&self) -> bool {
        self.any(&mut |t| t.is_var())
    }

    pub fn contains_var(&self, var: TypeVar) -> bool {
        self.any(&mut |t| *t == Type::Var(var))
    }

    pub fn has_placeholder(&self) -> bool {
        self.any(&mut |t| matches!(t, Type::Unresolved))
    }

    pub fn has_params(&self) -> bool {
        self.any(&mut |t| matches!(t, Type::Param(_)))
    }

    /// Rebuild this type bottom-up, giving `f` the chance to replace leaves.
    /// `f` returns `None` to keep a node and recurse into it.
    pub fn transform(&self, f: &mut impl FnMut(&Type) -> Option<Type>) -> Type {
        if let Some(replaced) = f(self) {
            return replaced;
        }
        match self {
            Type::Nominal { name, args } => Type::Nominal {
                name: *name,
                args: args.iter().map(|a| a.transform(&mut *f)).collect(),
            },
            Type::Function(func) => Type::Function(FunctionType {
                params: func
                    .params
                    .iter()
                    .map(|p| Parameter::new(p.convention, p.ty.transform(&mut *f)))
                    .collect(),
                ret: Box::new(func.ret.transform(&mut *f)),
            }),
            Type::Tuple(elements) => Type::Tuple(elements.iter().map(|e| e.transform(&mut *f)).collect()),
            other => other.clone(),
        }
    }

    /// Replace variables according to `f`.
    pub fn map_vars(&self, f: &mut impl FnMut(TypeVar) -> Option<Type>) -> Type {
        self.transform(&mut |t| match t {
            Type::Var(v) => f(*v),
            _ => None,
        })
    }

    /// Replace generic parameters by the types they are mapped to.
    pub fn substitute_params(&self, map: &FxHashMap<Name, Type>) -> Type {
        if map.is_empty() {
            return self.clone();
        }
        self.transform(&mut |t| match t {
            Type::Param(name) => map.get(name).cloned(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyre_core::NameTable;

    #[test]
    fn test_vars_compare_by_identity() {
        assert_eq!(Type::Var(TypeVar(1)), Type::Var(TypeVar(1)));
        assert_ne!(Type::Var(TypeVar(1)), Type::Var(TypeVar(2)));
    }

    #[test]
    fn test_nominal_compares_structurally() {
        let names = NameTable::new();
        let array = names.intern("Array");
        let int = Type::nominal(names.intern("Int"));
        assert_eq!(
            Type::generic(array, vec![int.clone()]),
            Type::generic(array, vec![int])
        );
    }

    #[test]
    fn test_free_vars_in_order() {
        let f = Type::function(
            vec![Type::Var(TypeVar(3)), Type::Var(TypeVar(1))],
            Type::Tuple(vec![Type::Var(TypeVar(3)), Type::Var(TypeVar(2))]),
        );
        let mut vars = Vec::new();
        f.free_vars(&mut vars);
        assert_eq!(vars, vec![TypeVar(3), TypeVar(1), TypeVar(2)]);
        assert!(f.contains_var(TypeVar(2)));
        assert!(!f.contains_var(TypeVar(0)));
    }

    #[test]
    fn test_substitute_params() {
        let names = NameTable::new();
        let t = names.intern("T");
        let array = names.intern("Array");
        let int = Type::nominal(names.intern("Int"));
        let sig = Type::function(vec![Type::Param(t)], Type::generic(array, vec![Type::Param(t)]));

        let mut map = FxHashMap::default();
        map.insert(t, int.clone());
        let opened = sig.substitute_params(&map);
        assert_eq!(opened, Type::function(vec![int.clone()], Type::generic(array, vec![int])));
        assert!(!opened.has_params());
    }

    #[test]
    fn test_trait_set_is_sorted_and_unique() {
        let names = NameTable::new();
        let a = names.intern("Equatable");
        let b = names.intern("Hashable");
        let set = TraitSet::new([b, a, b]);
        assert_eq!(set.as_slice(), &[a, b]);
        assert!(set.contains(b));
        assert_eq!(Type::existential([a, b]), Type::existential([b, a]));
    }

    #[test]
    fn test_literal_keywords() {
        for kind in LiteralKind::ALL {
            assert_eq!(LiteralKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(
            LiteralKind::Integer.expressible_by_trait(),
            "ExpressibleByIntegerLiteral"
        );
    }

    #[test]
    fn test_placeholder_detection() {
        let t = Type::Tuple(vec![Type::Error, Type::Unresolved]);
        assert!(t.has_placeholder());
        assert!(!Type::Error.has_placeholder());
    }
}
