//! Rendering types for diagnostics.
//!
//! The output uses the same notation the type parser accepts, so a rendered
//! type can be pasted back into a fixture.

use crate::ty::{Convention, Type};
use std::fmt;
use tyre_core::NameTable;

/// Maximum nesting depth rendered before eliding with `...`.
const MAX_TYPE_TO_STRING_DEPTH: u32 = 20;

/// Display wrapper pairing a type with the name table it was built from.
pub struct TypeDisplay<'a> {
    ty: &'a Type,
    names: &'a NameTable,
}

impl Type {
    pub fn display<'a>(&'a self, names: &'a NameTable) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, names }
    }

    /// Render to an owned string; shorthand for diagnostics arguments.
    pub fn to_string_with(&self, names: &NameTable) -> String {
        self.display(names).to_string()
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self.ty, self.names, 0)
    }
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    items: &[Type],
    names: &NameTable,
    depth: u32,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_type(f, item, names, depth + 1)?;
    }
    Ok(())
}

fn write_type(f: &mut fmt::Formatter<'_>, ty: &Type, names: &NameTable, depth: u32) -> fmt::Result {
    if depth > MAX_TYPE_TO_STRING_DEPTH {
        return write!(f, "...");
    }
    match ty {
        Type::Var(v) => write!(f, "{}", v),
        Type::Param(name) => write!(f, "{}", names.resolve(*name)),
        Type::Nominal { name, args } => {
            write!(f, "{}", names.resolve(*name))?;
            if !args.is_empty() {
                write!(f, "<")?;
                write_list(f, args, names, depth)?;
                write!(f, ">")?;
            }
            Ok(())
        }
        Type::Function(func) => {
            write!(f, "(")?;
            for (i, param) in func.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                if param.convention != Convention::Let {
                    write!(f, "{} ", param.convention.keyword())?;
                }
                write_type(f, &param.ty, names, depth + 1)?;
            }
            write!(f, ") -> ")?;
            write_type(f, &func.ret, names, depth + 1)
        }
        Type::Tuple(elements) => {
            write!(f, "(")?;
            write_list(f, elements, names, depth)?;
            if elements.len() == 1 {
                write!(f, ",")?;
            }
            write!(f, ")")
        }
        Type::Existential(traits) => {
            write!(f, "any")?;
            for (i, name) in traits.iter().enumerate() {
                let sep = if i == 0 { " " } else { " & " };
                write!(f, "{}{}", sep, names.resolve(name))?;
            }
            Ok(())
        }
        Type::Literal(kind) => write!(f, "#{}", kind.keyword()),
        Type::Error => write!(f, "!"),
        Type::Unresolved => write!(f, "_"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{LiteralKind, Parameter, TypeVar};

    #[test]
    fn test_display_nominal_and_function() {
        let names = NameTable::new();
        let int = Type::nominal(names.intern("Int"));
        let array = Type::generic(names.intern("Array"), vec![int.clone()]);
        let f = Type::function_with(
            vec![
                Parameter::new(Convention::Let, array),
                Parameter::new(Convention::Inout, Type::Var(TypeVar(2))),
            ],
            int,
        );
        assert_eq!(f.to_string_with(&names), "(Array<Int>, inout ?2) -> Int");
    }

    #[test]
    fn test_display_tuples() {
        let names = NameTable::new();
        let int = Type::nominal(names.intern("Int"));
        assert_eq!(Type::unit().to_string_with(&names), "()");
        assert_eq!(Type::Tuple(vec![int.clone()]).to_string_with(&names), "(Int,)");
        assert_eq!(
            Type::Tuple(vec![int, Type::Literal(LiteralKind::Float)]).to_string_with(&names),
            "(Int, #float)"
        );
    }

    #[test]
    fn test_display_existential() {
        let names = NameTable::new();
        let p = names.intern("Equatable");
        let q = names.intern("Hashable");
        assert_eq!(Type::existential([q, p]).to_string_with(&names), "any Equatable & Hashable");
        assert_eq!(Type::existential([]).to_string_with(&names), "any");
    }

    #[test]
    fn test_display_depth_limit() {
        let names = NameTable::new();
        let mut ty = Type::nominal(names.intern("Int"));
        for _ in 0..30 {
            ty = Type::Tuple(vec![ty, Type::Error]);
        }
        assert!(ty.to_string_with(&names).contains("..."));
    }
}
