//! Type notation parser tests.
//!
//! Each test parses a piece of notation and compares it against the type built
//! by hand, or checks that the rendering of the parsed type matches the input.

use tyre_core::NameTable;
use tyre_syntax::{parse_type, parse_type_with_params, SyntaxError};
use tyre_types::{Convention, LiteralKind, Parameter, Type, TypeVar};

/// Helper: parse and render back with the same name table.
fn roundtrip(src: &str) -> String {
    let names = NameTable::new();
    let ty = parse_type(src, &names).unwrap();
    ty.to_string_with(&names)
}

// ============================================================================
// Atoms
// ============================================================================

#[test]
fn test_parse_nominal() {
    let names = NameTable::new();
    let ty = parse_type("Int", &names).unwrap();
    assert_eq!(ty, Type::nominal(names.intern("Int")));
}

#[test]
fn test_parse_variable() {
    let names = NameTable::new();
    assert_eq!(parse_type("?7", &names).unwrap(), Type::Var(TypeVar(7)));
}

#[test]
fn test_parse_literals() {
    let names = NameTable::new();
    assert_eq!(
        parse_type("#integer", &names).unwrap(),
        Type::Literal(LiteralKind::Integer)
    );
    assert_eq!(
        parse_type("#boolean", &names).unwrap(),
        Type::Literal(LiteralKind::Boolean)
    );
}

#[test]
fn test_parse_error_and_placeholder() {
    let names = NameTable::new();
    assert_eq!(parse_type("!", &names).unwrap(), Type::Error);
    assert_eq!(parse_type("_", &names).unwrap(), Type::Unresolved);
}

#[test]
fn test_parse_existential() {
    let names = NameTable::new();
    let ty = parse_type("any Hashable & Equatable", &names).unwrap();
    assert_eq!(
        ty,
        Type::existential([names.intern("Equatable"), names.intern("Hashable")])
    );
    assert_eq!(parse_type("any", &names).unwrap(), Type::existential([]));
}

// ============================================================================
// Compound Types
// ============================================================================

#[test]
fn test_parse_generic_arguments() {
    let names = NameTable::new();
    let ty = parse_type("Dictionary<String, Array<?0>>", &names).unwrap();
    let expected = Type::generic(
        names.intern("Dictionary"),
        vec![
            Type::nominal(names.intern("String")),
            Type::generic(names.intern("Array"), vec![Type::Var(TypeVar(0))]),
        ],
    );
    assert_eq!(ty, expected);
}

#[test]
fn test_parenthesized_type_is_not_a_tuple() {
    let names = NameTable::new();
    assert_eq!(parse_type("(Int)", &names).unwrap(), Type::nominal(names.intern("Int")));
}

#[test]
fn test_tuples() {
    assert_eq!(roundtrip("()"), "()");
    assert_eq!(roundtrip("(Int,)"), "(Int,)");
    assert_eq!(roundtrip("(Int, Bool,)"), "(Int, Bool)");
}

#[test]
fn test_function_with_conventions() {
    let names = NameTable::new();
    let int = Type::nominal(names.intern("Int"));
    let ty = parse_type("(inout Int, sink ?1, let Int) -> ()", &names).unwrap();
    let expected = Type::function_with(
        vec![
            Parameter::new(Convention::Inout, int.clone()),
            Parameter::new(Convention::Sink, Type::Var(TypeVar(1))),
            Parameter::new(Convention::Let, int),
        ],
        Type::unit(),
    );
    assert_eq!(ty, expected);
}

#[test]
fn test_function_arrow_is_right_associative() {
    assert_eq!(roundtrip("(Int) -> (Bool) -> Int"), "(Int) -> (Bool) -> Int");
}

#[test]
fn test_convention_keyword_as_type_name() {
    let names = NameTable::new();
    let ty = parse_type("(set) -> Int", &names).unwrap();
    assert_eq!(
        ty,
        Type::function(vec![Type::nominal(names.intern("set"))], Type::nominal(names.intern("Int")))
    );
}

#[test]
fn test_rendering_roundtrips() {
    for src in [
        "(Array<Int>, inout ?2) -> Int",
        "any Equatable & Hashable",
        "(#float, !)",
        "() -> Dictionary<String, ?0>",
    ] {
        assert_eq!(roundtrip(src), src);
    }
}

// ============================================================================
// Generic Parameters
// ============================================================================

#[test]
fn test_generic_parameters() {
    let names = NameTable::new();
    let t = names.intern("T");
    let ty = parse_type_with_params("(T) -> Array<T>", &names, &[t]).unwrap();
    assert_eq!(
        ty,
        Type::function(
            vec![Type::Param(t)],
            Type::generic(names.intern("Array"), vec![Type::Param(t)])
        )
    );
    assert!(parse_type("T", &names).unwrap() != Type::Param(t));
}

#[test]
fn test_generic_parameter_with_arguments_is_rejected() {
    let names = NameTable::new();
    let t = names.intern("T");
    let err = parse_type_with_params("T<Int>", &names, &[t]).unwrap_err();
    assert!(matches!(err, SyntaxError::ParameterWithArguments { .. }));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_literal_kind() {
    let names = NameTable::new();
    let err = parse_type("#char", &names).unwrap_err();
    assert!(matches!(err, SyntaxError::UnknownLiteralKind { ref keyword, .. } if keyword == "char"));
    assert_eq!((err.span().offset(), err.span().len()), (1, 4));
}

#[test]
fn test_convention_outside_function() {
    let names = NameTable::new();
    let err = parse_type("(inout Int, Bool)", &names).unwrap_err();
    assert!(matches!(err, SyntaxError::MisplacedConvention { .. }));
    let err = parse_type("inout Int", &names).unwrap_err();
    assert!(matches!(err, SyntaxError::MisplacedConvention { .. }));
}

#[test]
fn test_unclosed_generic_arguments() {
    let names = NameTable::new();
    let err = parse_type("Array<Int", &names).unwrap_err();
    match err {
        SyntaxError::UnexpectedToken { expected, found, .. } => {
            assert_eq!(expected, "',' or '>'");
            assert_eq!(found, "end of input");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_trailing_input() {
    let names = NameTable::new();
    assert!(matches!(
        parse_type("Int Bool", &names),
        Err(SyntaxError::UnexpectedToken { .. })
    ));
}

#[test]
fn test_empty_input() {
    let names = NameTable::new();
    assert!(parse_type("   ", &names).is_err());
}
