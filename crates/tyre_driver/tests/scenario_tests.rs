//! Workspace loading and multi-unit checking tests.

use tyre_core::{DeclId, NodeId};
use tyre_driver::{load_workspace, DriverError, UnitReport, Workspace, MAX_UNIT_VARIABLES};
use tyre_solver::{ErrorKind, SolveError};
use tyre_syntax::parse_type;
use tyre_types::{Type, TypeVar};

const ENVIRONMENT: &str = r#"
  "environment": {
    "traits": [
      { "name": "Equatable" },
      { "name": "Comparable", "refines": ["Equatable"] },
      { "name": "ExpressibleByIntegerLiteral" },
      { "name": "Describable",
        "requirements": [{ "name": "describe", "decl": 90, "type": "(Self) -> String" }] }
    ],
    "types": [
      { "name": "Int", "conforms": ["Comparable", "ExpressibleByIntegerLiteral", "Describable"] },
      { "name": "Double", "conforms": ["Comparable"] },
      { "name": "String", "conforms": ["Equatable"] },
      { "name": "Array", "params": ["T"],
        "members": [
          { "name": "len", "decl": 10, "type": "Int" },
          { "name": "first", "decl": 11, "type": "T" }
        ] }
    ],
    "literalDefaults": { "integer": "Int" }
  }
"#;

/// Helper: a workspace with the shared environment and the given units.
fn workspace(units: &str) -> Workspace {
    workspace_with(units, "")
}

fn workspace_with(units: &str, config: &str) -> Workspace {
    let text = format!("{{ {config} {ENVIRONMENT}, \"units\": [{units}] }}");
    load_workspace(&text).unwrap()
}

fn ty(ws: &Workspace, src: &str) -> Type {
    parse_type(src, ws.names()).unwrap()
}

fn report<'a>(reports: &'a [UnitReport], name: &str) -> &'a UnitReport {
    reports.iter().find(|r| r.name == name).unwrap()
}

fn first_error(report: &UnitReport) -> &SolveError {
    &report.outcome.as_ref().unwrap_err().errors[0]
}

const SCENARIOS: &str = r#"
  { "name": "a", "variables": 1, "constraints": [
      { "kind": "equality", "left": "?0", "right": "Int" } ] },
  { "name": "b", "variables": 1, "constraints": [
      { "kind": "subtyping", "sub": "?0", "sup": "any Comparable" },
      { "kind": "equality", "left": "?0", "right": "Int" } ] },
  { "name": "c", "variables": 2, "constraints": [
      { "kind": "valueMember", "base": "?0", "member": "len", "type": "?1", "site": 3 },
      { "kind": "equality", "left": "?0", "right": "Array<Double>" } ] },
  { "name": "d", "variables": 3, "constraints": [
      { "kind": "overload", "type": "?0", "name": "f", "site": 4, "at": 4, "candidates": [
          { "decl": 1, "type": "(Int) -> Int" },
          { "decl": 2, "type": "(Double) -> Double", "penalty": 1 } ] },
      { "kind": "equality", "left": "?0", "right": "(?1) -> ?2" },
      { "kind": "equality", "left": "?1", "right": "Int" } ] },
  { "name": "e", "variables": 1, "constraints": [
      { "kind": "equality", "left": "?0", "right": "Int", "at": 1 },
      { "kind": "equality", "left": "?0", "right": "String", "at": 2 } ] },
  { "name": "f", "variables": 1, "constraints": [
      { "kind": "overload", "type": "?0", "name": "g", "site": 5, "candidates": [
          { "decl": 1, "type": "(Int) -> Int" },
          { "decl": 2, "type": "(Int) -> Int" } ] } ] }
"#;

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_reference_scenarios() {
    let ws = workspace(SCENARIOS);
    let reports = ws.check().unwrap();
    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e", "f"]);

    let a = report(&reports, "a").solution().unwrap();
    assert_eq!(a.binding(TypeVar(0)), Some(&ty(&ws, "Int")));
    assert!(report(&reports, "a").diagnostics(ws.names()).is_empty());

    let b = report(&reports, "b").solution().unwrap();
    assert_eq!(b.binding(TypeVar(0)), Some(&ty(&ws, "Int")));

    let c = report(&reports, "c").solution().unwrap();
    assert_eq!(c.binding(TypeVar(1)), Some(&ty(&ws, "Int")));
    assert_eq!(c.reference(NodeId(3)), Some(DeclId(10)));

    let d = report(&reports, "d").solution().unwrap();
    assert_eq!(d.reference(NodeId(4)), Some(DeclId(1)));

    let e = report(&reports, "e");
    assert_eq!(first_error(e).kind(), ErrorKind::TypeMismatch);
    let diagnostics = e.diagnostics(ws.names());
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(diagnostics.diagnostics()[0].locator.as_ref().map(|l| l.anchor), Some(NodeId(2)));

    match first_error(report(&reports, "f")) {
        SolveError::AmbiguousOverload { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_trait_requirement_member() {
    let ws = workspace(
        r#"{ "name": "describe", "variables": 2, "constraints": [
            { "kind": "equality", "left": "?0", "right": "Int" },
            { "kind": "valueMember", "base": "?0", "member": "describe", "type": "?1", "site": 1 } ] }"#,
    );
    let reports = ws.check().unwrap();
    let solution = reports[0].solution().unwrap();
    assert_eq!(solution.binding(TypeVar(1)), Some(&ty(&ws, "(Int) -> String")));
    assert_eq!(solution.reference(NodeId(1)), Some(DeclId(90)));
}

#[test]
fn test_generic_candidates_and_disjunctions() {
    let ws = workspace(
        r#"{ "name": "generic", "variables": 2, "constraints": [
            { "kind": "overload", "type": "?0", "name": "max", "site": 1, "candidates": [
                { "decl": 1, "type": "(T, T) -> T", "generics": [{ "name": "T", "bounds": ["Comparable"] }] } ] },
            { "kind": "equality", "left": "?0", "right": "(Double, Double) -> ?1" } ] },
           { "name": "choice", "variables": 1, "constraints": [
            { "kind": "disjunction", "minterms": [
                { "constraints": [{ "kind": "equality", "left": "?0", "right": "String" }], "penalty": 2 },
                { "constraints": [{ "kind": "conversion", "type": "?0", "literal": "integer" },
                                  { "kind": "equality", "left": "?0", "right": "Int" }] } ] } ] }"#,
    );
    let reports = ws.check().unwrap();
    assert_eq!(
        reports[0].solution().unwrap().binding(TypeVar(1)),
        Some(&ty(&ws, "Double"))
    );
    let choice = reports[1].solution().unwrap();
    assert_eq!(choice.binding(TypeVar(0)), Some(&ty(&ws, "Int")));
    assert_eq!(choice.penalty(), 0);
}

#[test]
fn test_literal_defaulting_from_config() {
    let units = r#"{ "name": "lit", "variables": 1, "constraints": [
        { "kind": "conversion", "type": "?0", "literal": "integer", "at": 6 } ] }"#;

    let strict = workspace(units).check().unwrap();
    assert_eq!(first_error(&strict[0]).kind(), ErrorKind::SearchAborted);

    let ws = workspace_with(units, r#""config": { "solver": { "literalDefaulting": true } },"#);
    let reports = ws.check().unwrap();
    assert!(reports[0].is_success());
    assert_eq!(reports[0].diagnostics(ws.names()).warning_count(), 1);
}

// ============================================================================
// Parallelism
// ============================================================================

#[test]
fn test_parallel_and_sequential_agree() {
    let mut units = Vec::new();
    for i in 0..24 {
        units.push(SCENARIOS.trim().replace("\"name\": \"", &format!("\"name\": \"{i}-")));
    }
    let units = units.join(",");

    let mut ws = workspace(&units);
    let parallel = ws.check().unwrap();
    ws.config_mut().parallel = false;
    let sequential = ws.check().unwrap();
    ws.config_mut().parallel = true;
    ws.config_mut().threads = Some(3);
    let pooled = ws.check().unwrap();

    let render = |reports: &[UnitReport]| -> Vec<String> {
        reports.iter().map(|r| format!("{} {:?}", r.name, r.outcome)).collect()
    };
    assert_eq!(parallel.len(), 24 * 6);
    assert_eq!(render(&parallel), render(&sequential));
    assert_eq!(render(&parallel), render(&pooled));
}

// ============================================================================
// Loading Errors
// ============================================================================

#[test]
fn test_unknown_variable() {
    let text = format!(
        "{{ {ENVIRONMENT}, \"units\": [{{ \"name\": \"u\", \"variables\": 1, \"constraints\": [
            {{ \"kind\": \"equality\", \"left\": \"?3\", \"right\": \"Int\" }} ] }}] }}"
    );
    match load_workspace(&text) {
        Err(DriverError::UnknownVariable { unit, var, declared }) => {
            assert_eq!(unit, "u");
            assert_eq!(var, "?3");
            assert_eq!(declared, 1);
        }
        other => panic!("expected unknown variable, got {:?}", other.err()),
    }
}

#[test]
fn test_variable_count_is_capped() {
    let text = format!(
        "{{ {ENVIRONMENT}, \"units\": [{{ \"name\": \"huge\", \"variables\": 4000000000, \"constraints\": [] }}] }}"
    );
    match load_workspace(&text) {
        Err(DriverError::TooManyVariables { unit, declared, max }) => {
            assert_eq!(unit, "huge");
            assert_eq!(declared, 4_000_000_000);
            assert_eq!(max, MAX_UNIT_VARIABLES);
        }
        other => panic!("expected too many variables, got {:?}", other.err()),
    }

    let text = format!(
        "{{ {ENVIRONMENT}, \"units\": [{{ \"name\": \"edge\", \"variables\": {MAX_UNIT_VARIABLES}, \"constraints\": [] }}] }}"
    );
    assert!(load_workspace(&text).is_ok());
}

#[test]
fn test_bad_type_notation() {
    let text = format!(
        "{{ {ENVIRONMENT}, \"units\": [{{ \"name\": \"u\", \"variables\": 1, \"constraints\": [
            {{ \"kind\": \"equality\", \"left\": \"?0\", \"right\": \"Array<Int\" }} ] }}] }}"
    );
    assert!(matches!(load_workspace(&text), Err(DriverError::Syntax { .. })));
}

#[test]
fn test_unknown_constraint_kind() {
    let text = r#"{ "units": [{ "name": "u", "constraints": [{ "kind": "teleport" }] }] }"#;
    assert!(matches!(load_workspace(text), Err(DriverError::Json(_))));
}

#[test]
fn test_refining_unknown_trait() {
    let text = r#"{ "environment": { "traits": [{ "name": "A", "refines": ["B"] }] } }"#;
    assert!(matches!(load_workspace(text), Err(DriverError::Table(_))));
}

#[test]
fn test_invalid_config() {
    let text = r#"{ "config": { "threads": 0 } }"#;
    assert!(matches!(load_workspace(text), Err(DriverError::Config(_))));
}

#[test]
fn test_unknown_literal_kind() {
    let text = r#"{ "environment": { "types": [{ "name": "Int" }], "literalDefaults": { "decimal": "Int" } } }"#;
    assert!(matches!(load_workspace(text), Err(DriverError::UnknownLiteral(k)) if k == "decimal"));
}
