//! Benchmark harness for the constraint solver.
//!
//! Run with: cargo bench -p tyre_driver

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tyre_driver::{load_workspace, Workspace};

const ENVIRONMENT: &str = r#"
  "environment": {
    "traits": [{ "name": "Equatable" }, { "name": "Comparable", "refines": ["Equatable"] }],
    "types": [
      { "name": "Int", "conforms": ["Comparable"] },
      { "name": "Double", "conforms": ["Comparable"] },
      { "name": "Array", "params": ["T"], "members": [{ "name": "first", "decl": 1, "type": "T" }] }
    ]
  }
"#;

/// `?0 = ?1 = ... = ?n = Int`, written back to front so every step binds late.
fn equality_chain(n: u32) -> String {
    let mut constraints = Vec::new();
    for i in (0..n).rev() {
        constraints.push(format!(
            r#"{{ "kind": "equality", "left": "?{i}", "right": "?{}" }}"#,
            i + 1
        ));
    }
    constraints.push(format!(r#"{{ "kind": "equality", "left": "?{n}", "right": "Int" }}"#));
    format!(
        r#"{{ "name": "chain", "variables": {}, "constraints": [{}] }}"#,
        n + 1,
        constraints.join(",")
    )
}

/// `n` nested calls to an overloaded `f`, each argument fed by the previous result.
fn overload_chain(n: u32) -> String {
    let mut constraints = vec![r#"{ "kind": "equality", "left": "?0", "right": "Double" }"#.to_string()];
    for i in 0..n {
        let (arg, func, result) = (2 * i, 2 * i + 1, 2 * i + 2);
        constraints.push(format!(
            r#"{{ "kind": "overload", "type": "?{func}", "name": "f", "site": {i}, "at": {i}, "candidates": [
                {{ "decl": 10, "type": "(Int) -> Int" }},
                {{ "decl": 11, "type": "(Double) -> Double" }} ] }}"#
        ));
        constraints.push(format!(
            r#"{{ "kind": "equality", "left": "?{func}", "right": "(?{arg}) -> ?{result}" }}"#
        ));
    }
    format!(
        r#"{{ "name": "overloads", "variables": {}, "constraints": [{}] }}"#,
        2 * n + 1,
        constraints.join(",")
    )
}

fn workspace(units: &[String]) -> Workspace {
    let text = format!("{{ {ENVIRONMENT}, \"units\": [{}] }}", units.join(","));
    load_workspace(&text).unwrap()
}

// ============================================================================
// Single Unit Benchmarks
// ============================================================================

fn bench_equality_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("equality_chain");
    for n in [10, 100, 1000] {
        let ws = workspace(&[equality_chain(n)]);
        group.bench_with_input(BenchmarkId::from_parameter(n), &ws, |b, ws| {
            b.iter(|| black_box(ws.check_unit(&ws.units()[0])));
        });
    }
    group.finish();
}

fn bench_overload_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("overload_chain");
    for n in [4, 16, 64] {
        let ws = workspace(&[overload_chain(n)]);
        group.bench_with_input(BenchmarkId::from_parameter(n), &ws, |b, ws| {
            b.iter(|| black_box(ws.check_unit(&ws.units()[0])));
        });
    }
    group.finish();
}

// ============================================================================
// Workspace Benchmarks
// ============================================================================

fn bench_workspace(c: &mut Criterion) {
    let units: Vec<String> = (0..256)
        .map(|i| if i % 2 == 0 { overload_chain(8) } else { equality_chain(50) })
        .collect();
    let mut ws = workspace(&units);

    let mut group = c.benchmark_group("workspace");
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(ws.check().unwrap()));
    });
    ws.config_mut().parallel = false;
    group.bench_function("sequential", |b| {
        b.iter(|| black_box(ws.check().unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_equality_chain, bench_overload_chain, bench_workspace);
criterion_main!(benches);
