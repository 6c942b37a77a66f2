//! Property tests for the substitution store using proptest.
//!
//! Properties checked for arbitrary pairs of types:
//!
//! 1. Reflexivity: unify(t, t) always succeeds
//! 2. Consistency: after unify(a, b) succeeds, apply(a) == apply(b)
//! 3. Symmetry: unify(a, b) and unify(b, a) agree on outcome and bindings
//! 4. apply is idempotent
//! 5. restore returns the store to the snapshot state
//! 6. Occurs check: ?0 never unifies with a proper type containing ?0

use proptest::prelude::*;
use tyre_core::NameTable;
use tyre_types::{Substitution, Type, TypeVar};

const VARS: u32 = 4;

#[derive(Debug, Clone)]
enum Shape {
    Var(u32),
    Int,
    Bool,
    Array(Box<Shape>),
    Pair(Box<Shape>, Box<Shape>),
    Tuple(Vec<Shape>),
    Func(Vec<Shape>, Box<Shape>),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (0..VARS).prop_map(Shape::Var),
        Just(Shape::Int),
        Just(Shape::Bool),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::Array(Box::new(s))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Pair(Box::new(a), Box::new(b))),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Shape::Tuple),
            (prop::collection::vec(inner.clone(), 0..3), inner)
                .prop_map(|(params, ret)| Shape::Func(params, Box::new(ret))),
        ]
    })
}

fn build(shape: &Shape, names: &NameTable) -> Type {
    match shape {
        Shape::Var(i) => Type::Var(TypeVar(*i)),
        Shape::Int => Type::nominal(names.intern("Int")),
        Shape::Bool => Type::nominal(names.intern("Bool")),
        Shape::Array(e) => Type::generic(names.intern("Array"), vec![build(e, names)]),
        Shape::Pair(a, b) => Type::generic(names.intern("Pair"), vec![build(a, names), build(b, names)]),
        Shape::Tuple(es) => Type::Tuple(es.iter().map(|e| build(e, names)).collect()),
        Shape::Func(ps, r) => Type::function(ps.iter().map(|p| build(p, names)).collect(), build(r, names)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 65536, ..ProptestConfig::default() })]

    #[test]
    fn unify_is_reflexive(s in arb_shape()) {
        let names = NameTable::new();
        let t = build(&s, &names);
        let mut sub = Substitution::with_vars(VARS);
        prop_assert!(sub.unify(&t, &t).is_ok());
    }

    #[test]
    fn unify_makes_types_equal(a in arb_shape(), b in arb_shape()) {
        let names = NameTable::new();
        let (ta, tb) = (build(&a, &names), build(&b, &names));
        let mut sub = Substitution::with_vars(VARS);
        if sub.unify(&ta, &tb).is_ok() {
            prop_assert_eq!(sub.apply(&ta), sub.apply(&tb));
        }
    }

    #[test]
    fn unify_is_symmetric(a in arb_shape(), b in arb_shape()) {
        let names = NameTable::new();
        let (ta, tb) = (build(&a, &names), build(&b, &names));
        let mut left = Substitution::with_vars(VARS);
        let mut right = Substitution::with_vars(VARS);
        let r1 = left.unify(&ta, &tb);
        let r2 = right.unify(&tb, &ta);
        prop_assert_eq!(r1.is_ok(), r2.is_ok());
        if r1.is_ok() {
            for i in 0..VARS {
                let v = Type::Var(TypeVar(i));
                prop_assert_eq!(left.apply(&v), right.apply(&v));
            }
        }
    }

    #[test]
    fn apply_is_idempotent(a in arb_shape(), b in arb_shape()) {
        let names = NameTable::new();
        let (ta, tb) = (build(&a, &names), build(&b, &names));
        let mut sub = Substitution::with_vars(VARS);
        let _ = sub.unify(&ta, &tb);
        let once = sub.apply(&ta);
        prop_assert_eq!(sub.apply(&once), once);
    }

    #[test]
    fn restore_undoes_unification(a in arb_shape(), b in arb_shape()) {
        let names = NameTable::new();
        let (ta, tb) = (build(&a, &names), build(&b, &names));
        let mut sub = Substitution::with_vars(VARS);
        let snap = sub.snapshot();
        let _ = sub.unify(&ta, &tb);
        sub.restore(&snap);
        sub.commit(snap);
        for i in 0..VARS {
            prop_assert_eq!(sub.probe(TypeVar(i)), Type::Var(TypeVar(i)));
        }
        prop_assert_eq!(sub.var_count(), VARS as usize);
    }

    #[test]
    fn occurs_check_rejects_infinite_types(s in arb_shape()) {
        let names = NameTable::new();
        let inner = build(&s, &names);
        let wrapped = Type::generic(names.intern("Array"), vec![inner]);
        prop_assume!(wrapped.contains_var(TypeVar(0)));
        let mut sub = Substitution::with_vars(VARS);
        prop_assert!(sub.unify(&Type::Var(TypeVar(0)), &wrapped).is_err());
    }
}
