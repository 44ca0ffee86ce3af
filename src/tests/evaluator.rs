// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::term;
use crate::ast::*;

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

fn hash_of(t: &Ref<Term>) -> u64 {
    let mut h = DefaultHasher::new();
    t.hash(&mut h);
    h.finish()
}

#[test]
fn structural_equality_and_hashing() {
    let a = term("arrays.forAll(xs, ARRAY_ELEMENT < limit + 1)");
    let b = term("arrays.forAll(xs, ARRAY_ELEMENT < limit + 1)");
    assert!(!a.ptr_eq(&b));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let set: BTreeSet<_> = [a, b, term("x < 1")].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn idempotence() {
    for text in [
        "x && true",
        "!!(x < y)",
        "(x + 0) * (y ^ 0)",
        "x / 0",
        "arrays.index([1, 2], 7) > 0",
        "arrays.forAll([1, 2], ARRAY_ELEMENT > limit)",
        "string.subString(s, \"\") || false",
        "(a < a) || (b <= b)",
    ] {
        let once = term(text).evaluate();
        assert_eq!(once.evaluate(), once, "{text}");
    }
}

#[test]
fn absorption_laws() {
    for x in ["x", "x < y", "string.isEmail(mail)", "true", "false"] {
        let x = term(x);
        let t = Term::boolean(true);
        let f = Term::boolean(false);
        let and = |a: &Ref<Term>, b: &Ref<Term>| Term::binary(BinaryOp::And, a.clone(), b.clone());
        let or = |a: &Ref<Term>, b: &Ref<Term>| Term::binary(BinaryOp::Or, a.clone(), b.clone());

        assert_eq!(and(&x, &t).evaluate(), x.evaluate());
        assert_eq!(and(&x, &f).evaluate(), f);
        assert_eq!(or(&x, &f).evaluate(), x.evaluate());
        assert_eq!(or(&x, &t).evaluate(), t);
        assert_eq!(Term::not(Term::not(x.clone())).evaluate(), x.evaluate());
    }
}

#[test]
fn reflexive_comparisons() {
    for a in ["x", "x + y", "string.length(s)", "arrays.index(xs, 2)"] {
        let a = term(a);
        let cmp = |op| Term::binary(op, a.clone(), a.clone()).evaluate();
        assert_eq!(cmp(BinaryOp::LessThanOrEqual), Term::boolean(true));
        assert_eq!(cmp(BinaryOp::GreaterThanOrEqual), Term::boolean(true));
        assert_eq!(cmp(BinaryOp::Equal), Term::boolean(true));
        assert_eq!(cmp(BinaryOp::LessThan), Term::boolean(false));
        assert_eq!(cmp(BinaryOp::GreaterThan), Term::boolean(false));
    }
}

#[test]
fn empty_quantifiers() {
    for condition in ["ARRAY_ELEMENT > 0", "false", "x"] {
        let empty = term("[]");
        let condition = term(condition);
        assert_eq!(
            Term::for_all(empty.clone(), condition.clone()).evaluate(),
            Term::boolean(true)
        );
        assert_eq!(
            Term::exists(empty, condition).evaluate(),
            Term::boolean(false)
        );
    }
}

#[test]
fn evaluation_does_not_modify_shared_terms() {
    let shared = term("1 + 2");
    let parent = Term::binary(BinaryOp::LessThan, shared.clone(), Term::variable("x"));
    let other = Term::binary(BinaryOp::GreaterThan, shared.clone(), Term::variable("y"));

    assert_eq!(parent.evaluate(), term("3 < x"));
    assert_eq!(shared, term("1 + 2"));
    assert_eq!(other, term("(1 + 2) > y"));
}

#[test]
fn unchanged_terms_are_shared() {
    let t = term("x < y && string.isUrl(u)");
    assert!(t.evaluate().ptr_eq(&t));
}
