// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;

use std::collections::BTreeMap;
use std::rc::Rc;

/// Placeholder name to the sub-term it matched.
pub type PatternBindings = BTreeMap<Rc<str>, Ref<Term>>;

/// Match `pattern` against `target`.
///
/// Placeholders bind the sub-term at their position; a placeholder used
/// more than once must bind structurally equal sub-terms. `Pattern` nodes
/// match any node whose kind name equals their class. Returns `None` when
/// the trees do not match.
pub fn match_pattern(pattern: &Ref<Term>, target: &Ref<Term>) -> Option<PatternBindings> {
    let mut bindings = PatternBindings::new();
    match matches(pattern, target, &mut bindings) {
        true => Some(bindings),
        false => None,
    }
}

fn matches(pattern: &Ref<Term>, target: &Ref<Term>, bindings: &mut PatternBindings) -> bool {
    if let Term::Placeholder(name) = pattern.as_ref() {
        return match bindings.get(name) {
            Some(bound) => bound == target,
            None => {
                bindings.insert(name.clone(), target.clone());
                true
            }
        };
    }

    if pattern.kind_name() != target.kind_name() {
        return false;
    }

    match (pattern.children(), target.children()) {
        (None, None) => match pattern.as_ref() {
            Term::Pattern { .. } => true,
            _ => pattern == target,
        },
        (Some(p), Some(t)) if p.len() == t.len() => p
            .iter()
            .zip(t.iter())
            .all(|(p, t)| matches(p, t, bindings)),
        _ => false,
    }
}
