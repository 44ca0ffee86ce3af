// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::builtins::utils::{ensure_array, ensure_number};

pub fn length(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let array = ensure_array(args, 0)?;
    Some(Term::number(array.len()))
}

// Out of range indexes are not evaluable.
pub fn index(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let array = ensure_array(args, 0)?;
    let idx = ensure_number(args, 1)?.as_index()?;
    array.get(idx).cloned().map(Term::literal)
}

pub fn super_set(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let set = ensure_array(args, 0)?;
    let subset = ensure_array(args, 1)?;
    Some(Term::boolean(subset.iter().all(|v| set.contains(v))))
}
