// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Literal, Ref, Term};
use crate::builtins::utils::ensure_string;

/// Member lookup by dotted path. Missing members are not evaluable.
pub fn reference(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let object = match args.first()?.as_literal()? {
        Literal::Complex(v) => v,
        _ => return None,
    };
    let path = ensure_string(args, 1)?;
    Literal::from_value(object.get_path(path)).map(Term::literal)
}
