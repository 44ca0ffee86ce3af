// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Literal, Ref, Term};
use crate::number::Number;

use std::rc::Rc;

pub fn ensure_number(args: &[Ref<Term>], idx: usize) -> Option<Number> {
    args.get(idx)?.as_number()
}

pub fn ensure_string(args: &[Ref<Term>], idx: usize) -> Option<&Rc<str>> {
    args.get(idx)?.as_str()
}

pub fn ensure_array(args: &[Ref<Term>], idx: usize) -> Option<&[Literal]> {
    match args.get(idx)?.as_literal()? {
        Literal::Array { values, .. } => Some(values.as_slice()),
        _ => None,
    }
}

pub fn ensure_string_collection(args: &[Ref<Term>], idx: usize) -> Option<Vec<&str>> {
    ensure_array(args, idx)?
        .iter()
        .map(|v| match v {
            Literal::String(s) => Some(s.as_ref()),
            _ => None,
        })
        .collect()
}
