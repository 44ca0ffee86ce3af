// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub mod arrays;
mod ids;
pub mod objects;
pub mod strings;
pub mod time;
pub mod utils;

pub use ids::Builtin;

use crate::ast::{QuantifierKind, Ref, Term};

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Applies a builtin to already evaluated arguments.
///
/// Returns `None` when the arguments are not concrete enough.
pub type BuiltinFcn = fn(&[Ref<Term>]) -> Option<Ref<Term>>;

/// Builds a term from call arguments, or `None` when the argument shapes
/// are not accepted.
#[derive(Clone, Copy)]
pub enum FunctionFactory {
    Builtin(Builtin),
    Quantifier(QuantifierKind),
    Custom(fn(&[Ref<Term>]) -> Option<Ref<Term>>),
}

impl FunctionFactory {
    pub fn create(&self, args: &[Ref<Term>]) -> Option<Ref<Term>> {
        match self {
            FunctionFactory::Builtin(b) => match b.accepts(args) {
                true => Some(Term::function(*b, args.to_vec())),
                false => None,
            },
            FunctionFactory::Quantifier(kind) => match args {
                [array, condition] => Some(Ref::new(Term::Quantifier {
                    kind: *kind,
                    array: array.clone(),
                    condition: condition.clone(),
                })),
                _ => None,
            },
            FunctionFactory::Custom(f) => f(args),
        }
    }
}

#[rustfmt::skip]
lazy_static! {
    // Keyed by lower-case name.
    pub static ref BUILTINS: HashMap<String, Vec<FunctionFactory>> = {
	let mut m: HashMap<String, Vec<FunctionFactory>> = HashMap::new();

	for b in Builtin::ALL {
	    m.entry(b.name().to_lowercase()).or_default().push(FunctionFactory::Builtin(*b));
	}
	for kind in [QuantifierKind::ForAll, QuantifierKind::Exists] {
	    m.entry(kind.name().to_lowercase()).or_default().push(FunctionFactory::Quantifier(kind));
	}

	m
    };
}
