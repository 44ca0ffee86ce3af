// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::builtins::{FunctionFactory, BUILTINS};

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

/// Errors raised while resolving a function call by name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionCreateError {
    #[error("Could not create function: {0}. Unknown function name.")]
    Unknown(String),
    #[error("Could not create function: {name}. No definition accepts {arity} arguments of these kinds.")]
    NoMatch { name: String, arity: usize },
    #[error("Ambiguous function initialization. {first} vs. {second}")]
    Ambiguous {
        name: String,
        first: String,
        second: String,
    },
    #[error("Function registration failed: the name '{0}' is invalid (empty or whitespace-only names are not allowed).")]
    InvalidName(String),
}

/// Function factories by case-insensitive name.
///
/// Starts out with the built-in functions and quantifiers. Several
/// factories may share a name, one per accepted argument shape.
#[derive(Clone)]
pub struct FunctionRegistry {
    factories: HashMap<String, Vec<FunctionFactory>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            factories: BUILTINS.clone(),
        }
    }

    /// Add a factory for `name`. Factories already registered under the
    /// name are kept.
    pub fn register(
        &mut self,
        name: &str,
        factory: fn(&[Ref<Term>]) -> Option<Ref<Term>>,
    ) -> Result<(), FunctionCreateError> {
        if name.trim().is_empty() {
            return Err(FunctionCreateError::InvalidName(name.to_string()));
        }
        self.factories
            .entry(name.to_lowercase())
            .or_default()
            .push(FunctionFactory::Custom(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Build the term for a call of `name` with `args`.
    pub fn create(&self, name: &str, args: &[Ref<Term>]) -> Result<Ref<Term>, FunctionCreateError> {
        let factories = self
            .factories
            .get(&name.to_lowercase())
            .ok_or_else(|| FunctionCreateError::Unknown(name.to_string()))?;

        let mut created: Option<Ref<Term>> = None;
        for factory in factories {
            let Some(term) = factory.create(args) else {
                continue;
            };
            if let Some(first) = &created {
                return Err(FunctionCreateError::Ambiguous {
                    name: name.to_string(),
                    first: first.to_string(),
                    second: term.to_string(),
                });
            }
            created = Some(term);
        }

        match created {
            Some(term) => {
                debug!("created {term} for {name}");
                Ok(term)
            }
            None => Err(FunctionCreateError::NoMatch {
                name: name.to_string(),
                arity: args.len(),
            }),
        }
    }
}
