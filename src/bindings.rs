// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::types::Type;

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use thiserror::Error;

/// Inferred type of every free variable of a term.
pub type VariableTypes = BTreeMap<Rc<str>, Type>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Variable {name} has inconsistent types: {first} and {second}")]
    Conflict {
        name: Rc<str>,
        first: Type,
        second: Type,
    },
}

impl Ref<Term> {
    /// Replace variables by the terms bound to them.
    ///
    /// Unbound variables are replaced by fresh variables of the same name.
    /// Quantifier conditions never see an outer binding of ARRAY_ELEMENT.
    pub fn substitute(&self, bindings: &Bindings) -> Ref<Term> {
        match self.as_ref() {
            Term::Variable(name) => match bindings.get(name) {
                Some(t) => t.clone(),
                None => Term::variable(name),
            },
            Term::Literal(_) | Term::Placeholder(_) => self.clone(),
            Term::Unary { op, operand } => Ref::new(Term::Unary {
                op: *op,
                operand: operand.substitute(bindings),
            }),
            Term::Binary { op, left, right } => {
                Term::binary(*op, left.substitute(bindings), right.substitute(bindings))
            }
            Term::Function { builtin, args } => Term::function(
                *builtin,
                args.iter().map(|a| a.substitute(bindings)).collect(),
            ),
            Term::Quantifier {
                kind,
                array,
                condition,
            } => {
                let condition = match bindings.contains_key(ARRAY_ELEMENT) {
                    true => {
                        let mut inner = bindings.clone();
                        inner.remove(ARRAY_ELEMENT);
                        condition.substitute(&inner)
                    }
                    false => condition.substitute(bindings),
                };
                Ref::new(Term::Quantifier {
                    kind: *kind,
                    array: array.substitute(bindings),
                    condition,
                })
            }
            Term::Pattern { class, children } => Ref::new(Term::Pattern {
                class: class.clone(),
                children: children
                    .as_ref()
                    .map(|c| c.iter().map(|t| t.substitute(bindings)).collect()),
            }),
        }
    }

    /// Same term with variable `from` renamed to `to`.
    pub fn rename(&self, from: &str, to: &str) -> Ref<Term> {
        let mut bindings = Bindings::new();
        bindings.insert(from.into(), Term::variable(to));
        self.substitute(&bindings)
    }

    /// Names of all variables in the term, ARRAY_ELEMENT included.
    pub fn variables(&self) -> BTreeSet<Rc<str>> {
        let mut names = BTreeSet::new();
        collect_variables(self, false, &mut names);
        names
    }

    /// Names of variables not bound by an enclosing quantifier.
    pub fn free_variables(&self) -> BTreeSet<Rc<str>> {
        let mut names = BTreeSet::new();
        collect_variables(self, true, &mut names);
        names
    }

    /// Infer the type of every variable from the positions it is used in.
    ///
    /// A variable required to have two incompatible types is an error.
    /// ARRAY_ELEMENT is local to a quantifier and is not reported for it,
    /// but the quantified array is typed from the element's use.
    pub fn infer_variable_types(&self) -> Result<VariableTypes, InferenceError> {
        let mut types = VariableTypes::new();
        infer(self, &mut types)?;
        Ok(types)
    }
}

fn collect_variables(term: &Ref<Term>, free_only: bool, names: &mut BTreeSet<Rc<str>>) {
    match term.as_ref() {
        Term::Variable(name) => {
            names.insert(name.clone());
        }
        Term::Quantifier {
            array, condition, ..
        } if free_only => {
            collect_variables(array, free_only, names);
            let mut inner = BTreeSet::new();
            collect_variables(condition, free_only, &mut inner);
            inner.remove(ARRAY_ELEMENT);
            names.extend(inner);
        }
        _ => {
            if let Some(children) = term.children() {
                for c in &children {
                    collect_variables(c, free_only, names);
                }
            }
        }
    }
}

fn record(types: &mut VariableTypes, name: &Rc<str>, ty: Type) -> Result<(), InferenceError> {
    match types.get(name) {
        None => {
            types.insert(name.clone(), ty);
        }
        Some(existing) => match existing.narrow(&ty) {
            Some(narrowed) => {
                types.insert(name.clone(), narrowed);
            }
            None => {
                return Err(InferenceError::Conflict {
                    name: name.clone(),
                    first: existing.clone(),
                    second: ty,
                })
            }
        },
    }
    Ok(())
}

fn merge(types: &mut VariableTypes, other: VariableTypes) -> Result<(), InferenceError> {
    for (name, ty) in other {
        record(types, &name, ty)?;
    }
    Ok(())
}

fn infer(term: &Ref<Term>, types: &mut VariableTypes) -> Result<(), InferenceError> {
    match term.as_ref() {
        Term::Quantifier {
            array, condition, ..
        } => {
            let mut condition_types = VariableTypes::new();
            infer(condition, &mut condition_types)?;
            let element_type = condition_types.remove(ARRAY_ELEMENT).unwrap_or(Type::Any);

            if let Term::Variable(name) = array.as_ref() {
                record(types, name, Type::array_of(element_type))?;
            }
            infer(array, types)?;
            merge(types, condition_types)
        }
        _ => {
            let (children, operand_types) = match (term.children(), term.operand_types()) {
                (Some(c), Some(t)) => (c, t),
                _ => return Ok(()),
            };
            for (idx, child) in children.iter().enumerate() {
                if let Term::Variable(name) = child.as_ref() {
                    let ty = operand_types.get(idx).cloned().unwrap_or(Type::Any);
                    record(types, name, ty)?;
                }
                infer(child, types)?;
            }
            Ok(())
        }
    }
}
