// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Bindings, Ref, Term, ARRAY_ELEMENT};
use crate::bindings::VariableTypes;
use crate::builtins::Builtin;
use crate::data::SimpleDataSchema;
use crate::types::Type;

use std::collections::BTreeSet;
use std::rc::Rc;

// A term that may take the place of a template variable.
struct Candidate {
    term: Ref<Term>,
    ty: Type,
    element: bool,
}

/// All substitutions of the template's variables by fields of `schema`.
///
/// Variables are replaced by field variables. Every variable gets a field
/// and no field is used twice. With `quantify_arrays`, elements of array
/// fields may be used as well, in which case the result is wrapped in
/// `arrays.forAll` over the array field.
pub(crate) fn substitutions(
    template: &Ref<Term>,
    variable_types: &VariableTypes,
    schema: &SimpleDataSchema,
    quantify_arrays: bool,
) -> Vec<Ref<Term>> {
    let variables: Vec<(Rc<str>, Type)> = variable_types
        .iter()
        .filter(|(name, _)| name.as_ref() != ARRAY_ELEMENT)
        .map(|(name, ty)| (name.clone(), ty.clone()))
        .collect();
    if variables.is_empty() {
        return vec![];
    }

    let fields = schema.flatten();
    let top: Vec<Candidate> = fields
        .iter()
        .map(|(path, entry)| Candidate {
            term: Term::variable(path),
            ty: entry.ty.clone(),
            element: false,
        })
        .collect();

    // Element candidates never fill these.
    let mut captured = BTreeSet::new();
    quantified_variables(template, &mut captured);

    let mut results = BTreeSet::new();
    for bindings in assignments(&variables, &top, false, &captured) {
        results.insert(template.substitute(&bindings));
    }

    if quantify_arrays {
        for (path, entry) in &fields {
            let element_type = match entry.ty.element_type() {
                Some(t) => t,
                None => continue,
            };

            let mut candidates = element_candidates(element_type, entry.nested.as_ref());
            if candidates.is_empty() {
                continue;
            }
            candidates.extend(top.iter().map(|c| Candidate {
                term: c.term.clone(),
                ty: c.ty.clone(),
                element: false,
            }));

            let array = Term::variable(path);
            for bindings in assignments(&variables, &candidates, true, &captured) {
                results.insert(Term::for_all(array.clone(), template.substitute(&bindings)));
            }
        }
    }

    results.into_iter().collect()
}

fn element_candidates(element_type: &Type, nested: Option<&SimpleDataSchema>) -> Vec<Candidate> {
    let element = Term::variable(ARRAY_ELEMENT);
    match (element_type, nested) {
        (Type::Complex, Some(nested)) => nested
            .flatten()
            .into_iter()
            .map(|(path, entry)| Candidate {
                term: Term::function(
                    Builtin::ObjectReference,
                    vec![element.clone(), Term::string(&path)],
                ),
                ty: entry.ty.clone(),
                element: true,
            })
            .collect(),
        (Type::Any, _) => vec![],
        (ty, _) => vec![Candidate {
            term: element,
            ty: ty.clone(),
            element: true,
        }],
    }
}

// Variables occurring in the condition of a quantifier of the template.
// The quantifier rebinds ARRAY_ELEMENT there, so an outer element would be
// captured by it.
fn quantified_variables(term: &Ref<Term>, out: &mut BTreeSet<Rc<str>>) {
    if let Term::Quantifier {
        array, condition, ..
    } = term.as_ref()
    {
        out.extend(condition.free_variables());
        quantified_variables(array, out);
        return;
    }
    for child in term.children().iter().flatten() {
        quantified_variables(child, out);
    }
}

struct Search<'a> {
    candidates: &'a [Candidate],
    require_element: bool,
    captured: &'a BTreeSet<Rc<str>>,
    used: Vec<bool>,
    current: Bindings,
    out: Vec<Bindings>,
}

// Injective, complete assignments of candidates to variables.
fn assignments(
    variables: &[(Rc<str>, Type)],
    candidates: &[Candidate],
    require_element: bool,
    captured: &BTreeSet<Rc<str>>,
) -> Vec<Bindings> {
    let mut search = Search {
        candidates,
        require_element,
        captured,
        used: vec![false; candidates.len()],
        current: Bindings::new(),
        out: vec![],
    };
    search.assign(variables, false);
    search.out
}

impl Search<'_> {
    fn assign(&mut self, variables: &[(Rc<str>, Type)], uses_element: bool) {
        let Some(((name, ty), rest)) = variables.split_first() else {
            if uses_element || !self.require_element {
                self.out.push(self.current.clone());
            }
            return;
        };

        let candidates = self.candidates;
        for (idx, candidate) in candidates.iter().enumerate() {
            if self.used[idx]
                || !candidate.ty.can_assign_to(ty)
                || (candidate.element && self.captured.contains(name))
            {
                continue;
            }
            self.used[idx] = true;
            self.current.insert(name.clone(), candidate.term.clone());
            self.assign(rest, uses_element || candidate.element);
            self.current.remove(name);
            self.used[idx] = false;
        }
    }
}
