// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::constraint::Constraint;
use crate::data::{DataCollection, DataSchema};

use std::collections::BTreeSet;

use log::{debug, info, warn};

/// Produces concrete candidate constraints from templates.
pub trait ConstraintMiner {
    fn possible_constraints(&self, templates: &[Ref<Term>]) -> BTreeSet<Constraint>;
}

// Degenerate terms such as `a < a` reduce to a literal or a variable.
fn keep_candidate(term: Ref<Term>, out: &mut BTreeSet<Constraint>) {
    if !term.evaluate().is_operator() {
        debug!("dropping degenerate candidate {term}");
        return;
    }
    match Constraint::new(term) {
        Ok(c) => {
            out.insert(c);
        }
        Err(e) => debug!("dropping candidate: {e}"),
    }
}

/// Substitutes template variables with fields observed in the data.
pub struct ConstraintMinerFromData<'a, D: DataCollection> {
    data: &'a D,
    quantify_arrays: bool,
}

impl<'a, D: DataCollection> ConstraintMinerFromData<'a, D> {
    pub fn new(data: &'a D) -> Self {
        Self {
            data,
            quantify_arrays: true,
        }
    }

    pub fn with_array_quantification(mut self, quantify_arrays: bool) -> Self {
        self.quantify_arrays = quantify_arrays;
        self
    }
}

impl<D: DataCollection> ConstraintMiner for ConstraintMinerFromData<'_, D> {
    fn possible_constraints(&self, templates: &[Ref<Term>]) -> BTreeSet<Constraint> {
        let mut constraints = BTreeSet::new();
        for template in templates {
            let variable_types = match template.infer_variable_types() {
                Ok(t) => t,
                Err(e) => {
                    warn!("skipping template {template}: {e}");
                    continue;
                }
            };

            let mut terms = vec![template.clone()];
            if !self
                .data
                .apply_templates_to_terms(&mut terms, &variable_types, self.quantify_arrays)
            {
                debug!("template {template} does not apply to the data");
                continue;
            }

            let before = constraints.len();
            let candidates = terms.len();
            for term in terms {
                keep_candidate(term, &mut constraints);
            }
            info!(
                "template {template}: {candidates} candidates, {} new constraints",
                constraints.len() - before
            );
        }
        constraints
    }
}

/// Substitutes template variables with type compatible schema fields.
pub struct ConstraintMinerFromSchema<'a, S: DataSchema> {
    schema: &'a S,
    quantify_arrays: bool,
}

impl<'a, S: DataSchema> ConstraintMinerFromSchema<'a, S> {
    pub fn new(schema: &'a S) -> Self {
        Self {
            schema,
            quantify_arrays: true,
        }
    }

    pub fn with_array_quantification(mut self, quantify_arrays: bool) -> Self {
        self.quantify_arrays = quantify_arrays;
        self
    }
}

impl<S: DataSchema> ConstraintMiner for ConstraintMinerFromSchema<'_, S> {
    fn possible_constraints(&self, templates: &[Ref<Term>]) -> BTreeSet<Constraint> {
        let mut constraints = BTreeSet::new();
        for template in templates {
            let variable_types = match template.infer_variable_types() {
                Ok(t) => t,
                Err(e) => {
                    warn!("skipping template {template}: {e}");
                    continue;
                }
            };

            let terms = self
                .schema
                .apply_to_term(template, &variable_types, self.quantify_arrays);
            let before = constraints.len();
            let candidates = terms.len();
            for term in terms {
                keep_candidate(term, &mut constraints);
            }
            info!(
                "template {template}: {candidates} candidates, {} new constraints",
                constraints.len() - before
            );
        }
        constraints
    }
}
