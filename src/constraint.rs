// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::data::DataCollection;
use crate::types::Type;

use core::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Constraint term needs to return boolean, instead of: {found}")]
    NonBoolean { found: Type },
}

/// A boolean term treated as a candidate invariant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Constraint {
    term: Ref<Term>,
}

impl Constraint {
    pub fn new(term: Ref<Term>) -> Result<Self, ConstraintError> {
        match term.return_type() {
            Type::Boolean => Ok(Self { term }),
            found => Err(ConstraintError::NonBoolean { found }),
        }
    }

    pub fn term(&self) -> &Ref<Term> {
        &self.term
    }

    /// Classify every entry of `data` as valid, invalid or not applicable.
    ///
    /// An entry is not applicable when one of the constraint's free
    /// variables has no value in it or when the term does not reduce to a
    /// boolean for it.
    pub fn apply_data<D: DataCollection>(&self, data: &D) -> ConstraintResults<D> {
        let names = self.term.free_variables();
        let mut results = ConstraintResults::new(self.clone(), data);

        data.visit_entries(&names, &mut |bindings, entry| {
            if !names.iter().all(|n| bindings.contains_key(n)) {
                results.inapplicable.add_entry(entry.clone());
                return;
            }

            match self.term.substitute(bindings).evaluate().as_bool() {
                Some(true) => results.valid.add_entry(entry.clone()),
                Some(false) => {
                    results.invalid.add_entry(entry.clone());
                    results.applicable.remove_entry(entry);
                }
                None => results.inapplicable.add_entry(entry.clone()),
            }
        });

        results
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.term)
    }
}

/// Outcome of applying a constraint to a data collection.
#[derive(Debug, Clone)]
pub struct ConstraintResults<D> {
    constraint: Constraint,
    data: D,
    valid: D,
    invalid: D,
    inapplicable: D,
    // The data without the counter examples.
    applicable: D,
}

impl<D: DataCollection> ConstraintResults<D> {
    fn new(constraint: Constraint, data: &D) -> Self {
        Self {
            constraint,
            data: data.clone_collection(),
            valid: data.empty_collection(),
            invalid: data.empty_collection(),
            inapplicable: data.empty_collection(),
            applicable: data.clone_collection(),
        }
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn valid_data(&self) -> &D {
        &self.valid
    }

    pub fn invalid_data(&self) -> &D {
        &self.invalid
    }

    pub fn inapplicable_data(&self) -> &D {
        &self.inapplicable
    }

    pub fn applicable_data(&self) -> &D {
        &self.applicable
    }

    pub fn number_of_valid_data_entries(&self) -> usize {
        self.valid.len()
    }

    pub fn number_of_violations(&self) -> usize {
        self.invalid.len()
    }

    pub fn number_of_inapplicable_data_entries(&self) -> usize {
        self.inapplicable.len()
    }

    pub fn found_counter_example(&self) -> bool {
        self.number_of_violations() > 0
    }

    pub fn application_rate(&self) -> f64 {
        self.rate(self.number_of_valid_data_entries())
    }

    pub fn violation_rate(&self) -> f64 {
        self.rate(self.number_of_violations())
    }

    fn rate(&self, count: usize) -> f64 {
        match self.data.len() {
            0 => 0.0,
            total => count as f64 / total as f64,
        }
    }
}
