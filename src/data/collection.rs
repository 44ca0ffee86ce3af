// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Bindings, Literal, Ref, Term};
use crate::bindings::VariableTypes;
use crate::data::{
    assign, DataCollection, DataError, DefaultTypePromotionPolicy, SimpleDataSchema,
    TypePromotionPolicy,
};
use crate::value::Value;

use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Result};
use log::{debug, warn};

/// Records held in memory, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleDataCollection {
    entries: Vec<Value>,
}

impl SimpleDataCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    /// Load a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value = Value::from_json_str(json)?;
        match value {
            Value::Array(items) => Ok(Self::from_values(items.as_ref().clone())),
            _ => bail!("expecting an array of records"),
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Value::from_json_file(path)? {
            Value::Array(items) => Ok(Self::from_values(items.as_ref().clone())),
            _ => bail!("expecting an array of records"),
        }
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Schema covering every record, with [`DefaultTypePromotionPolicy`].
    pub fn derive_schema(&self) -> Result<SimpleDataSchema, DataError> {
        self.derive_schema_with(&DefaultTypePromotionPolicy)
    }

    /// Fails on the first record that is not an object or the first field
    /// whose types `policy` cannot unify.
    pub fn derive_schema_with(
        &self,
        policy: &dyn TypePromotionPolicy,
    ) -> Result<SimpleDataSchema, DataError> {
        let (schema, errors) = SimpleDataSchema::derive_from_values(&self.entries, policy);
        match errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(schema),
        }
    }

    fn bindings_for(entry: &Value, names: &BTreeSet<Rc<str>>) -> Bindings {
        names
            .iter()
            .filter_map(|name| {
                Literal::from_value(entry.get_path(name)).map(|l| (name.clone(), Term::literal(l)))
            })
            .collect()
    }

    // Whether some entry has values for all free variables of the term.
    fn is_applicable(&self, term: &Ref<Term>) -> bool {
        let names = term.free_variables();
        self.entries
            .iter()
            .any(|e| Self::bindings_for(e, &names).len() == names.len())
    }
}

impl DataCollection for SimpleDataCollection {
    type Entry = Value;

    fn empty_collection(&self) -> Self {
        Self::new()
    }

    fn add_entry(&mut self, entry: Value) {
        self.entries.push(entry);
    }

    fn remove_entry(&mut self, entry: &Value) {
        if let Some(pos) = self.entries.iter().position(|e| e == entry) {
            self.entries.remove(pos);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn visit_entries(
        &self,
        names: &BTreeSet<Rc<str>>,
        visitor: &mut dyn FnMut(&Bindings, &Value),
    ) {
        for entry in &self.entries {
            visitor(&Self::bindings_for(entry, names), entry);
        }
    }

    fn apply_templates_to_terms(
        &self,
        terms: &mut Vec<Ref<Term>>,
        variable_types: &VariableTypes,
        quantify_arrays: bool,
    ) -> bool {
        let schema = mining_schema(&self.entries);
        let mut replaced = vec![];
        for template in terms.iter() {
            for term in assign::substitutions(template, variable_types, &schema, quantify_arrays) {
                if self.is_applicable(&term) {
                    replaced.push(term);
                } else {
                    debug!("no entry applies to {term}");
                }
            }
        }

        *terms = replaced;
        !terms.is_empty()
    }
}

/// Schema used to pick fields for substitution. Fields with types that
/// cannot be unified are left out instead of failing the whole collection.
pub(crate) fn mining_schema<'a>(entries: impl IntoIterator<Item = &'a Value>) -> SimpleDataSchema {
    let (schema, errors) =
        SimpleDataSchema::derive_from_values(entries, &DefaultTypePromotionPolicy);
    for e in errors {
        warn!("ignoring part of the data: {e}");
    }
    schema
}
