// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Bindings, Literal, Ref, Term};
use crate::bindings::VariableTypes;
use crate::data::collection::mining_schema;
use crate::data::{
    assign, DataCollection, DataError, DataSchema, DefaultTypePromotionPolicy, EvaluationResults,
    SchemaEntry, SimpleDataSchema, TypePromotionPolicy,
};
use crate::types::Type;
use crate::value::Value;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Prefix of input fields in templates and mined constraints.
pub const INPUT: &str = "input";

/// Prefix of output fields in templates and mined constraints.
pub const OUTPUT: &str = "output";

/// One observation of a black-box system: what went in and what came out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InOutputEntry {
    pub input: Value,
    pub output: Value,
}

impl InOutputEntry {
    pub fn new(input: Value, output: Value) -> Self {
        Self { input, output }
    }

    // The record seen by constraints, with both sides as members.
    fn combined(&self) -> Value {
        let mut fields = BTreeMap::new();
        fields.insert(Rc::from(INPUT), self.input.clone());
        fields.insert(Rc::from(OUTPUT), self.output.clone());
        Value::from(fields)
    }
}

fn side_of(name: &str) -> Option<&'static str> {
    [INPUT, OUTPUT].into_iter().find(|side| {
        name.strip_prefix(side)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    })
}

// Only constraints relating the input to the output are of interest.
fn relates_input_to_output(term: &Ref<Term>) -> bool {
    let sides: BTreeSet<&str> = term
        .free_variables()
        .iter()
        .filter_map(|v| side_of(v))
        .collect();
    sides.len() == 2
}

/// Input/output pairs. Fields are addressed as `input.<path>` and
/// `output.<path>`, and mined constraints always use both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InOutputDataCollection {
    entries: Vec<InOutputEntry>,
}

impl InOutputDataCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<InOutputEntry>) -> Self {
        Self { entries }
    }

    /// Load a JSON array of `{"input": ..., "output": ...}` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::from_entries(serde_json::from_str(json)?))
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(Self::from_entries(serde_yaml::from_str(yaml)?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => bail!("Failed to read {}. {e}", path.as_ref().display()),
        };
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "yaml")]
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    pub fn entries(&self) -> &[InOutputEntry] {
        &self.entries
    }

    pub fn derive_schema(&self) -> Result<InOutputDataSchema, DataError> {
        self.derive_schema_with(&DefaultTypePromotionPolicy)
    }

    /// Input and output schemas derived separately.
    pub fn derive_schema_with(
        &self,
        policy: &dyn TypePromotionPolicy,
    ) -> Result<InOutputDataSchema, DataError> {
        let side = |values: Vec<&Value>| {
            let (schema, errors) = SimpleDataSchema::derive_from_values(values, policy);
            match errors.into_iter().next() {
                Some(e) => Err(e),
                None => Ok(schema),
            }
        };
        Ok(InOutputDataSchema::new(
            side(self.entries.iter().map(|e| &e.input).collect())?,
            side(self.entries.iter().map(|e| &e.output).collect())?,
        ))
    }

    fn bindings_for(entry: &InOutputEntry, names: &BTreeSet<Rc<str>>) -> Bindings {
        let record = entry.combined();
        names
            .iter()
            .filter_map(|name| {
                Literal::from_value(record.get_path(name)).map(|l| (name.clone(), Term::literal(l)))
            })
            .collect()
    }

    fn is_applicable(&self, term: &Ref<Term>) -> bool {
        let names = term.free_variables();
        self.entries
            .iter()
            .any(|e| Self::bindings_for(e, &names).len() == names.len())
    }
}

impl DataCollection for InOutputDataCollection {
    type Entry = InOutputEntry;

    fn empty_collection(&self) -> Self {
        Self::new()
    }

    fn add_entry(&mut self, entry: InOutputEntry) {
        self.entries.push(entry);
    }

    fn remove_entry(&mut self, entry: &InOutputEntry) {
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
        visitor: &mut dyn FnMut(&Bindings, &InOutputEntry),
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
        let schema = InOutputDataSchema::new(
            mining_schema(self.entries.iter().map(|e| &e.input)),
            mining_schema(self.entries.iter().map(|e| &e.output)),
        );

        let mut replaced = vec![];
        for template in terms.iter() {
            for term in schema.apply_to_term(template, variable_types, quantify_arrays) {
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

/// Schemas of the inputs and the outputs of a system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InOutputDataSchema {
    pub input: SimpleDataSchema,
    pub output: SimpleDataSchema,
}

impl InOutputDataSchema {
    pub fn new(input: SimpleDataSchema, output: SimpleDataSchema) -> Self {
        Self { input, output }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    // Both sides as nested objects of one schema.
    fn combined(&self) -> SimpleDataSchema {
        let mut schema = SimpleDataSchema::new();
        for (name, side) in [(INPUT, &self.input), (OUTPUT, &self.output)] {
            let mut entry = SchemaEntry::new(Type::Complex);
            entry.nested = Some(side.clone());
            schema.insert(name, entry);
        }
        schema
    }

    /// Check every pair against the input and output schemas. Findings name
    /// fields with their `input.` or `output.` prefix.
    pub fn evaluate(&self, data: &InOutputDataCollection) -> EvaluationResults {
        let mut results = EvaluationResults::default();
        for (idx, entry) in data.entries().iter().enumerate() {
            self.input
                .check_entry(&entry.input, idx, &format!("{INPUT}."), &mut results);
            self.output
                .check_entry(&entry.output, idx, &format!("{OUTPUT}."), &mut results);
        }
        results
    }
}

impl DataSchema for InOutputDataSchema {
    fn field_type(&self, path: &str) -> Option<Type> {
        self.combined().field_type(path)
    }

    fn apply_to_term(
        &self,
        template: &Ref<Term>,
        variable_types: &VariableTypes,
        quantify_arrays: bool,
    ) -> Vec<Ref<Term>> {
        let mut terms =
            assign::substitutions(template, variable_types, &self.combined(), quantify_arrays);
        terms.retain(relates_input_to_output);
        terms
    }
}
