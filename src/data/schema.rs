// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Literal, Ref, Term};
use crate::bindings::VariableTypes;
use crate::data::assign;
use crate::data::promotion::{unify_types, DefaultTypePromotionPolicy, TypePromotionPolicy};
use crate::data::{DataError, DataSchema};
use crate::types::Type;
use crate::value::Value;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

fn is_true() -> bool {
    true
}

fn is_mandatory(b: &bool) -> bool {
    *b
}

/// Type of one field and, for objects and arrays of objects, the schema of
/// the nested fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(rename = "type")]
    pub ty: Type,

    #[serde(default = "is_true", skip_serializing_if = "is_mandatory")]
    pub mandatory: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<SimpleDataSchema>,
}

impl SchemaEntry {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            mandatory: true,
            nested: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimpleDataSchema {
    fields: BTreeMap<String, SchemaEntry>,
}

impl SimpleDataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => bail!("Failed to read {}. {e}", path.as_ref().display()),
        };
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "yaml")]
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    pub fn insert(&mut self, name: &str, entry: SchemaEntry) {
        self.fields.insert(name.to_string(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, SchemaEntry> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Schema of a single record.
    ///
    /// Fields without a literal form, such as `null`, are left out. Objects
    /// in an array field are unified with [`DefaultTypePromotionPolicy`].
    pub fn derive_from_value(value: &Value) -> Result<Self, DataError> {
        Self::derive_from_value_with(value, &DefaultTypePromotionPolicy)
    }

    pub fn derive_from_value_with(
        value: &Value,
        policy: &dyn TypePromotionPolicy,
    ) -> Result<Self, DataError> {
        let mut conflicts = vec![];
        let schema = Self::derive(value, policy, "", &mut conflicts)?;
        first_error(schema, conflicts)
    }

    /// Schema covering every record in `values`.
    ///
    /// Records that are not objects and fields whose types cannot be
    /// unified are left out of the schema and returned as errors.
    pub fn derive_from_values<'a>(
        values: impl IntoIterator<Item = &'a Value>,
        policy: &dyn TypePromotionPolicy,
    ) -> (Self, Vec<DataError>) {
        let mut errors = vec![];
        let mut schema: Option<Self> = None;
        for value in values {
            let derived = match Self::derive(value, policy, "", &mut errors) {
                Ok(d) => d,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            schema = Some(match schema {
                Some(s) => s.merge(&derived, policy, "", &mut errors),
                None => derived,
            });
        }

        // A later record may bring a dropped field back.
        let mut schema = schema.unwrap_or_default();
        for e in &errors {
            if let DataError::InconsistentTypes { field, .. } = e {
                schema.remove_path(field);
            }
        }
        (schema, errors)
    }

    fn derive(
        value: &Value,
        policy: &dyn TypePromotionPolicy,
        prefix: &str,
        conflicts: &mut Vec<DataError>,
    ) -> Result<Self, DataError> {
        let object = match value {
            Value::Object(o) => o,
            _ => return Err(DataError::NotAnObject(value.to_string())),
        };

        let mut schema = Self::new();
        for (name, field) in object.iter() {
            let Some(literal) = Literal::from_value(field) else {
                continue;
            };
            let path = format!("{prefix}{name}.");
            let mut entry = SchemaEntry::new(literal.return_type());
            entry.nested = match field {
                Value::Object(_) => Some(Self::derive(field, policy, &path, conflicts)?),
                Value::Array(items) => {
                    Self::derive_from_elements(items, policy, &path, conflicts)?
                }
                _ => None,
            };
            schema.fields.insert(name.to_string(), entry);
        }
        Ok(schema)
    }

    // Unified schema of the objects in an array.
    fn derive_from_elements(
        items: &[Value],
        policy: &dyn TypePromotionPolicy,
        prefix: &str,
        conflicts: &mut Vec<DataError>,
    ) -> Result<Option<Self>, DataError> {
        let mut schema: Option<Self> = None;
        for item in items.iter().filter(|i| matches!(i, Value::Object(_))) {
            let derived = Self::derive(item, policy, prefix, conflicts)?;
            schema = Some(match schema {
                Some(s) => s.merge(&derived, policy, prefix, conflicts),
                None => derived,
            });
        }
        Ok(schema)
    }

    /// Merge two schemas describing records of the same collection, with
    /// [`DefaultTypePromotionPolicy`].
    ///
    /// Fields present in only one of them become optional.
    pub fn unify(&self, other: &Self) -> Result<Self, DataError> {
        self.unify_with(other, &DefaultTypePromotionPolicy)
    }

    pub fn unify_with(
        &self,
        other: &Self,
        policy: &dyn TypePromotionPolicy,
    ) -> Result<Self, DataError> {
        let mut conflicts = vec![];
        let merged = self.merge(other, policy, "", &mut conflicts);
        first_error(merged, conflicts)
    }

    // Fields whose types do not unify are dropped and reported.
    fn merge(
        &self,
        other: &Self,
        policy: &dyn TypePromotionPolicy,
        prefix: &str,
        conflicts: &mut Vec<DataError>,
    ) -> Self {
        let optional = |entry: &SchemaEntry| SchemaEntry {
            mandatory: false,
            ..entry.clone()
        };

        let mut fields = BTreeMap::new();
        for (name, entry) in &self.fields {
            let Some(o) = other.fields.get(name) else {
                fields.insert(name.clone(), optional(entry));
                continue;
            };
            let path = format!("{prefix}{name}");
            let Some(ty) = unify_types(&entry.ty, &o.ty, policy) else {
                conflicts.push(DataError::InconsistentTypes {
                    field: path,
                    first: entry.ty.clone(),
                    second: o.ty.clone(),
                });
                continue;
            };
            let nested = match (&entry.nested, &o.nested) {
                (Some(x), Some(y)) => Some(x.merge(y, policy, &format!("{path}."), conflicts)),
                (Some(x), None) | (None, Some(x)) => Some(x.clone()),
                (None, None) => None,
            };
            fields.insert(
                name.clone(),
                SchemaEntry {
                    ty,
                    mandatory: entry.mandatory && o.mandatory,
                    nested,
                },
            );
        }
        for (name, entry) in &other.fields {
            if !self.fields.contains_key(name) {
                fields.insert(name.clone(), optional(entry));
            }
        }
        Self { fields }
    }

    /// Remove a (dotted) field path. Missing paths are ignored.
    pub fn remove_path(&mut self, path: &str) {
        if self.fields.remove(path).is_some() {
            return;
        }
        if let Some((head, rest)) = path.split_once('.') {
            if let Some(nested) = self.fields.get_mut(head).and_then(|e| e.nested.as_mut()) {
                nested.remove_path(rest);
            }
        }
    }

    /// Every field path with its entry, nested object fields included
    /// under dotted names. Fields of array elements are not included.
    pub fn flatten(&self) -> Vec<(String, &SchemaEntry)> {
        let mut out = vec![];
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a SchemaEntry)>) {
        for (name, entry) in &self.fields {
            let path = format!("{prefix}{name}");
            if let (Type::Complex, Some(nested)) = (&entry.ty, &entry.nested) {
                nested.flatten_into(&format!("{path}."), out);
            }
            out.push((path, entry));
        }
    }
}

fn first_error<T>(value: T, errors: Vec<DataError>) -> Result<T, DataError> {
    match errors.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(value),
    }
}

impl DataSchema for SimpleDataSchema {
    fn field_type(&self, path: &str) -> Option<Type> {
        self.flatten()
            .into_iter()
            .find(|(p, _)| p == path)
            .map(|(_, e)| e.ty.clone())
    }

    fn apply_to_term(
        &self,
        template: &Ref<Term>,
        variable_types: &VariableTypes,
        quantify_arrays: bool,
    ) -> Vec<Ref<Term>> {
        assign::substitutions(template, variable_types, self, quantify_arrays)
    }
}
