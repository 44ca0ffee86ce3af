// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Data the miner learns from: record collections and type schemas.

mod assign;
mod collection;
mod evaluation;
mod in_output;
mod promotion;
mod schema;

pub use collection::SimpleDataCollection;
pub use evaluation::{EvaluationFinding, EvaluationResults};
pub use in_output::{InOutputDataCollection, InOutputDataSchema, InOutputEntry, INPUT, OUTPUT};
pub use promotion::{
    DefaultArrayTypePromotionPolicy, DefaultTypePromotionPolicy, NoTypePromotion,
    TypePromotionPolicy,
};
pub use schema::{SchemaEntry, SimpleDataSchema};

use crate::ast::{Bindings, Ref, Term};
use crate::bindings::VariableTypes;
use crate::types::Type;

use std::collections::BTreeSet;
use std::rc::Rc;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Field {field} has inconsistent types: {first} and {second}")]
    InconsistentTypes {
        field: String,
        first: Type,
        second: Type,
    },
    #[error("Data entry is not an object: {0}")]
    NotAnObject(String),
}

/// An ordered collection of example records.
pub trait DataCollection: Clone {
    type Entry: Clone + PartialEq;

    /// Independent copy of the collection.
    fn clone_collection(&self) -> Self {
        self.clone()
    }

    /// A collection of the same kind without entries.
    fn empty_collection(&self) -> Self;

    fn add_entry(&mut self, entry: Self::Entry);

    /// Remove one entry equal to `entry`, if any.
    fn remove_entry(&mut self, entry: &Self::Entry);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call `visitor` for each entry with bindings for those of `names`
    /// the entry has a value for.
    fn visit_entries(
        &self,
        names: &BTreeSet<Rc<str>>,
        visitor: &mut dyn FnMut(&Bindings, &Self::Entry),
    );

    /// Replace each template in `terms` by its concrete substitutions.
    ///
    /// Returns whether any substitution applied.
    fn apply_templates_to_terms(
        &self,
        terms: &mut Vec<Ref<Term>>,
        variable_types: &VariableTypes,
        quantify_arrays: bool,
    ) -> bool;
}

/// Field names and types, without concrete values.
pub trait DataSchema {
    /// Type of a (dotted) field path.
    fn field_type(&self, path: &str) -> Option<Type>;

    /// Every substitution of `template`'s variables by type compatible
    /// fields.
    fn apply_to_term(
        &self,
        template: &Ref<Term>,
        variable_types: &VariableTypes,
        quantify_arrays: bool,
    ) -> Vec<Ref<Term>>;
}
