// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod ast;
mod bindings;
mod builtins;
mod config;
mod constraint;
mod data;
mod engine;
mod evaluator;
mod lexer;
mod miner;
mod number;
mod parser;
mod pattern;
mod policy;
mod registry;
mod template;
mod types;
mod validation;
mod value;

pub use ast::{Literal, Ref, Term};
pub use config::MinerConfig;
pub use constraint::{Constraint, ConstraintError, ConstraintResults};
pub use data::{
    DataCollection, DataError, DataSchema, DefaultArrayTypePromotionPolicy,
    DefaultTypePromotionPolicy, EvaluationFinding, EvaluationResults, InOutputDataCollection,
    InOutputDataSchema, InOutputEntry, NoTypePromotion, SchemaEntry, SimpleDataCollection,
    SimpleDataSchema, TypePromotionPolicy,
};
pub use engine::{Engine, InvalidTemplate, MinedConstraint};
pub use miner::{ConstraintMiner, ConstraintMinerFromData, ConstraintMinerFromSchema};
pub use number::Number;
pub use policy::Policy;
pub use registry::{FunctionCreateError, FunctionRegistry};
pub use template::{ConstraintTemplate, ConstraintTemplateFile, GroupDefinition};
pub use types::Type;
pub use value::Value;

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::ast::*;
    pub use crate::bindings::*;
    pub use crate::builtins::{Builtin, FunctionFactory};
    pub use crate::lexer::*;
    pub use crate::parser::*;
    pub use crate::pattern::*;
    pub use crate::validation::*;
}

#[cfg(test)]
mod tests;
