// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::types::Type;

use core::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// A finding attached to the node it was reported for.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub message: String,
    #[serde(serialize_with = "serialize_display")]
    pub node: Ref<Term>,
}

fn serialize_display<S: serde::Serializer>(node: &Ref<Term>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(node)
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.node)
    }
}

/// Sink for validation findings.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    messages: Vec<ValidationMessage>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, node: &Ref<Term>, message: String) {
        self.messages.push(ValidationMessage {
            severity: Severity::Error,
            message,
            node: node.clone(),
        });
    }

    pub fn warning(&mut self, node: &Ref<Term>, message: String) {
        self.messages.push(ValidationMessage {
            severity: Severity::Warning,
            message,
            node: node.clone(),
        });
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
    }

    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }
}

// Arity and operand type problems of a single node.
fn local_errors(term: &Term) -> Vec<String> {
    let mut errors = vec![];
    let (children, types) = match (term.children(), term.operand_types()) {
        (Some(c), Some(t)) => (c, t),
        _ => {
            if let Term::Variable(name) = term {
                if name.is_empty() {
                    errors.push("Variable without a name.".to_string());
                }
            }
            return errors;
        }
    };

    let required = match term {
        Term::Function { builtin, .. } => builtin.required_args(),
        _ => types.len(),
    };
    if children.len() < required {
        errors.push("Missing operand.".to_string());
        return errors;
    }
    if children.len() > types.len() {
        errors.push("Wrong number of operands.".to_string());
        return errors;
    }

    for (child, expected) in children.iter().zip(types.iter()) {
        let actual = child.return_type();
        if !actual.is_any() && !actual.can_assign_to(expected) {
            errors.push(format!(
                "Invalid operand type. Expected: {expected} but got: {actual}"
            ));
        }
    }
    errors
}

impl Ref<Term> {
    /// Structural and type well-formedness of the whole tree.
    pub fn validate(&self) -> bool {
        let mut context = ValidationContext::new();
        self.validate_with(&mut context);
        context.is_valid()
    }

    /// Validate children first, then report this node's problems.
    pub fn validate_with(&self, context: &mut ValidationContext) {
        if let Some(children) = self.children() {
            for c in &children {
                c.validate_with(context);
            }
        }

        for e in local_errors(self) {
            context.error(self, e);
        }

        match self.as_ref() {
            Term::Placeholder(name) => context.error(
                self,
                format!("Placeholder `{name}` can only be used in patterns."),
            ),
            Term::Pattern { class, .. } => context.error(
                self,
                format!("Pattern `{class}` can only be used in patterns."),
            ),
            Term::Quantifier {
                array, condition, ..
            } => validate_quantifier(self, array, condition, context),
            _ => (),
        }
    }
}

fn validate_quantifier(
    term: &Ref<Term>,
    array: &Ref<Term>,
    condition: &Ref<Term>,
    context: &mut ValidationContext,
) {
    let condition_types = match condition.infer_variable_types() {
        Ok(t) => t,
        Err(e) => {
            context.error(term, e.to_string());
            return;
        }
    };

    let element_type = match condition_types.get(ARRAY_ELEMENT) {
        Some(t) => t.clone(),
        None => {
            if !condition.variables().contains(ARRAY_ELEMENT) {
                context.warning(
                    term,
                    "Condition does not refer to the array element.".to_string(),
                );
            }
            Type::Any
        }
    };

    if let Term::Literal(Literal::Array {
        element_type: declared,
        values,
    }) = array.evaluate().as_ref()
    {
        if !values.is_empty() && !declared.is_compatible(&element_type) {
            context.error(
                term,
                format!(
                    "Array element type {declared} does not match the condition's element type {element_type}."
                ),
            );
        }
    }
}
