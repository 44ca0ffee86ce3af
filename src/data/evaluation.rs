// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::Literal;
use crate::data::SimpleDataSchema;
use crate::types::Type;
use crate::value::Value;

use core::fmt;

use serde::Serialize;

/// A record that does not conform to a schema.
///
/// `entry` is the position of the record in its collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EvaluationFinding {
    #[serde(rename_all = "camelCase")]
    MissingMandatoryValue { field: String, entry: usize },

    #[serde(rename_all = "camelCase")]
    IncompatibleTypes {
        field: String,
        entry: usize,
        expected: Type,
        found: Type,
    },
}

impl EvaluationFinding {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingMandatoryValue { field, .. } | Self::IncompatibleTypes { field, .. } => {
                field
            }
        }
    }

    pub fn entry(&self) -> usize {
        match self {
            Self::MissingMandatoryValue { entry, .. } | Self::IncompatibleTypes { entry, .. } => {
                *entry
            }
        }
    }
}

impl fmt::Display for EvaluationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMandatoryValue { field, .. } => {
                write!(f, "{field}: Mandatory value is missing in data.")
            }
            Self::IncompatibleTypes {
                field,
                expected,
                found,
                ..
            } => write!(
                f,
                "{field}: Data has an incompatible type: {found} cannot be assigned to: {expected}"
            ),
        }
    }
}

/// Findings of checking a collection against a schema, in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationResults {
    findings: Vec<EvaluationFinding>,
}

impl EvaluationResults {
    pub fn findings(&self) -> &[EvaluationFinding] {
        &self.findings
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }
}

impl fmt::Display for EvaluationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, finding) in self.findings.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "- {finding}")?;
        }
        Ok(())
    }
}

impl SimpleDataSchema {
    /// Check every record against this schema.
    ///
    /// Values without a literal form, such as `null`, count as missing.
    /// Nested objects are checked against their nested schema; elements of
    /// arrays are not.
    pub fn evaluate(&self, entries: &[Value]) -> EvaluationResults {
        let mut results = EvaluationResults::default();
        for (idx, entry) in entries.iter().enumerate() {
            self.check_entry(entry, idx, "", &mut results);
        }
        results
    }

    pub(crate) fn check_entry(
        &self,
        value: &Value,
        entry: usize,
        prefix: &str,
        results: &mut EvaluationResults,
    ) {
        for (name, schema_entry) in self.fields() {
            let field = format!("{prefix}{name}");
            let found = &value[name.as_str()];
            let Some(literal) = Literal::from_value(found) else {
                if schema_entry.mandatory {
                    results
                        .findings
                        .push(EvaluationFinding::MissingMandatoryValue { field, entry });
                }
                continue;
            };

            let found_type = literal.return_type();
            if !found_type.can_assign_to(&schema_entry.ty) {
                results.findings.push(EvaluationFinding::IncompatibleTypes {
                    field,
                    entry,
                    expected: schema_entry.ty.clone(),
                    found: found_type,
                });
                continue;
            }

            if let (Value::Object(_), Some(nested)) = (found, &schema_entry.nested) {
                nested.check_entry(found, entry, &format!("{field}."), results);
            }
        }
    }
}
