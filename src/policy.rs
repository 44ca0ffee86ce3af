// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::constraint::ConstraintResults;
use crate::data::DataCollection;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Decides whether a mined constraint is worth keeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Policy {
    /// At least this many entries satisfied the constraint.
    MinApplications(usize),
    /// No entry violated the constraint.
    NoViolations,
    And(Vec<Policy>),
    Or(Vec<Policy>),
}

impl Default for Policy {
    fn default() -> Self {
        Policy::And(vec![Policy::NoViolations, Policy::MinApplications(1)])
    }
}

impl Policy {
    pub fn include_constraint<D: DataCollection>(&self, results: &ConstraintResults<D>) -> bool {
        match self {
            Policy::MinApplications(n) => results.number_of_valid_data_entries() >= *n,
            Policy::NoViolations => !results.found_counter_example(),
            Policy::And(policies) => policies.iter().all(|p| p.include_constraint(results)),
            Policy::Or(policies) => policies.iter().any(|p| p.include_constraint(results)),
        }
    }
}

// Template syntax.
impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (keyword, policies) = match self {
            Policy::MinApplications(n) => return write!(f, "minApplications = {n}"),
            Policy::NoViolations => return f.write_str("noViolations"),
            Policy::And(policies) => ("AND", policies),
            Policy::Or(policies) => ("OR", policies),
        };
        write!(f, "{keyword} {{")?;
        for p in policies {
            write!(f, " {p}")?;
        }
        f.write_str(" }")
    }
}
