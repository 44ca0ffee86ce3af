// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::policy::Policy;

use std::collections::BTreeMap;

/// A named template and the policy deciding which of its mined
/// constraints are kept.
#[derive(Debug, Clone)]
pub struct ConstraintTemplate {
    pub name: String,
    pub term: Ref<Term>,
    pub policy: Policy,
}

/// Templates declared together, with an optional policy shared by all of them.
#[derive(Debug, Clone)]
pub struct GroupDefinition {
    pub name: String,
    pub constraints: Vec<ConstraintTemplate>,
}

/// Everything declared in one template file.
#[derive(Debug, Clone, Default)]
pub struct ConstraintTemplateFile {
    pub policies: BTreeMap<String, Policy>,
    pub constraints: Vec<ConstraintTemplate>,
    pub groups: Vec<GroupDefinition>,
}

impl ConstraintTemplateFile {
    /// All templates: top level ones first, then those of each group.
    pub fn templates(&self) -> impl Iterator<Item = (Option<&str>, &ConstraintTemplate)> {
        self.constraints.iter().map(|c| (None, c)).chain(
            self.groups
                .iter()
                .flat_map(|g| g.constraints.iter().map(move |c| (Some(g.name.as_str()), c))),
        )
    }

    pub fn len(&self) -> usize {
        self.constraints.len() + self.groups.iter().map(|g| g.constraints.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
