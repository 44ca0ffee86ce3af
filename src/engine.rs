// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::config::MinerConfig;
use crate::constraint::Constraint;
use crate::data::{DataCollection, DataSchema};
use crate::lexer::*;
use crate::miner::*;
use crate::parser::*;
use crate::registry::FunctionRegistry;
use crate::template::*;
use crate::validation::{ValidationContext, ValidationMessage};

use std::collections::BTreeMap;
use std::convert::AsRef;
use std::path::Path;

use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;

/// A constraint retained by its template's policy.
///
/// Each constraint is reported once. `template` and `group` name the first
/// template that produced and retained it; later templates producing the
/// same constraint are listed in `also_mined_by`.
#[derive(Debug, Clone, Serialize)]
pub struct MinedConstraint {
    pub template: String,
    pub group: Option<String>,
    pub constraint: Constraint,
    pub valid: usize,
    pub violations: usize,
    pub inapplicable: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub also_mined_by: Vec<String>,
}

// Mining results indexed by constraint.
#[derive(Default)]
struct Mined {
    constraints: Vec<MinedConstraint>,
    index: BTreeMap<Constraint, usize>,
}

/// A template that failed validation.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidTemplate {
    pub template: String,
    pub group: Option<String>,
    pub messages: Vec<ValidationMessage>,
}

/// The constraint mining engine.
#[derive(Clone, Default)]
pub struct Engine {
    files: Vec<ConstraintTemplateFile>,
    registry: FunctionRegistry,
    config: MinerConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_config(&mut self, config: MinerConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Functions registered here are visible to templates added afterwards.
    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    fn parse_source(&self, source: &Source) -> Result<ConstraintTemplateFile> {
        let mut parser = Parser::new_with_registry(source, self.registry.clone())?;
        parser.set_default_policy(self.config.default_policy.clone());
        let file = parser.parse()?;
        info!("loaded {} templates from {}", file.len(), source.file());
        Ok(file)
    }

    pub fn add_templates(&mut self, path: String, text: String) -> Result<()> {
        let source = Source::from_contents(path, text)?;
        let file = self.parse_source(&source)?;
        self.files.push(file);
        Ok(())
    }

    pub fn add_templates_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let source = Source::from_file(path)?;
        let file = self.parse_source(&source)?;
        self.files.push(file);
        Ok(())
    }

    /// Parse a single expression, resolving functions through this engine's
    /// registry.
    pub fn parse_term(&self, text: &str) -> Result<Ref<Term>> {
        let source = Source::from_contents("<term>".to_string(), text.to_string())?;
        let mut parser = Parser::new_with_registry(&source, self.registry.clone())?;
        parser.parse_term()
    }

    /// All loaded templates with the group they belong to.
    pub fn templates(&self) -> impl Iterator<Item = (Option<&str>, &ConstraintTemplate)> {
        self.files.iter().flat_map(|f| f.templates())
    }

    pub fn template_files(&self) -> &[ConstraintTemplateFile] {
        &self.files
    }

    /// Report templates whose validation found errors. They are removed
    /// from the engine when `drop_invalid_templates` is set.
    pub fn validate_templates(&mut self) -> Vec<InvalidTemplate> {
        let mut report = vec![];
        for (group, template) in self.templates() {
            let mut context = ValidationContext::new();
            template.term.validate_with(&mut context);
            if !context.is_valid() {
                report.push(InvalidTemplate {
                    template: template.name.clone(),
                    group: group.map(|g| g.to_string()),
                    messages: context.messages().to_vec(),
                });
            }
        }

        if self.config.drop_invalid_templates && !report.is_empty() {
            for file in &mut self.files {
                file.constraints.retain(|t| t.term.validate());
                for group in &mut file.groups {
                    group.constraints.retain(|t| t.term.validate());
                }
            }
            warn!("removed {} invalid templates", report.len());
        }
        report
    }

    // Templates taking part in mining.
    fn mining_templates(&self) -> Vec<(Option<&str>, &ConstraintTemplate)> {
        self.templates()
            .filter(|(_, t)| {
                if self.config.drop_invalid_templates && !t.term.validate() {
                    warn!("skipping invalid template {}", t.name);
                    return false;
                }
                true
            })
            .collect()
    }

    fn retain<D: DataCollection>(
        group: Option<&str>,
        template: &ConstraintTemplate,
        candidates: impl IntoIterator<Item = Constraint>,
        data: &D,
        mined: &mut Mined,
    ) {
        let mut retained = 0;
        for constraint in candidates {
            if let Some(&idx) = mined.index.get(&constraint) {
                debug!("{constraint} already mined, also from {}", template.name);
                mined.constraints[idx]
                    .also_mined_by
                    .push(template.name.clone());
                continue;
            }

            let results = constraint.apply_data(data);
            if !template.policy.include_constraint(&results) {
                continue;
            }
            retained += 1;
            mined.index.insert(constraint.clone(), mined.constraints.len());
            mined.constraints.push(MinedConstraint {
                template: template.name.clone(),
                group: group.map(|g| g.to_string()),
                valid: results.number_of_valid_data_entries(),
                violations: results.number_of_violations(),
                inapplicable: results.number_of_inapplicable_data_entries(),
                constraint,
                also_mined_by: vec![],
            });
        }
        info!("template {}: retained {retained} constraints", template.name);
    }

    /// Mine constraints whose variables are fields seen in `data` and keep
    /// those the template's policy accepts.
    pub fn mine_from_data<D: DataCollection>(&self, data: &D) -> Vec<MinedConstraint> {
        let miner =
            ConstraintMinerFromData::new(data).with_array_quantification(self.config.quantify_arrays);
        let mut mined = Mined::default();
        for (group, template) in self.mining_templates() {
            let candidates = miner.possible_constraints(&[template.term.clone()]);
            Self::retain(group, template, candidates, data, &mut mined);
        }
        mined.constraints
    }

    /// Mine constraints over the fields of `schema`, checking them against
    /// `data`.
    pub fn mine_from_schema<S: DataSchema, D: DataCollection>(
        &self,
        schema: &S,
        data: &D,
    ) -> Vec<MinedConstraint> {
        let miner = ConstraintMinerFromSchema::new(schema)
            .with_array_quantification(self.config.quantify_arrays);
        let mut mined = Mined::default();
        for (group, template) in self.mining_templates() {
            let candidates = miner.possible_constraints(&[template.term.clone()]);
            Self::retain(group, template, candidates, data, &mut mined);
        }
        mined.constraints
    }
}
