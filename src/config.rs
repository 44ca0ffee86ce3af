// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::policy::Policy;

use std::path::Path;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Settings that steer template mining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinerConfig {
    /// Policy for templates that neither name one nor inherit one from a
    /// group or a `DEFAULT` declaration.
    #[serde(default)]
    pub default_policy: Policy,

    /// Also wrap substitutions over array fields in `arrays.forAll`.
    #[serde(default = "default_true")]
    pub quantify_arrays: bool,

    /// Remove templates with validation errors before mining.
    #[serde(default = "default_true")]
    pub drop_invalid_templates: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            default_policy: Policy::default(),
            quantify_arrays: true,
            drop_invalid_templates: true,
        }
    }
}

impl MinerConfig {
    pub fn from_json_str(json: &str) -> Result<MinerConfig> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<MinerConfig> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a file. `.yaml` and `.yml` files are read as YAML, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MinerConfig> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => bail!("Failed to read {}. {e}", path.display()),
        };
        match path.extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "yaml")]
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }
}
