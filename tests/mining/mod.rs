// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::env;
use std::path::Path;

use anyhow::{bail, Result};
use constraint_miner::*;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;
use walkdir::WalkDir;

#[derive(Serialize, Deserialize, Debug)]
struct TestCase {
    note: String,
    templates: String,
    data: Value,
    config: Option<MinerConfig>,
    from_schema: Option<bool>,
    want: Option<Vec<String>>,
    error: Option<String>,
    skip: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn mine(case: &TestCase) -> Result<Vec<String>> {
    let mut engine = Engine::new();
    if let Some(config) = &case.config {
        engine.set_config(config.clone());
    }
    engine.add_templates(format!("{}.constraints", case.note), case.templates.clone())?;

    let data = SimpleDataCollection::from_values(case.data.as_array()?.clone());
    let mined = match case.from_schema {
        Some(true) => engine.mine_from_schema(&data.derive_schema()?, &data),
        _ => engine.mine_from_data(&data),
    };

    let mut constraints: Vec<String> = mined.iter().map(|m| m.constraint.to_string()).collect();
    constraints.sort();
    Ok(constraints)
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    println!("running {file}");

    for case in &test.cases {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }

        match (mine(case), &case.want, &case.error) {
            (Ok(computed), Some(want), None) => {
                let mut expected = want.clone();
                expected.sort();
                if computed != expected {
                    let (computed, expected) = (computed.join("\n"), expected.join("\n"));
                    bail!(
                        "mismatch in {}:\n{}",
                        case.note,
                        prettydiff::diff_lines(&expected, &computed)
                    );
                }
            }
            (Err(e), None, Some(error)) => {
                let msg = e.to_string();
                if !msg.contains(error.as_str()) {
                    bail!("error `{msg}` does not contain `{error}`");
                }
            }
            (Ok(computed), None, Some(_)) => bail!("expected error, got {computed:?}"),
            (Err(e), Some(_), None) => return Err(e),
            _ => bail!("either want or error must be specified in test case."),
        }
        println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test_resources("tests/mining/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
#[ignore = "intended for running a directory of yaml files"]
fn run_directory() -> Result<()> {
    env_logger::init();

    let mut failures = vec![];
    for a in env::args() {
        if !Path::new(&a).is_dir() {
            continue;
        }
        for entry in WalkDir::new(a)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path().to_string_lossy().to_string();
            if !Path::new(&path).is_file() || !path.ends_with(".yaml") {
                continue;
            }
            if let Err(e) = yaml_test_impl(path.as_str()) {
                failures.push((path, e));
            }
        }
    }

    if !failures.is_empty() {
        dbg!(failures);
        panic!("failed");
    }
    Ok(())
}
