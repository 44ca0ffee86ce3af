// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::env;

use anyhow::{bail, Result};
use constraint_miner::{unstable::*, *};
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

#[derive(Serialize, Deserialize, Debug)]
struct TestCase {
    note: String,
    term: String,
    bindings: Option<Value>,
    want: Option<String>,
    error: Option<String>,
    skip: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn bindings_from_value(v: &Value) -> Result<Bindings> {
    let mut bindings = Bindings::new();
    for (name, value) in v.as_object()?.iter() {
        match Literal::from_value(value) {
            Some(l) => {
                bindings.insert(name.clone(), Term::literal(l));
            }
            None => bail!("binding {name} has no literal form"),
        }
    }
    Ok(bindings)
}

fn eval_case(engine: &Engine, case: &TestCase) -> Result<Ref<Term>> {
    let mut term = engine.parse_term(&case.term)?;
    if let Some(b) = &case.bindings {
        term = term.substitute(&bindings_from_value(b)?);
    }
    let result = term.evaluate();

    // Evaluation is idempotent.
    let again = result.evaluate();
    if again != result {
        bail!("evaluation is not idempotent: {result} became {again}");
    }
    Ok(result)
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;
    let engine = Engine::new();

    println!("running {file}");

    for case in &test.cases {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }

        match (eval_case(&engine, case), &case.want, &case.error) {
            (Ok(result), Some(want), None) => {
                let expected = engine.parse_term(want)?;
                if result != expected {
                    bail!(
                        "mismatch in {}:\nleft  = {result}\nright = {expected}\n",
                        case.note
                    );
                }
            }
            (Err(e), None, Some(error)) => {
                let msg = e.to_string();
                if !msg.contains(error.as_str()) {
                    bail!("error `{msg}` does not contain `{error}`");
                }
            }
            (Ok(result), None, Some(_)) => bail!("expected error, got {result}"),
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

#[test]
#[ignore = "intended for running a single yaml file"]
fn one_yaml() -> Result<()> {
    env_logger::init();

    let mut file = String::default();

    for a in env::args() {
        if a.ends_with(".yaml") {
            file = a;
        }
    }

    if file.is_empty() {
        bail!("missing <yaml-file>");
    }

    yaml_test(file.as_str())
}

#[test_resources("tests/evaluator/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
