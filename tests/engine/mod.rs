// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use constraint_miner::*;

fn sizes() -> Result<SimpleDataCollection> {
    SimpleDataCollection::from_json_str(r#"[{"size": 0}, {"size": 1}, {"size": 3}]"#)
}

#[test]
fn mined_constraint_counts() -> Result<()> {
    let data = SimpleDataCollection::from_json_str(
        r#"[{"size": 1}, {"other": true}, {"size": 2}]"#,
    )?;
    let mut engine = Engine::new();
    engine.add_templates(
        "counts.constraints".to_string(),
        "constraint nonNegative: a >= 0".to_string(),
    )?;

    let mined = engine.mine_from_data(&data);
    assert_eq!(mined.len(), 1);
    let m = &mined[0];
    assert_eq!(m.template, "nonNegative");
    assert_eq!(m.group, None);
    assert_eq!(m.valid, 2);
    assert_eq!(m.violations, 0);
    assert_eq!(m.inapplicable, 1);
    Ok(())
}

#[test]
fn report_serializes_to_json() -> Result<()> {
    let mut engine = Engine::new();
    engine.add_templates(
        "report.constraints".to_string(),
        "group sizes { constraint nonNegative: a >= 0 }".to_string(),
    )?;
    let mined = engine.mine_from_data(&sizes()?);
    let report = Value::from_json_str(&serde_json::to_string(&mined)?)?;
    assert_eq!(report[0]["template"], Value::from("nonNegative"));
    assert_eq!(report[0]["group"], Value::from("sizes"));
    assert_eq!(report[0]["constraint"], Value::from("size >= 0"));
    assert_eq!(report[0]["valid"], Value::from(3u64));
    Ok(())
}

#[test]
fn invalid_templates_are_reported_and_removed() -> Result<()> {
    let mut engine = Engine::new();
    engine.add_templates(
        "invalid.constraints".to_string(),
        r#"
constraint typed: a >= 0
constraint mistyped: string.length(1) > 0
constraint noElement: arrays.forAll(items, x > 0)
"#
        .to_string(),
    )?;
    assert_eq!(engine.templates().count(), 3);

    let report = engine.validate_templates();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].template, "mistyped");
    assert!(report[0].messages[0]
        .message
        .contains("Invalid operand type. Expected: STRING but got: NUMBER"));

    // Warnings do not remove a template.
    let names: Vec<_> = engine.templates().map(|(_, t)| t.name.clone()).collect();
    assert_eq!(names, vec!["typed".to_string(), "noElement".to_string()]);
    Ok(())
}

#[test]
fn invalid_templates_are_kept_on_request() -> Result<()> {
    let mut engine = Engine::new();
    engine.set_config(MinerConfig {
        drop_invalid_templates: false,
        ..MinerConfig::default()
    });
    engine.add_templates(
        "invalid.constraints".to_string(),
        "constraint mistyped: string.length(1) > 0".to_string(),
    )?;
    assert_eq!(engine.validate_templates().len(), 1);
    assert_eq!(engine.templates().count(), 1);
    Ok(())
}

#[test]
fn config_files() -> Result<()> {
    let config = MinerConfig::from_json_str(r#"{"quantify_arrays": false}"#)?;
    assert!(!config.quantify_arrays);
    assert!(config.drop_invalid_templates);
    assert_eq!(config.default_policy, Policy::default());

    let config = MinerConfig::from_yaml_str(
        "default_policy:\n  or:\n    - noViolations\n    - minApplications: 4\n",
    )?;
    assert_eq!(
        config.default_policy,
        Policy::Or(vec![Policy::NoViolations, Policy::MinApplications(4)])
    );

    assert!(MinerConfig::from_json_str(r#"{"unknown": 1}"#).is_err());
    Ok(())
}

#[test]
fn parse_term_uses_registry() -> Result<()> {
    fn double(args: &[Ref<Term>]) -> Option<Ref<Term>> {
        match args {
            [a] => Some(Term::binary(
                constraint_miner::unstable::BinaryOp::Mul,
                a.clone(),
                Term::number(2),
            )),
            _ => None,
        }
    }

    let mut engine = Engine::new();
    engine.registry_mut().register("double", double)?;
    let term = engine.parse_term("double(x) > 3")?;
    assert_eq!(term.to_string(), "(x * 2) > 3");

    engine.add_templates(
        "custom.constraints".to_string(),
        "constraint doubled: double(a) > a".to_string(),
    )?;
    let mined = engine.mine_from_data(&sizes()?);
    // 0 * 2 > 0 fails, so the constraint has a counter example.
    assert!(mined.is_empty());
    Ok(())
}

#[test]
fn constraints_are_reported_once() -> Result<()> {
    let mut engine = Engine::new();
    engine.add_templates(
        "overlap.constraints".to_string(),
        r#"
constraint nonNegative: a >= 0
group sizes {
  constraint alsoNonNegative: b >= 0
}
"#
        .to_string(),
    )?;

    let mined = engine.mine_from_data(&sizes()?);
    assert_eq!(mined.len(), 1);
    assert_eq!(mined[0].constraint.to_string(), "size >= 0");
    assert_eq!(mined[0].template, "nonNegative");
    assert_eq!(mined[0].also_mined_by, vec!["alsoNonNegative".to_string()]);

    let report = Value::from_json_str(&serde_json::to_string(&mined)?)?;
    assert_eq!(report[0]["also_mined_by"][0], Value::from("alsoNonNegative"));
    Ok(())
}

#[test]
fn input_output_mining() -> Result<()> {
    let data = InOutputDataCollection::from_json_str(
        r#"[
            {"input": {"amount": 10}, "output": {"total": 12}},
            {"input": {"amount": 3}, "output": {"total": 4}}
        ]"#,
    )?;
    let mut engine = Engine::new();
    engine.add_templates(
        "io.constraints".to_string(),
        "constraint grows: a < b".to_string(),
    )?;

    let mined: Vec<String> = engine
        .mine_from_data(&data)
        .iter()
        .map(|m| m.constraint.to_string())
        .collect();
    assert_eq!(mined, vec!["input.amount < output.total".to_string()]);

    let schema = data.derive_schema()?;
    let mined = engine.mine_from_schema(&schema, &data);
    assert_eq!(mined.len(), 1);
    assert_eq!(mined[0].valid, 2);
    Ok(())
}
