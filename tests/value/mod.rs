// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use constraint_miner::*;

#[test]
fn serialize_number() -> Result<()> {
    // Check that integer values are serialized without fractional part
    assert_eq!(serde_json::to_string_pretty(&Value::from(1.0))?, "1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-1.0))?, "-1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(2.5))?, "2.5");
    Ok(())
}

#[test]
fn number_equality_and_ordering() {
    assert_eq!(Number::from(0.0), Number::from(-0.0));
    assert_eq!(Number::from(f64::NAN), Number::from(f64::NAN));
    assert!(Number::from(1) < Number::from(1.5));
    assert_eq!(Number::from(3).to_string(), "3");
    assert_eq!(Number::from(0.25).to_string(), "0.25");
}

#[test]
fn paths_and_indexing() -> Result<()> {
    let v = Value::from_json_str(r#"{"address": {"street": "Main", "zip": 12345}, "tags": ["a", "b"]}"#)?;
    assert_eq!(v.get_path("address.street"), &Value::from("Main"));
    assert_eq!(v["address"]["zip"], Value::from(12345u64));
    assert_eq!(v["tags"][1], Value::from("b"));
    assert_eq!(v["tags"][5], Value::Undefined);
    assert_eq!(v.get_path("address.city"), &Value::Undefined);
    assert_eq!(v.get_path("tags.length"), &Value::Undefined);
    Ok(())
}

#[test]
fn accessors() -> Result<()> {
    let mut v = Value::from_json_str(r#"{"a": [1, 2], "b": true}"#)?;
    assert!(*v["b"].as_bool()?);
    assert_eq!(v["a"].as_array()?.len(), 2);
    assert!(v["b"].as_array().is_err());

    v.as_object_mut()?.insert("c".into(), Value::Null);
    assert!(v["c"].is_null());
    assert!(v["d"].is_undefined());
    Ok(())
}

#[test]
fn json_round_trip() -> Result<()> {
    let text = r#"{"a": [1, 2.5, "x", null, false], "b": {"c": {}}}"#;
    let v = Value::from_json_str(text)?;
    let again = Value::from_json_str(&v.to_json_str()?)?;
    assert_eq!(v, again);
    Ok(())
}

#[test]
fn yaml_values() -> Result<()> {
    let v = Value::from_yaml_str("size: 3\nname: box\ntags: [a, b]\n")?;
    assert_eq!(v["size"], Value::from(3u64));
    assert_eq!(v["name"], Value::from("box"));
    assert_eq!(v["tags"].as_array()?.len(), 2);
    Ok(())
}

#[test]
fn literal_forms() -> Result<()> {
    let v = Value::from_json_str(r#"{"n": 1, "mixed": [1, "a"], "none": null, "empty": [], "o": {"k": 1}}"#)?;
    assert_eq!(Literal::from_value(&v["n"]), Some(Literal::Number(Number::from(1))));
    assert_eq!(Literal::from_value(&v["mixed"]), None);
    assert_eq!(Literal::from_value(&v["none"]), None);
    assert_eq!(
        Literal::from_value(&v["empty"]).map(|l| l.return_type()),
        Some(Type::array_of(Type::Any))
    );
    assert_eq!(
        Literal::from_value(&v["o"]).map(|l| l.return_type()),
        Some(Type::Complex)
    );
    Ok(())
}
