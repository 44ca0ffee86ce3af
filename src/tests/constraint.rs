// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::term;
use crate::constraint::{Constraint, ConstraintError};
use crate::data::{DataCollection, SimpleDataCollection};
use crate::policy::Policy;
use crate::types::Type;
use crate::value::Value;

fn data(json: &str) -> SimpleDataCollection {
    SimpleDataCollection::from_json_str(json).unwrap()
}

fn sizes() -> SimpleDataCollection {
    data(r#"[{"size": 0}, {"size": 1}, {"size": 3}]"#)
}

#[test]
fn non_boolean_terms_are_rejected() {
    let err = Constraint::new(term("a + 1")).unwrap_err();
    assert_eq!(
        err,
        ConstraintError::NonBoolean {
            found: Type::Number
        }
    );
    assert_eq!(
        err.to_string(),
        "Constraint term needs to return boolean, instead of: NUMBER"
    );
    assert!(Constraint::new(term("a")).is_err());
}

#[test]
fn all_entries_valid() {
    let results = Constraint::new(term("size >= 0")).unwrap().apply_data(&sizes());
    assert_eq!(results.number_of_valid_data_entries(), 3);
    assert_eq!(results.number_of_violations(), 0);
    assert!(!results.found_counter_example());
    assert_eq!(results.application_rate(), 1.0);
}

#[test]
fn counter_example() {
    let results = Constraint::new(term("size > 0")).unwrap().apply_data(&sizes());
    assert_eq!(
        results.valid_data().entries(),
        &[
            Value::from_json_str(r#"{"size": 1}"#).unwrap(),
            Value::from_json_str(r#"{"size": 3}"#).unwrap()
        ]
    );
    assert_eq!(
        results.invalid_data().entries(),
        &[Value::from_json_str(r#"{"size": 0}"#).unwrap()]
    );
    assert_eq!(results.applicable_data().len(), 2);
    assert_eq!(results.data().len(), 3);
    assert!(results.found_counter_example());
    assert!((results.violation_rate() - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn missing_fields_are_not_applicable() {
    let corpus = data(r#"[{"size": 1}, {"other": 2}, {"size": null}, {"size": 5}]"#);
    let results = Constraint::new(term("size >= 0")).unwrap().apply_data(&corpus);
    assert_eq!(results.number_of_valid_data_entries(), 2);
    assert_eq!(results.number_of_violations(), 0);
    assert_eq!(results.number_of_inapplicable_data_entries(), 2);
    assert_eq!(results.applicable_data().len(), 4);
}

#[test]
fn stuck_evaluation_is_not_applicable() {
    let corpus = data(r#"[{"xs": [1, 2], "i": 5}, {"xs": [1, 2], "i": 1}]"#);
    let results = Constraint::new(term("arrays.index(xs, i) > 1"))
        .unwrap()
        .apply_data(&corpus);
    assert_eq!(results.number_of_inapplicable_data_entries(), 1);
    assert_eq!(results.number_of_valid_data_entries(), 1);

    let corpus = data(r#"[{"a": 1, "b": 0}]"#);
    let results = Constraint::new(term("a / b > 0")).unwrap().apply_data(&corpus);
    assert_eq!(results.number_of_inapplicable_data_entries(), 1);
}

#[test]
fn array_quantification() {
    let corpus = data(r#"[{"array": [10, 1, 2, 3]}, {"array": [1, 2, 3, 4]}]"#);
    let results = Constraint::new(term("arrays.forAll(array, ARRAY_ELEMENT < 10)"))
        .unwrap()
        .apply_data(&corpus);
    assert_eq!(
        results.invalid_data().entries(),
        &[Value::from_json_str(r#"{"array": [10, 1, 2, 3]}"#).unwrap()]
    );
    assert_eq!(
        results.valid_data().entries(),
        &[Value::from_json_str(r#"{"array": [1, 2, 3, 4]}"#).unwrap()]
    );
}

#[test]
fn empty_corpus_rates() {
    let results = Constraint::new(term("size > 0"))
        .unwrap()
        .apply_data(&SimpleDataCollection::new());
    assert_eq!(results.application_rate(), 0.0);
    assert_eq!(results.violation_rate(), 0.0);
}

#[test]
fn policies() {
    let results = Constraint::new(term("size > 0")).unwrap().apply_data(&sizes());

    assert!(!Policy::NoViolations.include_constraint(&results));
    assert!(Policy::MinApplications(2).include_constraint(&results));
    assert!(!Policy::MinApplications(3).include_constraint(&results));
    assert!(!Policy::default().include_constraint(&results));
    assert!(Policy::Or(vec![Policy::NoViolations, Policy::MinApplications(2)])
        .include_constraint(&results));
    assert!(Policy::And(vec![]).include_constraint(&results));
    assert!(!Policy::Or(vec![]).include_constraint(&results));
}

#[test]
fn constraints_deduplicate() {
    let a = Constraint::new(term("x < y")).unwrap();
    let b = Constraint::new(term("x < y")).unwrap();
    assert_eq!(a, b);
    assert_eq!(serde_json::to_string(&a).unwrap(), "\"x < y\"");
}
