// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use constraint_miner::{unstable::*, *};

fn parse_file(text: &str) -> Result<ConstraintTemplateFile> {
    let source = Source::from_contents("test.constraints".to_string(), text.to_string())?;
    let mut parser = Parser::new(&source)?;
    parser.parse()
}

fn parse_term(text: &str) -> Result<Ref<Term>> {
    let source = Source::from_contents("<term>".to_string(), text.to_string())?;
    let mut parser = Parser::new(&source)?;
    parser.parse_term()
}

#[test]
fn precedence() -> Result<()> {
    let term = parse_term("a || b && c == d + e * f ^ g")?;
    let expected = Term::binary(
        BinaryOp::Or,
        Term::variable("a"),
        Term::binary(
            BinaryOp::And,
            Term::variable("b"),
            Term::binary(
                BinaryOp::Equal,
                Term::variable("c"),
                Term::binary(
                    BinaryOp::Add,
                    Term::variable("d"),
                    Term::binary(
                        BinaryOp::Mul,
                        Term::variable("e"),
                        Term::binary(BinaryOp::Pow, Term::variable("f"), Term::variable("g")),
                    ),
                ),
            ),
        ),
    );
    assert_eq!(term, expected);
    Ok(())
}

#[test]
fn left_associative_subtraction() -> Result<()> {
    let term = parse_term("a - b - c")?;
    let expected = Term::binary(
        BinaryOp::Sub,
        Term::binary(BinaryOp::Sub, Term::variable("a"), Term::variable("b")),
        Term::variable("c"),
    );
    assert_eq!(term, expected);
    Ok(())
}

#[test]
fn not_equal_is_negated_equality() -> Result<()> {
    let term = parse_term("a != 1")?;
    let expected = Term::not(Term::binary(
        BinaryOp::Equal,
        Term::variable("a"),
        Term::number(1),
    ));
    assert_eq!(term, expected);
    Ok(())
}

#[test]
fn quantifier_keywords() -> Result<()> {
    let term = parse_term("forall items: ARRAY_ELEMENT > 0")?;
    let expected = Term::for_all(
        Term::variable("items"),
        Term::binary(
            BinaryOp::GreaterThan,
            Term::variable(ARRAY_ELEMENT),
            Term::number(0),
        ),
    );
    assert_eq!(term, expected);

    let term = parse_term("exists items: ARRAY_ELEMENT > 0")?;
    assert!(matches!(
        term.as_ref(),
        Term::Quantifier {
            kind: QuantifierKind::Exists,
            ..
        }
    ));
    Ok(())
}

#[test]
fn array_literals() -> Result<()> {
    let term = parse_term("[-1, 2.5, 3]")?;
    match term.as_literal() {
        Some(Literal::Array {
            element_type,
            values,
        }) => {
            assert_eq!(*element_type, Type::Number);
            assert_eq!(values.len(), 3);
            assert_eq!(values[0], Literal::Number(Number::from(-1.0)));
        }
        _ => panic!("expecting array literal, got {term}"),
    }

    let term = parse_term("[]")?;
    assert_eq!(term.return_type(), Type::array_of(Type::Any));

    let term = parse_term(r#"[["a"], ["b", "c"]]"#)?;
    assert_eq!(
        term.return_type(),
        Type::array_of(Type::array_of(Type::String))
    );
    Ok(())
}

#[test]
fn rendering_parses_back() -> Result<()> {
    for text in [
        "a + b * c",
        "(a + b) * c",
        "2 ^ (3 ^ 2)",
        "(2 ^ 3) ^ 2",
        "!(a < b) || c",
        "a - (-3)",
        r#"string.matchesRegex(name, "[a-z]+")"#,
        r#"arrays.forAll(items, objects.reference(ARRAY_ELEMENT, "qty") >= 1)"#,
        "exists tags: string.length(ARRAY_ELEMENT) == 0",
        r#"string.isDate(day, ["dd.MM.yyyy", "yyyy"])"#,
    ] {
        let term = parse_term(text)?;
        let rendered = term.to_string();
        let reparsed = parse_term(&rendered)?;
        assert_eq!(term, reparsed, "{text} rendered as {rendered}");
    }
    Ok(())
}

#[test]
fn template_file() -> Result<()> {
    let file = parse_file(
        r#"
# Retention policies.
policy strict: AND { noViolations minApplications = 5 }
policy lenient: OR {
  noViolations
  minApplications = 2
}

constraint nonNegative: a >= 0
constraint ordered: a < b policy = lenient

group strings {
  policy = strict
  constraint email: string.isEmail(s)
  // Overrides the group policy.
  constraint numeric: string.isNumeric(s) policy = lenient
}
"#,
    )?;

    assert_eq!(file.policies.len(), 2);
    assert_eq!(file.constraints.len(), 2);
    assert_eq!(file.groups.len(), 1);
    assert_eq!(file.len(), 4);

    let strict = Policy::And(vec![Policy::NoViolations, Policy::MinApplications(5)]);
    let lenient = Policy::Or(vec![Policy::NoViolations, Policy::MinApplications(2)]);

    assert_eq!(file.constraints[0].name, "nonNegative");
    assert_eq!(file.constraints[0].policy, Policy::default());
    assert_eq!(file.constraints[1].policy, lenient);

    let group = &file.groups[0];
    assert_eq!(group.name, "strings");
    assert_eq!(group.constraints[0].policy, strict);
    assert_eq!(group.constraints[1].policy, lenient);

    let names: Vec<_> = file
        .templates()
        .map(|(g, t)| (g.map(|g| g.to_string()), t.name.clone()))
        .collect();
    assert_eq!(
        names,
        vec![
            (None, "nonNegative".to_string()),
            (None, "ordered".to_string()),
            (Some("strings".to_string()), "email".to_string()),
            (Some("strings".to_string()), "numeric".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn default_policy_declaration() -> Result<()> {
    let file = parse_file(
        r#"
policy DEFAULT: minApplications = 3
constraint positive: a > 0
"#,
    )?;
    assert_eq!(file.constraints[0].policy, Policy::MinApplications(3));
    Ok(())
}

#[test]
fn default_policy_of_parser() -> Result<()> {
    let source = Source::from_contents(
        "test.constraints".to_string(),
        "constraint positive: a > 0".to_string(),
    )?;
    let mut parser = Parser::new(&source)?;
    parser.set_default_policy(Policy::NoViolations);
    let file = parser.parse()?;
    assert_eq!(file.constraints[0].policy, Policy::NoViolations);
    Ok(())
}

#[test]
fn policy_display_parses_back() -> Result<()> {
    let policy = Policy::Or(vec![
        Policy::And(vec![Policy::NoViolations, Policy::MinApplications(4)]),
        Policy::MinApplications(10),
    ]);
    let file = parse_file(&format!("policy p: {policy}\nconstraint c: a > 0 policy = p"))?;
    assert_eq!(file.constraints[0].policy, policy);
    Ok(())
}

fn assert_parse_error(text: &str, expected: &str) {
    match parse_file(text) {
        Ok(_) => panic!("parsing `{text}` should fail"),
        Err(e) => {
            let msg = e.to_string();
            assert!(msg.contains(expected), "`{msg}` does not contain `{expected}`");
        }
    }
}

#[test]
fn parse_errors() {
    assert_parse_error("constraint c: a > 0 policy = nope", "undeclared policy `nope`");
    assert_parse_error("policy p: noViolations\npolicy p: noViolations", "already declared");
    assert_parse_error(
        "constraint c: a > 0\npolicy p: noViolations",
        "policies must be declared before groups and constraints",
    );
    assert_parse_error("rule c: a > 0", "expecting `group` or `constraint`");
    assert_parse_error("policy p: minApplications = 1.5", "non-negative integer");
    assert_parse_error("policy p: sometimes", "invalid policy expression");
    assert_parse_error("group g { constraint c: a > 0", "expecting `}`");
    assert_parse_error("constraint forall: a > 0", "unexpected keyword");
    assert_parse_error("constraint c: nope(a)", "Unknown function name");
}

#[test]
fn custom_function_registration() -> Result<()> {
    fn always_true(args: &[Ref<Term>]) -> Option<Ref<Term>> {
        match args {
            [_] => Some(Term::boolean(true)),
            _ => None,
        }
    }

    let mut registry = FunctionRegistry::new();
    registry.register("custom.ok", always_true)?;
    assert!(registry.contains("CUSTOM.OK"));

    let source = Source::from_contents("<term>".to_string(), "custom.ok(a)".to_string())?;
    let mut parser = Parser::new_with_registry(&source, registry)?;
    assert_eq!(parser.parse_term()?, Term::boolean(true));
    Ok(())
}
