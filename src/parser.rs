// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::lexer::*;
use crate::number::Number;
use crate::policy::Policy;
use crate::registry::FunctionRegistry;
use crate::template::*;

use core::str::FromStr;
use std::collections::BTreeMap;

use anyhow::{bail, Result};

/// Name of the policy that replaces the built-in default.
pub const DEFAULT_POLICY_NAME: &str = "DEFAULT";

#[derive(Clone)]
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    tok: Token,
    registry: FunctionRegistry,
    default_policy: Policy,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source Source) -> Result<Self> {
        Self::new_with_registry(source, FunctionRegistry::new())
    }

    /// Parser resolving function calls through `registry`.
    pub fn new_with_registry(source: &'source Source, registry: FunctionRegistry) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tok = lexer.next_token()?;
        Ok(Self {
            lexer,
            tok,
            registry,
            default_policy: Policy::default(),
        })
    }

    /// Policy for templates that name none when the file declares no `DEFAULT`.
    pub fn set_default_policy(&mut self, policy: Policy) {
        self.default_policy = policy;
    }

    pub fn token_text(&self) -> &str {
        match self.tok.0 {
            TokenKind::Symbol | TokenKind::Number | TokenKind::Ident | TokenKind::Eof => {
                self.tok.1.text()
            }
            TokenKind::String | TokenKind::RawString => "",
        }
    }

    pub fn next_token(&mut self) -> Result<()> {
        self.tok = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, text: &str, context: &str) -> Result<()> {
        if self.token_text() == text {
            self.next_token()
        } else {
            let msg = format!("expecting `{text}` {context}");
            Err(self.tok.1.error(&msg))
        }
    }

    fn is_keyword(&self, ident: &str) -> bool {
        matches!(
            ident,
            "policy"
                | "group"
                | "constraint"
                | "forall"
                | "exists"
                | "AND"
                | "OR"
                | "true"
                | "false"
                | "ARRAY_ELEMENT"
                | "noViolations"
                | "minApplications"
        )
    }

    fn parse_ident(&mut self) -> Result<Span> {
        let span = self.tok.1.clone();
        match self.tok.0 {
            TokenKind::Ident if self.is_keyword(span.text()) => {
                Err(span.error(&format!("unexpected keyword `{}`", span.text())))
            }
            TokenKind::Ident => {
                self.next_token()?;
                Ok(span)
            }
            _ => Err(span.error("expecting identifier")),
        }
    }

    fn read_number(span: &Span) -> Result<Number> {
        match Number::from_str(span.text()) {
            Ok(n) => Ok(n),
            Err(_) => bail!(span.error("could not parse number")),
        }
    }

    fn read_string(span: &Span) -> Result<String> {
        match serde_json::from_str::<String>(format!("\"{}\"", span.text()).as_str()) {
            Ok(s) => Ok(s),
            Err(e) => bail!(span.error(format!("invalid string literal. {e}").as_str())),
        }
    }

    // Literals allowed inside array literals.
    fn parse_literal(&mut self) -> Result<Literal> {
        let span = self.tok.1.clone();
        let literal = match (&self.tok.0, self.token_text()) {
            (TokenKind::Symbol, "-") => {
                self.next_token()?;
                let span = self.tok.1.clone();
                if self.tok.0 != TokenKind::Number {
                    bail!(span.error("expecting number after `-`"));
                }
                Literal::Number(-Self::read_number(&span)?)
            }
            (TokenKind::Symbol, "[") => return self.parse_array_literal(),
            (TokenKind::Number, _) => Literal::Number(Self::read_number(&span)?),
            (TokenKind::String, _) => Literal::String(Self::read_string(&span)?.into()),
            (TokenKind::RawString, _) => Literal::String(span.text().into()),
            (TokenKind::Ident, "true") => Literal::Boolean(true),
            (TokenKind::Ident, "false") => Literal::Boolean(false),
            _ => bail!(span.error("expecting literal value")),
        };
        self.next_token()?;
        Ok(literal)
    }

    fn parse_array_literal(&mut self) -> Result<Literal> {
        let span = self.tok.1.clone();
        self.expect("[", "to start array literal")?;
        let mut values = vec![];
        if self.token_text() != "]" {
            loop {
                values.push(self.parse_literal()?);
                if self.token_text() != "," {
                    break;
                }
                self.next_token()?;
            }
        }
        self.expect("]", "after array literal")?;

        match Literal::array(values) {
            Some(a) => Ok(a),
            None => bail!(span.error("array elements must all have the same type")),
        }
    }

    fn parse_call(&mut self, name: &Span) -> Result<Ref<Term>> {
        self.expect("(", "to start argument list")?;
        let mut args = vec![];
        if self.token_text() != ")" {
            loop {
                args.push(self.parse_expr()?);
                if self.token_text() != "," {
                    break;
                }
                self.next_token()?;
            }
        }
        self.expect(")", "to end argument list")?;

        match self.registry.create(name.text(), &args) {
            Ok(t) => Ok(t),
            Err(e) => bail!(name.error(&e.to_string())),
        }
    }

    // forall a: body
    fn parse_quantifier(&mut self, kind: QuantifierKind) -> Result<Ref<Term>> {
        self.next_token()?;
        let array = self.parse_ident()?;
        self.expect(":", "after quantifier variable")?;
        let condition = self.parse_expr()?;
        Ok(Ref::new(Term::Quantifier {
            kind,
            array: Term::variable(array.text()),
            condition,
        }))
    }

    fn parse_primary(&mut self) -> Result<Ref<Term>> {
        let span = self.tok.1.clone();
        match (&self.tok.0, self.token_text()) {
            (TokenKind::Number | TokenKind::String | TokenKind::RawString, _)
            | (TokenKind::Ident, "true" | "false")
            | (TokenKind::Symbol, "[") => Ok(Term::literal(self.parse_literal()?)),
            (TokenKind::Symbol, "(") => {
                self.next_token()?;
                let expr = self.parse_expr()?;
                self.expect(")", "to close parenthesized expression")?;
                Ok(expr)
            }
            (TokenKind::Ident, "ARRAY_ELEMENT") => {
                self.next_token()?;
                Ok(Term::variable(ARRAY_ELEMENT))
            }
            (TokenKind::Ident, "forall") => self.parse_quantifier(QuantifierKind::ForAll),
            (TokenKind::Ident, "exists") => self.parse_quantifier(QuantifierKind::Exists),
            (TokenKind::Ident, _) => {
                let name = self.parse_ident()?;
                match self.token_text() {
                    "(" => self.parse_call(&name),
                    _ => Ok(Term::variable(name.text())),
                }
            }
            _ => Err(span.error("expecting expression")),
        }
    }

    fn parse_unary_expr(&mut self) -> Result<Ref<Term>> {
        match self.token_text() {
            "!" => {
                self.next_token()?;
                Ok(Term::not(self.parse_unary_expr()?))
            }
            "-" => {
                self.next_token()?;
                let operand = self.parse_unary_expr()?;
                Ok(match operand.as_number() {
                    Some(n) => Term::number(-n),
                    None => Term::binary(BinaryOp::Sub, Term::number(Number::ZERO), operand),
                })
            }
            _ => self.parse_primary(),
        }
    }

    // ^ is right associative.
    fn parse_power_expr(&mut self) -> Result<Ref<Term>> {
        let base = self.parse_unary_expr()?;
        if self.token_text() == "^" {
            self.next_token()?;
            let exponent = self.parse_power_expr()?;
            return Ok(Term::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_mul_div_mod_expr(&mut self) -> Result<Ref<Term>> {
        let mut expr = self.parse_power_expr()?;
        loop {
            let op = match self.token_text() {
                "*" => BinaryOp::Mul,
                "/" => BinaryOp::Div,
                "%" => BinaryOp::Mod,
                _ => return Ok(expr),
            };
            self.next_token()?;
            let right = self.parse_power_expr()?;
            expr = Term::binary(op, expr, right);
        }
    }

    fn parse_arith_expr(&mut self) -> Result<Ref<Term>> {
        let mut expr = self.parse_mul_div_mod_expr()?;
        loop {
            let op = match self.token_text() {
                "+" => BinaryOp::Add,
                "-" => BinaryOp::Sub,
                _ => return Ok(expr),
            };
            self.next_token()?;
            let right = self.parse_mul_div_mod_expr()?;
            expr = Term::binary(op, expr, right);
        }
    }

    fn parse_relational_expr(&mut self) -> Result<Ref<Term>> {
        let mut expr = self.parse_arith_expr()?;
        loop {
            let op = match self.token_text() {
                "<" => BinaryOp::LessThan,
                "<=" => BinaryOp::LessThanOrEqual,
                ">" => BinaryOp::GreaterThan,
                ">=" => BinaryOp::GreaterThanOrEqual,
                _ => return Ok(expr),
            };
            self.next_token()?;
            let right = self.parse_arith_expr()?;
            expr = Term::binary(op, expr, right);
        }
    }

    fn parse_equality_expr(&mut self) -> Result<Ref<Term>> {
        let mut expr = self.parse_relational_expr()?;
        loop {
            let negate = match self.token_text() {
                "==" => false,
                "!=" => true,
                _ => return Ok(expr),
            };
            self.next_token()?;
            let right = self.parse_relational_expr()?;
            expr = Term::binary(BinaryOp::Equal, expr, right);
            if negate {
                expr = Term::not(expr);
            }
        }
    }

    fn parse_and_expr(&mut self) -> Result<Ref<Term>> {
        let mut expr = self.parse_equality_expr()?;
        while self.token_text() == "&&" {
            self.next_token()?;
            let right = self.parse_equality_expr()?;
            expr = Term::binary(BinaryOp::And, expr, right);
        }
        Ok(expr)
    }

    pub fn parse_expr(&mut self) -> Result<Ref<Term>> {
        let mut expr = self.parse_and_expr()?;
        while self.token_text() == "||" {
            self.next_token()?;
            let right = self.parse_and_expr()?;
            expr = Term::binary(BinaryOp::Or, expr, right);
        }
        Ok(expr)
    }

    /// Parse a source that holds a single expression.
    pub fn parse_term(&mut self) -> Result<Ref<Term>> {
        let term = self.parse_expr()?;
        if self.tok.0 != TokenKind::Eof {
            bail!(self.tok.1.error("expecting end of expression"));
        }
        Ok(term)
    }

    fn parse_min_applications(&mut self) -> Result<Policy> {
        self.next_token()?;
        self.expect("=", "after minApplications")?;
        let span = self.tok.1.clone();
        if self.tok.0 != TokenKind::Number {
            bail!(span.error("expecting a number of applications"));
        }
        let n = Self::read_number(&span)?;
        let count = match (n.is_integer(), n.as_index()) {
            (true, Some(c)) => c,
            _ => bail!(span.error("expecting a non-negative integer")),
        };
        self.next_token()?;
        Ok(Policy::MinApplications(count))
    }

    fn parse_policy(&mut self) -> Result<Policy> {
        let span = self.tok.1.clone();
        match (&self.tok.0, self.token_text()) {
            (TokenKind::Ident, "AND" | "OR") => {
                let is_and = self.token_text() == "AND";
                self.next_token()?;
                self.expect("{", "after AND/OR")?;
                let mut policies = vec![];
                while self.token_text() != "}" && self.tok.0 != TokenKind::Eof {
                    policies.push(self.parse_policy()?);
                }
                self.expect("}", "to close policy list")?;
                Ok(match is_and {
                    true => Policy::And(policies),
                    false => Policy::Or(policies),
                })
            }
            (TokenKind::Ident, "noViolations") => {
                self.next_token()?;
                Ok(Policy::NoViolations)
            }
            (TokenKind::Ident, "minApplications") => self.parse_min_applications(),
            _ => Err(span.error("invalid policy expression")),
        }
    }

    fn parse_policy_decl(&mut self, policies: &mut BTreeMap<String, Policy>) -> Result<()> {
        self.expect("policy", "")?;
        let name = self.parse_ident()?;
        self.expect(":", "after policy name")?;
        let policy = self.parse_policy()?;
        if policies.contains_key(name.text()) {
            bail!(name.error(&format!("policy `{}` is already declared", name.text())));
        }
        policies.insert(name.text().to_string(), policy);
        Ok(())
    }

    // policy = NAME
    fn parse_policy_ref(&mut self, policies: &BTreeMap<String, Policy>) -> Result<Policy> {
        self.expect("policy", "")?;
        self.expect("=", "after policy")?;
        let name = self.parse_ident()?;
        match policies.get(name.text()) {
            Some(p) => Ok(p.clone()),
            None => bail!(name.error(&format!("undeclared policy `{}`", name.text()))),
        }
    }

    fn parse_constraint_decl(
        &mut self,
        policies: &BTreeMap<String, Policy>,
        inherited: &Policy,
    ) -> Result<ConstraintTemplate> {
        self.expect("constraint", "")?;
        let name = self.parse_ident()?;
        self.expect(":", "after constraint name")?;
        let term = self.parse_expr()?;
        let policy = match self.token_text() {
            "policy" => self.parse_policy_ref(policies)?,
            _ => inherited.clone(),
        };
        Ok(ConstraintTemplate {
            name: name.text().to_string(),
            term,
            policy,
        })
    }

    fn parse_group_decl(
        &mut self,
        policies: &BTreeMap<String, Policy>,
        default: &Policy,
    ) -> Result<GroupDefinition> {
        self.expect("group", "")?;
        let name = self.parse_ident()?;
        self.expect("{", "to start group")?;
        let group_policy = match self.token_text() {
            "policy" => self.parse_policy_ref(policies)?,
            _ => default.clone(),
        };

        let mut constraints = vec![];
        while self.token_text() != "}" && self.tok.0 != TokenKind::Eof {
            constraints.push(self.parse_constraint_decl(policies, &group_policy)?);
        }
        self.expect("}", "to close group")?;

        Ok(GroupDefinition {
            name: name.text().to_string(),
            constraints,
        })
    }

    pub fn parse(&mut self) -> Result<ConstraintTemplateFile> {
        let mut file = ConstraintTemplateFile::default();

        while self.token_text() == "policy" {
            self.parse_policy_decl(&mut file.policies)?;
        }

        let default = match file.policies.get(DEFAULT_POLICY_NAME) {
            Some(p) => p.clone(),
            None => self.default_policy.clone(),
        };

        loop {
            match self.token_text() {
                "group" => {
                    let group = self.parse_group_decl(&file.policies, &default)?;
                    file.groups.push(group);
                }
                "constraint" => {
                    let constraint = self.parse_constraint_decl(&file.policies, &default)?;
                    file.constraints.push(constraint);
                }
                "policy" => bail!(self
                    .tok
                    .1
                    .error("policies must be declared before groups and constraints")),
                _ if self.tok.0 == TokenKind::Eof => break,
                _ => bail!(self.tok.1.error("expecting `group` or `constraint`")),
            }
        }

        Ok(file)
    }
}
