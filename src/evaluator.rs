// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::builtins::Builtin;
use crate::number::Number;

use std::rc::Rc;

impl Ref<Term> {
    /// Reduce the term as far as its concrete parts allow.
    ///
    /// Evaluation never fails. A term that cannot be reduced further, for
    /// instance because it still contains free variables, is returned as is.
    /// Neither the receiver nor any shared sub-term is modified.
    pub fn evaluate(&self) -> Ref<Term> {
        match self.as_ref() {
            Term::Literal(_)
            | Term::Variable(_)
            | Term::Placeholder(_)
            | Term::Pattern { .. } => self.clone(),
            Term::Unary { op, operand } => eval_unary(self, *op, operand),
            Term::Binary { op, left, right } => eval_binary(self, *op, left, right),
            Term::Function { builtin, args } => eval_function(self, *builtin, args),
            Term::Quantifier {
                kind,
                array,
                condition,
            } => eval_quantifier(self, *kind, array, condition),
        }
    }
}

// Keep the original node when none of the children changed.
fn rebuild_unary(term: &Ref<Term>, op: UnaryOp, old: &Ref<Term>, new: Ref<Term>) -> Ref<Term> {
    match old.ptr_eq(&new) {
        true => term.clone(),
        false => Ref::new(Term::Unary { op, operand: new }),
    }
}

fn rebuild_binary(
    term: &Ref<Term>,
    op: BinaryOp,
    (old_left, old_right): (&Ref<Term>, &Ref<Term>),
    left: Ref<Term>,
    right: Ref<Term>,
) -> Ref<Term> {
    match old_left.ptr_eq(&left) && old_right.ptr_eq(&right) {
        true => term.clone(),
        false => Term::binary(op, left, right),
    }
}

fn eval_unary(term: &Ref<Term>, op: UnaryOp, operand: &Ref<Term>) -> Ref<Term> {
    let reduced = operand.evaluate();
    match op {
        UnaryOp::Not => {
            if let Some(b) = reduced.as_bool() {
                return Term::boolean(!b);
            }
            // Double negation.
            if let Term::Unary {
                op: UnaryOp::Not,
                operand: inner,
            } = reduced.as_ref()
            {
                return inner.clone();
            }
            rebuild_unary(term, op, operand, reduced)
        }
    }
}

fn eval_binary(term: &Ref<Term>, op: BinaryOp, left: &Ref<Term>, right: &Ref<Term>) -> Ref<Term> {
    let l = left.evaluate();
    let r = right.evaluate();

    let folded = match op {
        BinaryOp::And => eval_and(&l, &r),
        BinaryOp::Or => eval_or(&l, &r),
        BinaryOp::Equal
        | BinaryOp::LessThan
        | BinaryOp::LessThanOrEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanOrEqual => eval_comparison(op, &l, &r),
        _ => eval_arithmetic(op, &l, &r),
    };

    match folded {
        Some(t) => t,
        None => rebuild_binary(term, op, (left, right), l, r),
    }
}

fn eval_and(l: &Ref<Term>, r: &Ref<Term>) -> Option<Ref<Term>> {
    match (l.as_bool(), r.as_bool()) {
        (Some(a), Some(b)) => Some(Term::boolean(a && b)),
        _ if l == r => Some(l.clone()),
        (Some(false), _) | (_, Some(false)) => Some(Term::boolean(false)),
        (Some(true), _) => Some(r.clone()),
        (_, Some(true)) => Some(l.clone()),
        _ => None,
    }
}

fn eval_or(l: &Ref<Term>, r: &Ref<Term>) -> Option<Ref<Term>> {
    match (l.as_bool(), r.as_bool()) {
        (Some(a), Some(b)) => Some(Term::boolean(a || b)),
        _ if l == r => Some(l.clone()),
        (Some(true), _) | (_, Some(true)) => Some(Term::boolean(true)),
        (Some(false), _) => Some(r.clone()),
        (_, Some(false)) => Some(l.clone()),
        _ => None,
    }
}

fn eval_comparison(op: BinaryOp, l: &Ref<Term>, r: &Ref<Term>) -> Option<Ref<Term>> {
    if let (Some(a), Some(b)) = (l.as_number(), r.as_number()) {
        let result = match op {
            BinaryOp::Equal => a == b,
            BinaryOp::LessThan => a < b,
            BinaryOp::LessThanOrEqual => a <= b,
            BinaryOp::GreaterThan => a > b,
            _ => a >= b,
        };
        return Some(Term::boolean(result));
    }

    if l == r {
        let reflexive = matches!(
            op,
            BinaryOp::Equal | BinaryOp::LessThanOrEqual | BinaryOp::GreaterThanOrEqual
        );
        return Some(Term::boolean(reflexive));
    }

    // Equality also folds literals of the same non-numeric kind.
    if op == BinaryOp::Equal {
        if let (Some(a), Some(b)) = (l.as_literal(), r.as_literal()) {
            if a.return_type() == b.return_type() {
                return Some(Term::boolean(a == b));
            }
        }
    }

    None
}

fn eval_arithmetic(op: BinaryOp, l: &Ref<Term>, r: &Ref<Term>) -> Option<Ref<Term>> {
    let (a, b) = (l.as_number(), r.as_number());
    let is_zero = |n: Option<Number>| n.is_some_and(|n| n.is_zero());
    let is_one = |n: Option<Number>| n.is_some_and(|n| n.is_one());

    // Division by zero is not evaluable.
    if matches!(op, BinaryOp::Div | BinaryOp::Mod) && is_zero(b) {
        return None;
    }

    if let (Some(a), Some(b)) = (a, b) {
        let n = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Mod => a % b,
            _ => a.pow(&b),
        };
        return Some(Term::number(n));
    }

    match op {
        BinaryOp::Add if is_zero(a) => Some(r.clone()),
        BinaryOp::Add | BinaryOp::Sub if is_zero(b) => Some(l.clone()),
        BinaryOp::Mul if is_zero(a) || is_zero(b) => Some(Term::number(Number::ZERO)),
        BinaryOp::Div if is_one(b) => Some(l.clone()),
        BinaryOp::Pow if is_zero(b) => Some(Term::number(Number::ONE)),
        BinaryOp::Mod | BinaryOp::Pow if is_zero(a) => Some(Term::number(Number::ZERO)),
        _ => None,
    }
}

fn eval_function(term: &Ref<Term>, builtin: Builtin, args: &[Ref<Term>]) -> Ref<Term> {
    let reduced: Vec<Ref<Term>> = args.iter().map(|a| a.evaluate()).collect();
    if let Some(result) = (builtin.evaluator())(&reduced) {
        return result;
    }

    match args.iter().zip(reduced.iter()).all(|(a, r)| a.ptr_eq(r)) {
        true => term.clone(),
        false => Term::function(builtin, reduced),
    }
}

fn eval_quantifier(
    term: &Ref<Term>,
    kind: QuantifierKind,
    array: &Ref<Term>,
    condition: &Ref<Term>,
) -> Ref<Term> {
    let reduced_array = array.evaluate();
    let reduced_condition = condition.evaluate();

    let elements = match reduced_array.as_literal() {
        Some(Literal::Array { values, .. }) => values,
        _ => {
            return match reduced_array.ptr_eq(array) && reduced_condition.ptr_eq(condition) {
                true => term.clone(),
                false => Ref::new(Term::Quantifier {
                    kind,
                    array: reduced_array,
                    condition: reduced_condition,
                }),
            }
        }
    };

    // ForAll stops at the first false element, Exists at the first true one.
    let stop_at = kind == QuantifierKind::Exists;
    let element: Rc<str> = ARRAY_ELEMENT.into();
    for value in elements {
        let mut bindings = Bindings::new();
        bindings.insert(element.clone(), Term::literal(value.clone()));
        match reduced_condition.substitute(&bindings).evaluate().as_bool() {
            Some(b) if b == stop_at => return Term::boolean(stop_at),
            Some(_) => (),
            None => return term.clone(),
        }
    }

    Term::boolean(!stop_at)
}
