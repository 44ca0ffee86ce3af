// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::Builtin;
use crate::number::Number;
use crate::types::Type;
use crate::value::Value;

use core::hash::{Hash, Hasher};
use core::{cmp, fmt, ops::Deref};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Name of the variable a quantifier binds to each array element.
pub const ARRAY_ELEMENT: &str = "ARRAY_ELEMENT";

/// Shared, immutable tree node.
///
/// Equality, ordering and hashing are structural so that equal terms built
/// independently collapse in sets.
pub struct NodeRef<T> {
    r: Rc<T>,
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self { r: self.r.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.r.as_ref().fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.r.as_ref().fmt(f)
    }
}

impl<T: PartialEq> cmp::PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.r, &other.r) || self.r == other.r
    }
}

impl<T: Eq> cmp::Eq for NodeRef<T> {}

impl<T: Ord> cmp::Ord for NodeRef<T> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        if Rc::ptr_eq(&self.r, &other.r) {
            return cmp::Ordering::Equal;
        }
        self.r.cmp(&other.r)
    }
}

impl<T: Ord> cmp::PartialOrd for NodeRef<T> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Hash> Hash for NodeRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

impl<T> Deref for NodeRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.r
    }
}

impl<T> AsRef<T> for NodeRef<T> {
    fn as_ref(&self) -> &T {
        self.deref()
    }
}

impl<T> NodeRef<T> {
    pub fn new(t: T) -> Self {
        Self { r: Rc::new(t) }
    }

    /// Whether both references point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.r, &other.r)
    }
}

pub type Ref<T> = NodeRef<T>;

/// Variable name to term mapping used for substitution.
pub type Bindings = BTreeMap<Rc<str>, Ref<Term>>;

/// Constant values. Each kind has a fixed return type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Literal {
    Number(Number),
    Boolean(bool),
    String(Rc<str>),
    Complex(Value),
    Array {
        element_type: Type,
        values: Vec<Literal>,
    },
}

impl Literal {
    pub fn return_type(&self) -> Type {
        match self {
            Literal::Number(_) => Type::Number,
            Literal::Boolean(_) => Type::Boolean,
            Literal::String(_) => Type::String,
            Literal::Complex(_) => Type::Complex,
            Literal::Array { element_type, .. } => Type::array_of(element_type.clone()),
        }
    }

    /// Literal form of a record value.
    ///
    /// `null`, `undefined` and arrays mixing element kinds have none.
    pub fn from_value(value: &Value) -> Option<Literal> {
        Some(match value {
            Value::Number(n) => Literal::Number(*n),
            Value::Bool(b) => Literal::Boolean(*b),
            Value::String(s) => Literal::String(s.clone()),
            Value::Object(_) => Literal::Complex(value.clone()),
            Value::Array(items) => {
                let mut element_type = Type::Any;
                let mut values = Vec::with_capacity(items.len());
                for item in items.iter() {
                    let literal = Literal::from_value(item)?;
                    element_type = element_type.narrow(&literal.return_type())?;
                    values.push(literal);
                }
                Literal::Array {
                    element_type,
                    values,
                }
            }
            Value::Null | Value::Undefined => return None,
        })
    }

    /// Array literal from already built elements.
    ///
    /// Fails when the elements do not share a type.
    pub fn array(values: Vec<Literal>) -> Option<Literal> {
        let mut element_type = Type::Any;
        for v in &values {
            element_type = element_type.narrow(&v.return_type())?;
        }
        Some(Literal::Array {
            element_type,
            values,
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::Number(n) => Value::Number(*n),
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Complex(v) => v.clone(),
            Literal::Array { values, .. } => {
                Value::from(values.iter().map(Literal::to_value).collect::<Vec<_>>())
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Number(_) => "NumberLiteral",
            Literal::Boolean(_) => "BooleanLiteral",
            Literal::String(_) => "StringLiteral",
            Literal::Complex(_) => "ComplexValue",
            Literal::Array { .. } => "ArrayValues",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Not => "Not",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
        }
    }

    pub fn operand_type(self) -> Type {
        Type::Boolean
    }

    pub fn return_type(self) -> Type {
        Type::Boolean
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
            BinaryOp::Equal => "Equal",
            BinaryOp::LessThan => "LessThan",
            BinaryOp::LessThanOrEqual => "LessThanOrEqual",
            BinaryOp::GreaterThan => "GreaterThan",
            BinaryOp::GreaterThanOrEqual => "GreaterThanOrEqual",
            BinaryOp::Add => "Addition",
            BinaryOp::Sub => "Subtraction",
            BinaryOp::Mul => "Multiplication",
            BinaryOp::Div => "Division",
            BinaryOp::Mod => "Modulo",
            BinaryOp::Pow => "Power",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Equal => "==",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }

    pub fn is_arithmetic(self) -> bool {
        !self.is_logical() && !self.is_comparison()
    }

    pub fn operand_types(self) -> [Type; 2] {
        match self.is_logical() {
            true => [Type::Boolean, Type::Boolean],
            false => [Type::Number, Type::Number],
        }
    }

    pub fn return_type(self) -> Type {
        match self.is_arithmetic() {
            true => Type::Number,
            false => Type::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuantifierKind {
    ForAll,
    Exists,
}

impl QuantifierKind {
    pub fn name(self) -> &'static str {
        match self {
            QuantifierKind::ForAll => "arrays.forAll",
            QuantifierKind::Exists => "arrays.exists",
        }
    }
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Literal(Literal),

    Variable(Rc<str>),

    Unary {
        op: UnaryOp,
        operand: Ref<Term>,
    },

    Binary {
        op: BinaryOp,
        left: Ref<Term>,
        right: Ref<Term>,
    },

    Function {
        builtin: Builtin,
        args: Vec<Ref<Term>>,
    },

    // The condition sees each element of the array as ARRAY_ELEMENT.
    Quantifier {
        kind: QuantifierKind,
        array: Ref<Term>,
        condition: Ref<Term>,
    },

    // Only meaningful inside patterns given to the matcher.
    Placeholder(Rc<str>),

    // Matches any node whose kind name equals `class`.
    Pattern {
        class: Rc<str>,
        children: Option<Vec<Ref<Term>>>,
    },
}

impl Term {
    pub fn number<N: Into<Number>>(n: N) -> Ref<Term> {
        Ref::new(Term::Literal(Literal::Number(n.into())))
    }

    pub fn boolean(b: bool) -> Ref<Term> {
        Ref::new(Term::Literal(Literal::Boolean(b)))
    }

    pub fn string(s: &str) -> Ref<Term> {
        Ref::new(Term::Literal(Literal::String(s.into())))
    }

    pub fn literal(l: Literal) -> Ref<Term> {
        Ref::new(Term::Literal(l))
    }

    pub fn variable(name: &str) -> Ref<Term> {
        Ref::new(Term::Variable(name.into()))
    }

    pub fn not(operand: Ref<Term>) -> Ref<Term> {
        Ref::new(Term::Unary {
            op: UnaryOp::Not,
            operand,
        })
    }

    pub fn binary(op: BinaryOp, left: Ref<Term>, right: Ref<Term>) -> Ref<Term> {
        Ref::new(Term::Binary { op, left, right })
    }

    pub fn function(builtin: Builtin, args: Vec<Ref<Term>>) -> Ref<Term> {
        Ref::new(Term::Function { builtin, args })
    }

    pub fn for_all(array: Ref<Term>, condition: Ref<Term>) -> Ref<Term> {
        Ref::new(Term::Quantifier {
            kind: QuantifierKind::ForAll,
            array,
            condition,
        })
    }

    pub fn exists(array: Ref<Term>, condition: Ref<Term>) -> Ref<Term> {
        Ref::new(Term::Quantifier {
            kind: QuantifierKind::Exists,
            array,
            condition,
        })
    }

    pub fn placeholder(name: &str) -> Ref<Term> {
        Ref::new(Term::Placeholder(name.into()))
    }

    pub fn pattern(class: &str, children: Option<Vec<Ref<Term>>>) -> Ref<Term> {
        Ref::new(Term::Pattern {
            class: class.into(),
            children,
        })
    }

    pub fn return_type(&self) -> Type {
        match self {
            Term::Literal(l) => l.return_type(),
            Term::Variable(_) | Term::Placeholder(_) | Term::Pattern { .. } => Type::Any,
            Term::Unary { op, .. } => op.return_type(),
            Term::Binary { op, .. } => op.return_type(),
            Term::Function { builtin, .. } => builtin.return_type(),
            Term::Quantifier { .. } => Type::Boolean,
        }
    }

    /// Identity of the node's variant, compared by the pattern matcher.
    pub fn kind_name(&self) -> &str {
        match self {
            Term::Literal(l) => l.kind_name(),
            Term::Variable(_) => "Variable",
            Term::Unary { op, .. } => op.name(),
            Term::Binary { op, .. } => op.name(),
            Term::Function { builtin, .. } => builtin.name(),
            Term::Quantifier { kind, .. } => kind.name(),
            Term::Placeholder(_) => "Placeholder",
            Term::Pattern { class, .. } => class,
        }
    }

    /// Ordered child terms. Leaves have none.
    pub fn children(&self) -> Option<Vec<Ref<Term>>> {
        match self {
            Term::Literal(_) | Term::Variable(_) | Term::Placeholder(_) => None,
            Term::Unary { operand, .. } => Some(vec![operand.clone()]),
            Term::Binary { left, right, .. } => Some(vec![left.clone(), right.clone()]),
            Term::Function { args, .. } => Some(args.clone()),
            Term::Quantifier {
                array, condition, ..
            } => Some(vec![array.clone(), condition.clone()]),
            Term::Pattern { children, .. } => children.clone(),
        }
    }

    /// Declared type of each child position.
    pub fn operand_types(&self) -> Option<Vec<Type>> {
        match self {
            Term::Unary { op, .. } => Some(vec![op.operand_type()]),
            Term::Binary { op, .. } => Some(op.operand_types().to_vec()),
            Term::Function { builtin, .. } => Some(builtin.parameter_types()),
            Term::Quantifier { .. } => Some(vec![Type::array_of(Type::Any), Type::Boolean]),
            _ => None,
        }
    }

    /// Operators, functions and quantifiers. Mined terms that reduce to
    /// anything else carry no constraint.
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            Term::Unary { .. }
                | Term::Binary { .. }
                | Term::Function { .. }
                | Term::Quantifier { .. }
        )
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Term::Literal(Literal::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Term::Literal(Literal::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&Rc<str>> {
        match self {
            Term::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::String(s) => match serde_json::to_string(s.as_ref()) {
                Ok(s) => f.write_str(&s),
                Err(_) => Err(fmt::Error),
            },
            Literal::Complex(v) => write!(f, "{v}"),
            Literal::Array { values, .. } => {
                f.write_str("[")?;
                for (idx, v) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// Nested operators are parenthesized so rendering never depends on
// precedence.
fn fmt_operand(term: &Term, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match term {
        Term::Unary { .. } | Term::Binary { .. } => write!(f, "({term})"),
        Term::Literal(Literal::Number(n)) if n.as_f64().is_sign_negative() => {
            write!(f, "({term})")
        }
        _ => write!(f, "{term}"),
    }
}

fn fmt_args(args: &[Ref<Term>], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (idx, a) in args.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(l) => write!(f, "{l}"),
            Term::Variable(name) => f.write_str(name),
            Term::Unary { op, operand } => {
                f.write_str(op.symbol())?;
                fmt_operand(operand, f)
            }
            Term::Binary { op, left, right } => {
                fmt_operand(left, f)?;
                write!(f, " {} ", op.symbol())?;
                fmt_operand(right, f)
            }
            Term::Function { builtin, args } => {
                write!(f, "{}(", builtin.name())?;
                fmt_args(args, f)?;
                f.write_str(")")
            }
            Term::Quantifier {
                kind,
                array,
                condition,
            } => write!(f, "{}({array}, {condition})", kind.name()),
            Term::Placeholder(name) => write!(f, "?{name}"),
            Term::Pattern { class, children } => {
                write!(f, "{class}(")?;
                if let Some(children) = children {
                    fmt_args(children, f)?;
                }
                f.write_str(")")
            }
        }
    }
}
