// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Static type of a term.
///
/// `Any` is the type of variables before inference and acts as a wildcard
/// when checking assignability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Type {
    Any,
    Number,
    Boolean,
    String,
    Complex,
    Array(Box<Type>),
}

impl Type {
    pub fn array_of(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a value of this type may be used where `target` is expected.
    pub fn can_assign_to(&self, target: &Type) -> bool {
        match (self, target) {
            (_, Type::Any) => true,
            (Type::Array(from), Type::Array(to)) => {
                from.is_any() || to.is_any() || from.can_assign_to(to)
            }
            _ => self == target,
        }
    }

    /// Whether either type may stand in for the other.
    pub fn is_compatible(&self, other: &Type) -> bool {
        self.is_any() || self.can_assign_to(other) || other.can_assign_to(self)
    }

    /// The more specific of two compatible types.
    pub fn narrow(&self, other: &Type) -> Option<Type> {
        match (self, other) {
            (Type::Any, t) | (t, Type::Any) => Some(t.clone()),
            (Type::Array(a), Type::Array(b)) => a.narrow(b).map(Type::array_of),
            (a, b) if a == b => Some(a.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("ANY"),
            Type::Number => f.write_str("NUMBER"),
            Type::Boolean => f.write_str("BOOLEAN"),
            Type::String => f.write_str("STRING"),
            Type::Complex => f.write_str("COMPLEXTYPE"),
            Type::Array(e) => write!(f, "ARRAY<{e}>"),
        }
    }
}
