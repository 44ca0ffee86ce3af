// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::types::Type;

/// Decides the type of a field observed with two different types.
///
/// Narrowing through `ANY` (for example an empty array next to an array of
/// numbers) happens before the policy is consulted.
pub trait TypePromotionPolicy {
    /// The common type, or `None` when the types cannot be reconciled.
    fn promote(&self, first: &Type, second: &Type) -> Option<Type>;
}

/// Only identical (or narrowable) types unify.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypePromotion;

impl TypePromotionPolicy for NoTypePromotion {
    fn promote(&self, _first: &Type, _second: &Type) -> Option<Type> {
        None
    }
}

/// Mixed scalars become `STRING`: any two of `NUMBER`, `STRING` and
/// `BOOLEAN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypePromotionPolicy;

impl TypePromotionPolicy for DefaultTypePromotionPolicy {
    fn promote(&self, first: &Type, second: &Type) -> Option<Type> {
        let scalar = |t: &Type| matches!(t, Type::Number | Type::String | Type::Boolean);
        match (first, second) {
            (a, b) if a == b => Some(a.clone()),
            (a, b) if scalar(a) && scalar(b) => Some(Type::String),
            _ => None,
        }
    }
}

/// Like [`DefaultTypePromotionPolicy`], and a single value next to an array
/// of the same type becomes that array type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultArrayTypePromotionPolicy;

impl TypePromotionPolicy for DefaultArrayTypePromotionPolicy {
    fn promote(&self, first: &Type, second: &Type) -> Option<Type> {
        if let Some(t) = DefaultTypePromotionPolicy.promote(first, second) {
            return Some(t);
        }
        match (first, second) {
            (array @ Type::Array(e), single) | (single, array @ Type::Array(e))
                if **e == *single =>
            {
                Some(array.clone())
            }
            _ => None,
        }
    }
}

/// Common type of `first` and `second` under `policy`.
pub(crate) fn unify_types(
    first: &Type,
    second: &Type,
    policy: &dyn TypePromotionPolicy,
) -> Option<Type> {
    first
        .narrow(second)
        .or_else(|| policy.promote(first, second))
}
