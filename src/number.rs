// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use core::ops;
use core::str::FromStr;

use anyhow::{anyhow, Result};
use num_traits::ToPrimitive;
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};

// Largest integer magnitude that f64 represents exactly.
const F64_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Numeric value used by literals and record values.
///
/// Wraps an `f64` and gives it total equality, ordering and hashing so that
/// terms containing numbers can be deduplicated in sets.
/// `-0.0` and `0.0` compare equal and all NaNs compare equal to each other.
#[derive(Clone, Copy, Default)]
pub struct Number(f64);

impl Number {
    pub const ZERO: Number = Number(0.0);
    pub const ONE: Number = Number(1.0);

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub fn is_one(&self) -> bool {
        self.0 == 1.0
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0
    }

    /// Index into a sequence. Fractions are truncated like a cast to int.
    pub fn as_index(&self) -> Option<usize> {
        self.0.trunc().to_usize()
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.is_integer() && self.0.abs() <= F64_SAFE_INTEGER {
            true => self.0.to_i64(),
            false => None,
        }
    }

    pub fn pow(&self, exponent: &Number) -> Number {
        Number(self.0.powf(exponent.0))
    }

    // Bit pattern used for hashing and ordering.
    fn canonical_bits(&self) -> u64 {
        if self.0.is_nan() {
            f64::NAN.to_bits()
        } else if self.0 == 0.0 {
            0.0f64.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number(n)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number(n as f64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number(n as f64)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number(n as f64)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number(f64::from(n))
    }
}

impl FromStr for Number {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<f64>()
            .map(Number)
            .map_err(|e| anyhow!("invalid number `{s}`: {e}"))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ if self.0 == other.0 => Ordering::Equal,
            _ => self.0.total_cmp(&other.0),
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state)
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.as_i64() {
            Some(i) => write!(f, "{i}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_i64() {
            Some(i) => serializer.serialize_i64(i),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Number)
    }
}

impl ops::Add for Number {
    type Output = Number;
    fn add(self, rhs: Self) -> Number {
        Number(self.0 + rhs.0)
    }
}

impl ops::Sub for Number {
    type Output = Number;
    fn sub(self, rhs: Self) -> Number {
        Number(self.0 - rhs.0)
    }
}

impl ops::Mul for Number {
    type Output = Number;
    fn mul(self, rhs: Self) -> Number {
        Number(self.0 * rhs.0)
    }
}

impl ops::Div for Number {
    type Output = Number;
    fn div(self, rhs: Self) -> Number {
        Number(self.0 / rhs.0)
    }
}

impl ops::Rem for Number {
    type Output = Number;
    fn rem(self, rhs: Self) -> Number {
        Number(self.0 % rhs.0)
    }
}

impl ops::Neg for Number {
    type Output = Number;
    fn neg(self) -> Number {
        Number(-self.0)
    }
}
