//! Fixed-point decimal types for stock quantities, unit costs, and money.
//!
//! CRITICAL: Never use floating-point for stock or money calculations.
//! Each type wraps `rust_decimal::Decimal` pinned to a single scale. Every
//! constructor truncates toward zero and pads to that scale, so the textual
//! form is canonical: `"2.500"`, `"-1.250"`, `"0.000"` (never `"-0.000"`).
//!
//! The canonical strings are what gets persisted; comparisons always go
//! through the decimal value, never through the text.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Scale of stock quantities.
pub const QUANTITY_SCALE: u32 = 3;
/// Scale of per-unit costs.
pub const UNIT_COST_SCALE: u32 = 6;
/// Scale of monetary amounts.
pub const AMOUNT_SCALE: u32 = 3;
/// Scale of the exact `quantity * unit cost` product before truncation.
pub const EXTENSION_SCALE: u32 = QUANTITY_SCALE + UNIT_COST_SCALE;

/// Errors raised by strict fixed-point parsing and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedError {
    /// Input is not a decimal number.
    #[error("Invalid decimal value: {0:?}")]
    Invalid(String),

    /// Result does not fit in a 96-bit mantissa at the target scale.
    #[error("Decimal overflow")]
    Overflow,
}

/// Truncates toward zero to `scale` and pads to exactly `scale` digits.
fn pin(value: Decimal, scale: u32) -> Decimal {
    let mut pinned = value.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    pinned.rescale(scale);
    if pinned.is_zero() {
        pinned.set_sign_positive(true);
    }
    pinned
}

/// Parses a decimal leniently: anything that is not a number reads as zero.
fn parse_lenient(input: &str) -> Decimal {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Multiplies exactly on integer mantissas, then truncates to `scale`.
///
/// The product of two mantissas carries `a.scale() + b.scale()` digits, so
/// for a scale-3 quantity and a scale-6 cost the intermediate is scale 9.
fn mul_truncate(a: Decimal, b: Decimal, scale: u32) -> Result<Decimal, FixedError> {
    let product = a
        .mantissa()
        .checked_mul(b.mantissa())
        .ok_or(FixedError::Overflow)?;
    let product_scale = a.scale() + b.scale();

    let mantissa = if product_scale >= scale {
        match 10i128.checked_pow(product_scale - scale) {
            Some(divisor) => product / divisor,
            // |product| < 10^39, so dividing by anything larger truncates to zero.
            None => 0,
        }
    } else {
        let factor = 10i128
            .checked_pow(scale - product_scale)
            .ok_or(FixedError::Overflow)?;
        product.checked_mul(factor).ok_or(FixedError::Overflow)?
    };

    Decimal::try_from_i128_with_scale(mantissa, scale)
        .map(|value| pin(value, scale))
        .map_err(|_| FixedError::Overflow)
}

/// Generates a fixed-scale decimal newtype.
macro_rules! fixed_point {
    ($name:ident, $scale:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(Decimal);

        impl $name {
            /// Number of fractional digits carried by this type.
            pub const SCALE: u32 = $scale;

            /// Creates a value, truncating toward zero to the type's scale.
            #[must_use]
            pub fn new(value: Decimal) -> Self {
                Self(pin(value, Self::SCALE))
            }

            /// Zero at the type's scale.
            #[must_use]
            pub fn zero() -> Self {
                Self::new(Decimal::ZERO)
            }

            /// Lenient parse: non-numeric input is treated as zero.
            #[must_use]
            pub fn parse(input: &str) -> Self {
                Self::new(parse_lenient(input))
            }

            /// Integer mantissa at the type's scale.
            #[must_use]
            pub fn mantissa(&self) -> i128 {
                self.0.mantissa()
            }

            /// Returns the underlying decimal.
            #[must_use]
            pub const fn as_decimal(&self) -> Decimal {
                self.0
            }

            /// Returns true if the value is zero.
            #[must_use]
            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            /// Returns true if the value is strictly greater than zero.
            #[must_use]
            pub fn is_positive(&self) -> bool {
                self.0 > Decimal::ZERO
            }

            /// Returns true if the value is strictly less than zero.
            #[must_use]
            pub fn is_negative(&self) -> bool {
                self.0 < Decimal::ZERO
            }

            /// Absolute value.
            #[must_use]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Checked addition.
            #[must_use]
            pub fn checked_add(self, rhs: Self) -> Option<Self> {
                self.0.checked_add(rhs.0).map(Self::new)
            }

            /// Checked subtraction.
            #[must_use]
            pub fn checked_sub(self, rhs: Self) -> Option<Self> {
                self.0.checked_sub(rhs.0).map(Self::new)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = FixedError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Decimal::from_str(s.trim())
                    .map(Self::new)
                    .map_err(|_| FixedError::Invalid(s.to_string()))
            }
        }

        impl From<Decimal> for $name {
            fn from(value: Decimal) -> Self {
                Self::new(value)
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self::new(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self::new(self.0 - rhs.0)
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self::new(-self.0)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::zero(), Add::add)
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_point!(
    Quantity,
    QUANTITY_SCALE,
    "Stock quantity at scale 3. Positive for inbound, negative for outbound movements."
);
fixed_point!(UnitCost, UNIT_COST_SCALE, "Cost of one unit at scale 6.");
fixed_point!(Amount, AMOUNT_SCALE, "Monetary amount at scale 3.");

impl Quantity {
    /// Extends a quantity by a unit cost into a monetary amount.
    ///
    /// Computed exactly at scale 9, then truncated (not rounded) to scale 3.
    pub fn extend(self, unit_cost: UnitCost) -> Result<Amount, FixedError> {
        mul_truncate(self.0, unit_cost.0, AMOUNT_SCALE).map(Amount)
    }
}

/// Canonical string at `scale`. Non-numeric input normalizes to zero.
///
/// Scales above 28 are clamped to 28, the widest `Decimal` supports.
#[must_use]
pub fn normalize(value: &str, scale: u32) -> String {
    pin(parse_lenient(value), scale.min(28)).to_string()
}

/// Adds two decimal strings, returning the canonical sum at `scale`.
pub fn add(a: &str, b: &str, scale: u32) -> Result<String, FixedError> {
    parse_lenient(a)
        .checked_add(parse_lenient(b))
        .map(|sum| pin(sum, scale.min(28)).to_string())
        .ok_or(FixedError::Overflow)
}

/// Subtracts `b` from `a`, returning the canonical difference at `scale`.
pub fn sub(a: &str, b: &str, scale: u32) -> Result<String, FixedError> {
    parse_lenient(a)
        .checked_sub(parse_lenient(b))
        .map(|diff| pin(diff, scale.min(28)).to_string())
        .ok_or(FixedError::Overflow)
}

/// Multiplies two decimal strings exactly, truncating the product to `scale`.
pub fn mul(a: &str, b: &str, scale: u32) -> Result<String, FixedError> {
    mul_truncate(parse_lenient(a), parse_lenient(b), scale.min(28)).map(|p| p.to_string())
}

/// Numeric comparison of two decimal strings.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    parse_lenient(a).cmp(&parse_lenient(b))
}
