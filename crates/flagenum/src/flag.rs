//! Arbitrary-precision flag values and the bit arithmetic behind every query.
//!
//! This module provides the `FlagValue` wrapper type around `num_bigint::BigUint`.
//! An enum can hold any number of members, so a member's flag (`1 << index`) quickly
//! outgrows a machine word; every flag is therefore a big integer from the start
//! rather than being promoted on overflow.
//!
//! The free functions [`bit_for`], [`is_subset`] and [`to_binary_string`] are the
//! whole arithmetic surface used by the engine. Everything else here is operator
//! plumbing so callers can combine flags with `|` and `&` the way they would with
//! plain integers.

use std::{
    fmt::{self, Display},
    ops::{BitAnd, BitOr, BitOrAssign},
};

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

/// Number of binary digits in one rendered group.
const BYTE_WIDTH: usize = 8;

/// Wrapper around `num_bigint::BigUint` holding a flag or a combination of flags.
///
/// A member's flag has exactly one bit set. Combinations (the bitwise OR of several
/// flags) use the same type, and the zero value is the flag of the sentinel member.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct FlagValue(BigUint);

/// Returns the single-bit flag for a zero-based position: `1 << index`.
#[must_use]
pub fn bit_for(index: usize) -> FlagValue {
    FlagValue(BigUint::one() << index)
}

/// Tests whether `value` is part of `subset`.
///
/// True when both are bit-for-bit identical or share at least one set bit. This is
/// an overlap test, not containment: `is_subset(a, b) == is_subset(b, a)` for all
/// inputs, and a multi-bit `value` counts as "in" whenever any of its bits is.
#[must_use]
pub fn is_subset(value: &FlagValue, subset: &FlagValue) -> bool {
    value == subset || !(&value.0 & &subset.0).is_zero()
}

/// Renders a flag in base 2, left-padded with zeros to a whole number of bytes.
///
/// The result is at least 8 characters long: `5` renders as `00000101` and
/// `1 << 8` as `0000000100000000`.
#[must_use]
pub fn to_binary_string(value: &FlagValue) -> String {
    let digits = value.0.to_str_radix(2);
    let width = digits.len().div_ceil(BYTE_WIDTH).max(1) * BYTE_WIDTH;
    format!("{digits:0>width$}")
}

impl FlagValue {
    /// Creates a new `FlagValue` from a `BigUint`.
    #[must_use]
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// The zero flag, carried by the sentinel member.
    #[must_use]
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Returns a reference to the inner `BigUint`.
    #[must_use]
    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    /// Consumes the flag and returns the inner `BigUint`.
    #[must_use]
    pub fn into_inner(self) -> BigUint {
        self.0
    }

    /// Checks if no bit is set.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u64 {
        self.0.count_ones()
    }

    /// True when exactly one bit is set, i.e. this is a single member's flag.
    #[must_use]
    pub fn is_single_bit(&self) -> bool {
        self.count_ones() == 1
    }

    /// Position of the lowest set bit, `None` for zero.
    ///
    /// For a single member's flag this is the member's index.
    #[must_use]
    pub fn position(&self) -> Option<u64> {
        self.0.trailing_zeros()
    }

    /// Tries to convert to u64.
    ///
    /// Returns `Some(u64)` if the value fits, `None` once the flag reaches bit 64.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    /// Method form of [`is_subset`]; returns false when `subset` is not flag-shaped.
    #[must_use]
    pub fn is_in(&self, subset: impl AsFlag) -> bool {
        subset.as_flag().is_some_and(|subset| is_subset(self, &subset))
    }

    /// Method form of [`to_binary_string`].
    #[must_use]
    pub fn to_binary_string(&self) -> String {
        to_binary_string(self)
    }
}

/// Anything that can be read as a flag operand.
///
/// Returns `None` when the value is not flag-shaped: negative integers and absent
/// values. Subset tests treat such operands as "not in".
pub trait AsFlag {
    /// Reads `self` as a flag, if it is one.
    fn as_flag(&self) -> Option<FlagValue>;
}

impl AsFlag for FlagValue {
    fn as_flag(&self) -> Option<FlagValue> {
        Some(self.clone())
    }
}

impl AsFlag for BigUint {
    fn as_flag(&self) -> Option<FlagValue> {
        Some(FlagValue(self.clone()))
    }
}

impl AsFlag for BigInt {
    fn as_flag(&self) -> Option<FlagValue> {
        self.to_biguint().map(FlagValue)
    }
}

impl<T: AsFlag + ?Sized> AsFlag for &T {
    fn as_flag(&self) -> Option<FlagValue> {
        (**self).as_flag()
    }
}

impl<T: AsFlag> AsFlag for Option<T> {
    fn as_flag(&self) -> Option<FlagValue> {
        self.as_ref().and_then(AsFlag::as_flag)
    }
}

macro_rules! unsigned_as_flag {
    ($($ty:ty),*) => {$(
        impl AsFlag for $ty {
            fn as_flag(&self) -> Option<FlagValue> {
                Some(FlagValue(BigUint::from(*self)))
            }
        }

        impl From<$ty> for FlagValue {
            fn from(value: $ty) -> Self {
                Self(BigUint::from(value))
            }
        }
    )*};
}

macro_rules! signed_as_flag {
    ($($ty:ty),*) => {$(
        impl AsFlag for $ty {
            fn as_flag(&self) -> Option<FlagValue> {
                u128::try_from(*self).ok().map(|value| FlagValue(BigUint::from(value)))
            }
        }
    )*};
}

unsigned_as_flag!(u8, u16, u32, u64, u128, usize);
signed_as_flag!(i8, i16, i32, i64, i128, isize);

impl From<BigUint> for FlagValue {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<FlagValue> for BigUint {
    fn from(value: FlagValue) -> Self {
        value.0
    }
}

// === Operators ===

impl BitOr for FlagValue {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<&FlagValue> for &FlagValue {
    type Output = FlagValue;

    fn bitor(self, rhs: &FlagValue) -> Self::Output {
        FlagValue(&self.0 | &rhs.0)
    }
}

impl BitOrAssign for FlagValue {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOrAssign<&FlagValue> for FlagValue {
    fn bitor_assign(&mut self, rhs: &FlagValue) {
        self.0 |= &rhs.0;
    }
}

impl BitAnd for FlagValue {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAnd<&FlagValue> for &FlagValue {
    type Output = FlagValue;

    fn bitand(self, rhs: &FlagValue) -> Self::Output {
        FlagValue(&self.0 & &rhs.0)
    }
}

impl Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Binary for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}
