//! The scalar abstraction shared by the numeric and symbolic solvers.
//!
//! Every solver in this crate is written once, generically, against the
//! [`Field`] trait. Floating-point chains use the `f64` implementation;
//! exact chains use [`crate::symbolic::Expr`]. This replaces the obvious
//! alternative of maintaining two parallel solver implementations that must
//! be kept in lockstep.

use std::fmt;

/// The arithmetic capabilities a transition weight type must provide.
///
/// Implementations must form a field in the algebraic sense for the values
/// the solvers actually produce: addition, subtraction, multiplication and
/// division with the usual identities.
pub trait Field: Clone + PartialEq + fmt::Debug {
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    fn add(&self, other: &Self) -> Self;

    fn sub(&self, other: &Self) -> Self;

    fn mul(&self, other: &Self) -> Self;

    fn div(&self, other: &Self) -> Self;

    /// Whether this value is known to be zero.
    ///
    /// Symbolic implementations answer structurally: an expression that
    /// merely evaluates to zero for some bindings is not zero here.
    fn is_zero(&self) -> bool;

    /// The literal floating value, when this weight is a plain number.
    ///
    /// Used for range validation, overflow checks, and pivot selection.
    /// Opaque symbolic values return `None` and skip those checks.
    fn as_literal(&self) -> Option<f64>;
}

impl Field for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn div(&self, other: &Self) -> Self {
        self / other
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn as_literal(&self) -> Option<f64> {
        Some(*self)
    }
}

/// Sum a sequence of field values.
pub fn sum<'a, W: Field + 'a>(values: impl IntoIterator<Item = &'a W>) -> W {
    values
        .into_iter()
        .fold(W::zero(), |acc, value| acc.add(value))
}
