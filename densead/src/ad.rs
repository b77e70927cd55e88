//! The operation set shared by statically and dynamically sized
//! evaluations.
//!
//! Property code written against [`DenseAd`] works unchanged with
//! [`Evaluation`](crate::Evaluation), whose derivative count is a
//! const generic, and with
//! [`DynamicEvaluation`](crate::DynamicEvaluation), whose count is
//! chosen at construction.

use core::fmt::Debug;

use crate::error::ConfigError;
use crate::scalar::Scalar;
use crate::serialize::ElementSerializer;

/// A function value together with its first derivatives with respect
/// to a caller-defined set of independent variables.
///
/// Element 0 of the logical buffer is the value; elements `1..=size()`
/// are the derivatives, in the index space the caller assigns.
pub trait DenseAd: Clone + Debug + PartialEq {
    /// Element type of the value and the derivatives.
    type Scalar: Scalar;

    /// Derivative count fixed by the type, or `None` when it is chosen
    /// at construction.
    const STATIC_SIZE: Option<usize>;

    /// Number of derivatives.
    fn size(&self) -> usize;

    /// The function value.
    fn value(&self) -> Self::Scalar;

    /// Overwrites the function value; derivatives are left untouched.
    fn set_value(&mut self, value: Self::Scalar);

    /// All derivatives, in variable order.
    fn derivatives(&self) -> &[Self::Scalar];

    /// All derivatives, mutably.
    fn derivatives_mut(&mut self) -> &mut [Self::Scalar];

    /// Value and derivatives borrowed together, for kernels that update
    /// both.
    fn split_mut(&mut self) -> (&mut Self::Scalar, &mut [Self::Scalar]);

    /// An evaluation with the same number of derivatives as `x`; its
    /// contents are unspecified.
    fn create_blank(x: &Self) -> Self;

    /// A constant `value` with the same number of derivatives as `x`.
    fn create_constant_like(x: &Self, value: Self::Scalar) -> Self;

    /// The independent variable at `pos`, sized like `x`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= x.size()`.
    fn create_variable_like(x: &Self, value: Self::Scalar, pos: usize) -> Self;

    /// A constant whose derivative count is inferred from the type.
    ///
    /// Fails with [`ConfigError::MissingDerivativeCount`] when the type
    /// cannot provide one.
    fn try_constant(value: Self::Scalar) -> Result<Self, ConfigError>;

    /// The independent variable at `pos`, with the derivative count
    /// inferred from the type.
    ///
    /// Fails with [`ConfigError::MissingDerivativeCount`] when the type
    /// cannot provide one.
    fn try_variable(value: Self::Scalar, pos: usize) -> Result<Self, ConfigError>;

    /// A constant with `num_derivatives` derivatives.
    ///
    /// Fails with [`ConfigError::SizeMismatch`] when the type fixes a
    /// different count.
    fn constant_with_size(num_derivatives: usize, value: Self::Scalar)
        -> Result<Self, ConfigError>;

    /// The independent variable at `pos` among `num_derivatives`.
    ///
    /// Fails with [`ConfigError::SizeMismatch`] when the type fixes a
    /// different count.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= num_derivatives`.
    fn variable_with_size(
        num_derivatives: usize,
        value: Self::Scalar,
        pos: usize,
    ) -> Result<Self, ConfigError>;

    /// Derivative with respect to variable `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.size()`.
    #[inline]
    fn derivative(&self, idx: usize) -> Self::Scalar {
        assert_derivative_index(idx, self.size());
        self.derivatives()[idx]
    }

    /// Overwrites the derivative with respect to variable `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.size()`.
    #[inline]
    fn set_derivative(&mut self, idx: usize, derivative: Self::Scalar) {
        assert_derivative_index(idx, self.size());
        self.derivatives_mut()[idx] = derivative;
    }

    /// Sets every derivative to zero; the value is unchanged.
    #[inline]
    fn clear_derivatives(&mut self) {
        for d in self.derivatives_mut() {
            *d = <Self::Scalar as num_traits::Zero>::zero();
        }
    }

    /// Copies every derivative of `other`; the value is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    #[inline]
    fn copy_derivatives(&mut self, other: &Self) {
        assert_same_size(self.size(), other.size());
        self.derivatives_mut().copy_from_slice(other.derivatives());
    }

    /// Turns this evaluation into the constant `value`, keeping its
    /// size.
    #[inline]
    fn assign(&mut self, value: Self::Scalar) {
        self.set_value(value);
        self.clear_derivatives();
    }

    /// The constant zero, sized like `x`.
    #[inline]
    fn create_constant_zero(x: &Self) -> Self {
        Self::create_constant_like(x, <Self::Scalar as num_traits::Zero>::zero())
    }

    /// The constant one, sized like `x`.
    #[inline]
    fn create_constant_one(x: &Self) -> Self {
        Self::create_constant_like(x, <Self::Scalar as num_traits::One>::one())
    }

    /// Hands the value and then every derivative, in index order, to
    /// `serializer`.
    fn serialize_op<S>(&mut self, serializer: &mut S)
    where
        S: ElementSerializer<Self::Scalar> + ?Sized,
    {
        let (value, derivatives) = self.split_mut();
        serializer.element(value);
        for d in derivatives {
            serializer.element(d);
        }
    }
}

#[inline]
#[track_caller]
pub(crate) fn assert_same_size(lhs: usize, rhs: usize) {
    assert_eq!(
        lhs, rhs,
        "evaluations must have the same number of derivatives"
    );
}

#[inline]
#[track_caller]
pub(crate) fn assert_derivative_index(idx: usize, size: usize) {
    assert!(
        idx < size,
        "derivative index {idx} out of range for an evaluation with {size} derivatives"
    );
}
