//! Evaluations whose number of derivatives is chosen at run time.
//!
//! [`DynamicEvaluation`] offers the same operations as
//! [`Evaluation`](crate::Evaluation) but stores its elements in a
//! [`FastSmallVector`]: the value at index 0 and the derivatives
//! after it. Buffers of up to `INLINE` elements live inline and cost
//! no allocation; larger ones spill to the heap.
//!
//! Every construction site that does not copy its size from an
//! existing evaluation must state the derivative count. Operations
//! between evaluations of different sizes panic; there is no implicit
//! resize.
//!
//! ```
//! use densead::{DenseAd, DynamicEvaluation};
//!
//! let x = DynamicEvaluation::<f64>::variable(2, 4.0, 0);
//! let y = DynamicEvaluation::<f64>::variable(2, 5.0, 1);
//! let z = &x * &y + 3.0;
//!
//! assert_eq!(z.value(), 23.0);
//! assert_eq!(z.derivatives(), &[5.0, 4.0]);
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::ad::{assert_derivative_index, assert_same_size, DenseAd};
use crate::check::check_defined;
use crate::error::ConfigError;
use crate::rules;
use crate::scalar::Scalar;
use crate::storage::{FastSmallVector, DEFAULT_INLINE_CAPACITY};

/// A function value and a run-time number of partial derivatives.
///
/// `INLINE` is the number of elements (value included) kept inline
/// before the buffer moves to the heap.
#[derive(Clone)]
pub struct DynamicEvaluation<T, const INLINE: usize = DEFAULT_INLINE_CAPACITY> {
    data: FastSmallVector<T, INLINE>,
}

impl<T: Scalar, const INLINE: usize> DynamicEvaluation<T, INLINE> {
    /// Creates an evaluation with `num_derivatives` derivatives whose
    /// contents callers must not rely on.
    #[inline]
    pub fn blank(num_derivatives: usize) -> Self {
        Self {
            data: FastSmallVector::from_elem(T::zero(), 1 + num_derivatives),
        }
    }

    /// Creates a constant with `num_derivatives` zero derivatives.
    #[inline]
    pub fn constant(num_derivatives: usize, value: T) -> Self {
        let mut e = Self::blank(num_derivatives);
        e.data[0] = value;
        check_defined(e.derivatives());
        e
    }

    /// Creates the independent variable at `pos` among
    /// `num_derivatives`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= num_derivatives`.
    #[inline]
    pub fn variable(num_derivatives: usize, value: T, pos: usize) -> Self {
        assert!(
            pos < num_derivatives,
            "variable index {} out of bounds for an evaluation with {} derivatives",
            pos,
            num_derivatives
        );
        let mut e = Self::constant(num_derivatives, value);
        e.data[1 + pos] = T::one();
        e
    }

    /// Creates an evaluation from its value and derivatives.
    pub fn new(value: T, derivatives: &[T]) -> Self {
        check_defined(derivatives);
        let mut data = FastSmallVector::from_elem(value, 1 + derivatives.len());
        data[1..].copy_from_slice(derivatives);
        Self { data }
    }

    /// Creates an evaluation from its flat element buffer: the value
    /// followed by the derivatives.
    ///
    /// # Panics
    ///
    /// Panics if `elements` is empty.
    pub fn from_elements(elements: &[T]) -> Self {
        assert!(
            !elements.is_empty(),
            "an evaluation needs at least its value element"
        );
        check_defined(&elements[1..]);
        Self {
            data: FastSmallVector::from_slice(elements),
        }
    }

    /// The flat element buffer: the value followed by the derivatives.
    #[inline]
    pub fn elements(&self) -> &[T] {
        self.data.as_slice()
    }

    /// `true` when the elements live on the heap.
    #[inline]
    pub fn spilled(&self) -> bool {
        self.data.spilled()
    }

    #[inline]
    #[track_caller]
    fn check_size(&self, other: &Self) {
        assert_same_size(self.size(), other.size());
    }
}

impl<T: Scalar, const INLINE: usize> DenseAd for DynamicEvaluation<T, INLINE> {
    type Scalar = T;

    const STATIC_SIZE: Option<usize> = None;

    #[inline]
    fn size(&self) -> usize {
        self.data.len() - 1
    }

    #[inline]
    fn value(&self) -> T {
        self.data[0]
    }

    #[inline]
    fn set_value(&mut self, value: T) {
        self.data[0] = value;
    }

    #[inline]
    fn derivatives(&self) -> &[T] {
        &self.data[1..]
    }

    #[inline]
    fn derivatives_mut(&mut self) -> &mut [T] {
        &mut self.data[1..]
    }

    #[inline]
    fn split_mut(&mut self) -> (&mut T, &mut [T]) {
        let (head, tail) = self.data.as_mut_slice().split_at_mut(1);
        (&mut head[0], tail)
    }

    #[inline]
    fn create_blank(x: &Self) -> Self {
        Self::blank(x.size())
    }

    #[inline]
    fn create_constant_like(x: &Self, value: T) -> Self {
        Self::constant(x.size(), value)
    }

    #[inline]
    fn create_variable_like(x: &Self, value: T, pos: usize) -> Self {
        Self::variable(x.size(), value, pos)
    }

    fn try_constant(_value: T) -> Result<Self, ConfigError> {
        tracing::debug!("constant requested without a derivative count");
        Err(ConfigError::MissingDerivativeCount)
    }

    fn try_variable(_value: T, pos: usize) -> Result<Self, ConfigError> {
        tracing::debug!(pos, "variable requested without a derivative count");
        Err(ConfigError::MissingDerivativeCount)
    }

    #[inline]
    fn constant_with_size(num_derivatives: usize, value: T) -> Result<Self, ConfigError> {
        Ok(Self::constant(num_derivatives, value))
    }

    #[inline]
    fn variable_with_size(
        num_derivatives: usize,
        value: T,
        pos: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self::variable(num_derivatives, value, pos))
    }

    #[inline]
    fn derivative(&self, idx: usize) -> T {
        assert_derivative_index(idx, self.size());
        self.data[1 + idx]
    }

    #[inline]
    fn set_derivative(&mut self, idx: usize, derivative: T) {
        assert_derivative_index(idx, self.size());
        self.data[1 + idx] = derivative;
    }

    fn serialize_op<S>(&mut self, serializer: &mut S)
    where
        S: crate::serialize::ElementSerializer<T> + ?Sized,
    {
        for element in self.data.iter_mut() {
            serializer.element(element);
        }
    }
}

impl<T: Scalar, const INLINE: usize> Default for DynamicEvaluation<T, INLINE> {
    fn default() -> Self {
        Self::constant(0, T::zero())
    }
}

impl<T: Scalar, const INLINE: usize> fmt::Debug for DynamicEvaluation<T, INLINE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicEvaluation")
            .field("value", &self.value())
            .field("derivs", &self.derivatives())
            .finish()
    }
}

impl<T: Scalar, const INLINE: usize> fmt::Display for DynamicEvaluation<T, INLINE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

/// Compares every element.
///
/// # Panics
///
/// Panics if the sizes differ.
impl<T: Scalar, const INLINE: usize> PartialEq for DynamicEvaluation<T, INLINE> {
    fn eq(&self, other: &Self) -> bool {
        self.check_size(other);
        self.data.as_slice() == other.data.as_slice()
    }
}

/// Orders by value only.
///
/// # Panics
///
/// Panics if the sizes differ.
impl<T: Scalar, const INLINE: usize> PartialOrd for DynamicEvaluation<T, INLINE> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.check_size(other);
        self.value().partial_cmp(&other.value())
    }
}

impl<T: Scalar, const INLINE: usize> AddAssign<&DynamicEvaluation<T, INLINE>>
    for DynamicEvaluation<T, INLINE>
{
    #[inline]
    fn add_assign(&mut self, rhs: &Self) {
        self.check_size(rhs);
        let (u, du) = self.split_mut();
        rules::add_assign(u, du, rhs.value(), rhs.derivatives());
    }
}

impl<T: Scalar, const INLINE: usize> SubAssign<&DynamicEvaluation<T, INLINE>>
    for DynamicEvaluation<T, INLINE>
{
    #[inline]
    fn sub_assign(&mut self, rhs: &Self) {
        self.check_size(rhs);
        let (u, du) = self.split_mut();
        rules::sub_assign(u, du, rhs.value(), rhs.derivatives());
    }
}

impl<T: Scalar, const INLINE: usize> MulAssign<&DynamicEvaluation<T, INLINE>>
    for DynamicEvaluation<T, INLINE>
{
    #[inline]
    fn mul_assign(&mut self, rhs: &Self) {
        self.check_size(rhs);
        let (u, du) = self.split_mut();
        rules::mul_assign(u, du, rhs.value(), rhs.derivatives());
    }
}

impl<T: Scalar, const INLINE: usize> DivAssign<&DynamicEvaluation<T, INLINE>>
    for DynamicEvaluation<T, INLINE>
{
    #[inline]
    fn div_assign(&mut self, rhs: &Self) {
        self.check_size(rhs);
        let (u, du) = self.split_mut();
        rules::div_assign(u, du, rhs.value(), rhs.derivatives());
    }
}

// Owned and borrowed operand combinations, all lowered onto the
// `OpAssign<&Self>` impls above.
macro_rules! forward_binop {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl<T: Scalar, const INLINE: usize> $OpAssign for DynamicEvaluation<T, INLINE> {
            #[inline]
            fn $op_assign(&mut self, rhs: Self) {
                $OpAssign::$op_assign(self, &rhs);
            }
        }

        impl<T: Scalar, const INLINE: usize> $Op for DynamicEvaluation<T, INLINE> {
            type Output = Self;

            #[inline]
            fn $op(mut self, rhs: Self) -> Self {
                $OpAssign::$op_assign(&mut self, &rhs);
                self
            }
        }

        impl<T: Scalar, const INLINE: usize> $Op<&DynamicEvaluation<T, INLINE>>
            for DynamicEvaluation<T, INLINE>
        {
            type Output = Self;

            #[inline]
            fn $op(mut self, rhs: &Self) -> Self {
                $OpAssign::$op_assign(&mut self, rhs);
                self
            }
        }

        impl<T: Scalar, const INLINE: usize> $Op<DynamicEvaluation<T, INLINE>>
            for &DynamicEvaluation<T, INLINE>
        {
            type Output = DynamicEvaluation<T, INLINE>;

            #[inline]
            fn $op(self, rhs: DynamicEvaluation<T, INLINE>) -> DynamicEvaluation<T, INLINE> {
                let mut result = self.clone();
                $OpAssign::$op_assign(&mut result, &rhs);
                result
            }
        }

        impl<T: Scalar, const INLINE: usize> $Op<&DynamicEvaluation<T, INLINE>>
            for &DynamicEvaluation<T, INLINE>
        {
            type Output = DynamicEvaluation<T, INLINE>;

            #[inline]
            fn $op(self, rhs: &DynamicEvaluation<T, INLINE>) -> DynamicEvaluation<T, INLINE> {
                let mut result = self.clone();
                $OpAssign::$op_assign(&mut result, rhs);
                result
            }
        }
    };
}

forward_binop!(Add, add, AddAssign, add_assign);
forward_binop!(Sub, sub, SubAssign, sub_assign);
forward_binop!(Mul, mul, MulAssign, mul_assign);
forward_binop!(Div, div, DivAssign, div_assign);

impl<T: Scalar, const INLINE: usize> Neg for DynamicEvaluation<T, INLINE> {
    type Output = Self;

    #[inline]
    fn neg(mut self) -> Self {
        let (u, du) = self.split_mut();
        rules::neg(u, du);
        self
    }
}

impl<T: Scalar, const INLINE: usize> Neg for &DynamicEvaluation<T, INLINE> {
    type Output = DynamicEvaluation<T, INLINE>;

    #[inline]
    fn neg(self) -> DynamicEvaluation<T, INLINE> {
        -self.clone()
    }
}

macro_rules! impl_scalar_ops {
    (@rhs $t:ty, $Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl<const INLINE: usize> $Op<$t> for DynamicEvaluation<$t, INLINE> {
            type Output = Self;

            #[inline]
            fn $op(mut self, rhs: $t) -> Self {
                $OpAssign::$op_assign(&mut self, rhs);
                self
            }
        }

        impl<const INLINE: usize> $Op<$t> for &DynamicEvaluation<$t, INLINE> {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn $op(self, rhs: $t) -> DynamicEvaluation<$t, INLINE> {
                let mut result = self.clone();
                $OpAssign::$op_assign(&mut result, rhs);
                result
            }
        }
    };

    ($($t:ty),*) => {$(
        impl<const INLINE: usize> AddAssign<$t> for DynamicEvaluation<$t, INLINE> {
            #[inline]
            fn add_assign(&mut self, rhs: $t) {
                self.data[0] += rhs;
            }
        }

        impl<const INLINE: usize> SubAssign<$t> for DynamicEvaluation<$t, INLINE> {
            #[inline]
            fn sub_assign(&mut self, rhs: $t) {
                self.data[0] -= rhs;
            }
        }

        impl<const INLINE: usize> MulAssign<$t> for DynamicEvaluation<$t, INLINE> {
            #[inline]
            fn mul_assign(&mut self, rhs: $t) {
                let (u, du) = self.split_mut();
                rules::scale(u, du, rhs);
            }
        }

        impl<const INLINE: usize> DivAssign<$t> for DynamicEvaluation<$t, INLINE> {
            #[inline]
            fn div_assign(&mut self, rhs: $t) {
                let (u, du) = self.split_mut();
                rules::div_scalar(u, du, rhs);
            }
        }

        impl_scalar_ops!(@rhs $t, Add, add, AddAssign, add_assign);
        impl_scalar_ops!(@rhs $t, Sub, sub, SubAssign, sub_assign);
        impl_scalar_ops!(@rhs $t, Mul, mul, MulAssign, mul_assign);
        impl_scalar_ops!(@rhs $t, Div, div, DivAssign, div_assign);

        impl<const INLINE: usize> Add<DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn add(self, mut rhs: DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                rhs += self;
                rhs
            }
        }

        impl<const INLINE: usize> Sub<DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn sub(self, mut rhs: DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                let (u, du) = rhs.split_mut();
                rules::scalar_sub(self, u, du);
                rhs
            }
        }

        impl<const INLINE: usize> Mul<DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn mul(self, mut rhs: DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                rhs *= self;
                rhs
            }
        }

        impl<const INLINE: usize> Div<DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn div(self, mut rhs: DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                let (u, du) = rhs.split_mut();
                rules::scalar_div(self, u, du);
                rhs
            }
        }

        impl<const INLINE: usize> Add<&DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn add(self, rhs: &DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                self + rhs.clone()
            }
        }

        impl<const INLINE: usize> Sub<&DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn sub(self, rhs: &DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                self - rhs.clone()
            }
        }

        impl<const INLINE: usize> Mul<&DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn mul(self, rhs: &DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                self * rhs.clone()
            }
        }

        impl<const INLINE: usize> Div<&DynamicEvaluation<$t, INLINE>> for $t {
            type Output = DynamicEvaluation<$t, INLINE>;

            #[inline]
            fn div(self, rhs: &DynamicEvaluation<$t, INLINE>) -> DynamicEvaluation<$t, INLINE> {
                self / rhs.clone()
            }
        }

        impl<const INLINE: usize> PartialEq<$t> for DynamicEvaluation<$t, INLINE> {
            #[inline]
            fn eq(&self, other: &$t) -> bool {
                self.value() == *other
            }
        }

        impl<const INLINE: usize> PartialEq<DynamicEvaluation<$t, INLINE>> for $t {
            #[inline]
            fn eq(&self, other: &DynamicEvaluation<$t, INLINE>) -> bool {
                *self == other.value()
            }
        }

        impl<const INLINE: usize> PartialOrd<$t> for DynamicEvaluation<$t, INLINE> {
            #[inline]
            fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                self.value().partial_cmp(other)
            }
        }

        impl<const INLINE: usize> PartialOrd<DynamicEvaluation<$t, INLINE>> for $t {
            #[inline]
            fn partial_cmp(&self, other: &DynamicEvaluation<$t, INLINE>) -> Option<Ordering> {
                self.partial_cmp(&other.value())
            }
        }
    )*};
}

impl_scalar_ops!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    type Eval = DynamicEvaluation<f64>;

    #[test]
    fn scenario_product_plus_constant() {
        let x = Eval::variable(2, 4.0, 0);
        let y = Eval::variable(2, 5.0, 1);
        let z = &x * &y + 3.0;

        assert_eq!(z.value(), 23.0);
        assert_eq!(z.derivative(0), 5.0);
        assert_eq!(z.derivative(1), 4.0);
    }

    #[test]
    fn variable_sets_a_single_unit_derivative() {
        let x = Eval::variable(5, -2.0, 3);
        assert_eq!(x.size(), 5);
        assert_eq!(x.value(), -2.0);
        assert_eq!(x.derivatives(), &[0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn product_rule_touches_only_the_seeded_positions() {
        let a = Eval::variable(4, 2.5, 0);
        let b = Eval::variable(4, -1.5, 2);
        let p = &a * &b;

        assert_eq!(p.derivative(0), b.value());
        assert_eq!(p.derivative(2), a.value());
        assert_eq!(p.derivative(1), 0.0);
        assert_eq!(p.derivative(3), 0.0);
    }

    #[test]
    fn scalar_over_variable_follows_reciprocal_rule() {
        let x = Eval::variable(3, 4.0, 1);
        let q = 2.0 / &x;

        assert_eq!(q.value(), 0.5);
        assert_eq!(q.derivative(1), -2.0 / 16.0);
        assert_eq!(q.derivative(0), 0.0);
    }

    #[test]
    fn addition_and_subtraction_are_linear() {
        let a = Eval::new(3.0, &[1.0, -2.0, 0.5]);
        let b = Eval::new(4.0, &[0.25, 2.0, 7.0]);

        let sum = &a + &b;
        let diff = &a - &b;
        for i in 0..3 {
            assert_eq!(sum.derivative(i), a.derivative(i) + b.derivative(i));
            assert_eq!(diff.derivative(i), a.derivative(i) - b.derivative(i));
        }
    }

    #[test]
    fn owned_and_borrowed_operands_agree() {
        let x = Eval::variable(2, 3.0, 0);
        let y = Eval::variable(2, 4.0, 1);

        let by_ref = &x / &y;
        assert_eq!(x.clone() / y.clone(), by_ref);
        assert_eq!(x.clone() / &y, by_ref);
        assert_eq!(&x / y.clone(), by_ref);

        let mut acc = x.clone();
        acc /= &y;
        assert_eq!(acc, by_ref);

        assert_eq!(-&x, -x.clone());
        assert_eq!((-&x).derivatives(), &[-1.0, 0.0]);
    }

    #[test]
    fn scalar_operands_are_constants() {
        let x = Eval::new(2.0, &[1.0, 3.0]);

        assert_eq!((&x + 1.0).derivatives(), x.derivatives());
        assert_eq!((&x - 1.0).value(), 1.0);
        assert_eq!((&x * 2.0).derivatives(), &[2.0, 6.0]);
        assert_eq!((&x / 2.0).derivatives(), &[0.5, 1.5]);
        assert_eq!((5.0 - &x).derivatives(), &[-1.0, -3.0]);
        assert_eq!(2.0 * &x, &x * 2.0);
        assert_eq!(1.0 + x.clone(), x + 1.0);
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_arithmetic() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 1.0, 0);
        let _ = &x + &y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_subtraction() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let _ = &x - &y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_multiplication() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let _ = &x * &y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_division() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let _ = &x / &y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_owned_operands() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let _ = x * y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_add_assign() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let mut x = x;
        x += &y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_sub_assign() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let mut x = x;
        x -= y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_mul_assign() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let mut x = x;
        x *= &y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_div_assign() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(3, 2.0, 1);
        let mut x = x;
        x /= y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_equality() {
        let x = Eval::constant(2, 1.0);
        let y = Eval::constant(3, 1.0);
        let _ = x == y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_ordering() {
        let x = Eval::constant(2, 1.0);
        let y = Eval::constant(3, 2.0);
        let _ = x < y;
    }

    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn mismatched_sizes_panic_on_copy_derivatives() {
        let mut x = Eval::constant(2, 1.0);
        x.copy_derivatives(&Eval::constant(1, 0.0));
    }

    #[test]
    fn zero_derivatives_behave_like_a_scalar() {
        let x = Eval::constant(0, 3.0);
        let y = &x * &x + 1.0;
        assert_eq!(y.value(), 10.0);
        assert_eq!(y.size(), 0);
        assert!(y.derivatives().is_empty());
    }

    #[test]
    #[should_panic(expected = "derivative index 0 out of range for an evaluation with 0 derivatives")]
    fn zero_derivatives_have_no_accessible_slot() {
        let x = Eval::constant(0, 3.0);
        let _ = x.derivative(0);
    }

    #[test]
    fn missing_count_is_a_configuration_error() {
        assert_eq!(
            Eval::try_variable(1.0, 0).unwrap_err(),
            ConfigError::MissingDerivativeCount
        );
        assert_eq!(
            Eval::try_constant(1.0).unwrap_err(),
            ConfigError::MissingDerivativeCount
        );
        assert_eq!(Eval::STATIC_SIZE, None);

        let v = Eval::variable_with_size(3, 1.0, 2).unwrap();
        assert_eq!(v, Eval::variable(3, 1.0, 2));
    }

    #[test]
    fn factories_copy_the_size_of_the_template() {
        let x = Eval::new(-3.0, &[5.0, 6.0, 7.0]);

        let zero = Eval::create_constant_zero(&x);
        assert_eq!(zero.value(), 0.0);
        assert_eq!(zero.derivatives(), &[0.0; 3]);

        let one = Eval::create_constant_one(&x);
        assert_eq!(one.value(), 1.0);
        assert_eq!(one.derivatives(), &[0.0; 3]);

        assert_eq!(Eval::create_blank(&x).size(), 3);
        assert_eq!(
            Eval::create_variable_like(&x, 2.0, 1).derivatives(),
            &[0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn ordering_uses_value_and_equality_uses_everything() {
        let x = Eval::variable(2, 1.0, 0);
        let y = Eval::variable(2, 1.0, 1);

        assert!(x != y);
        assert!(x <= y && x >= y);
        assert!(x == 1.0 && 1.0 == x);
        assert!(x < 2.0 && 0.0 < x);
    }

    #[test]
    fn assign_and_setters_keep_the_size() {
        let mut x = Eval::variable(3, 1.0, 1);
        x.assign(4.0);
        assert_eq!(x, Eval::constant(3, 4.0));

        x.set_derivative(2, -1.0);
        x.set_value(5.0);
        assert_eq!(x.elements(), &[5.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn large_evaluations_spill_and_stay_correct() {
        let n = 40;
        let x = DynamicEvaluation::<f64, 8>::variable(n, 2.0, 0);
        let y = DynamicEvaluation::<f64, 8>::variable(n, 3.0, n - 1);
        assert!(x.spilled());

        let moved = x;
        let p = &moved * &y;
        assert_eq!(p.value(), 6.0);
        assert_eq!(p.derivative(0), 3.0);
        assert_eq!(p.derivative(n - 1), 2.0);
        assert!(p.derivatives()[1..n - 1].iter().all(|&d| d == 0.0));

        let small = DynamicEvaluation::<f64, 8>::variable(7, 2.0, 0);
        assert!(!small.spilled());
    }

    #[test]
    fn debug_lists_value_and_derivatives() {
        let x = Eval::variable(2, 1.5, 1);
        assert_eq!(
            format!("{x:?}"),
            "DynamicEvaluation { value: 1.5, derivs: [0.0, 1.0] }"
        );
        assert_eq!(format!("{x}"), "1.5");
    }

    #[test]
    fn default_is_a_scalar_zero() {
        let d = Eval::default();
        assert_eq!(d.size(), 0);
        assert_eq!(d.value(), 0.0);
    }
}
