//! Evaluations whose number of derivatives is fixed at compile time.
//!
//! An `Evaluation<T, N>` tracks a value and `N` partial derivatives
//! simultaneously, so a single pass through a residual expression
//! yields both the residual and its Jacobian row.
//!
//! # Mathematical Background
//!
//! For a function f: ℝⁿ → ℝ, `Evaluation<T, N>` represents f(x) and
//! ∇f(x) = [∂f/∂x₀, ..., ∂f/∂xₙ₋₁]. Arithmetic extends the scalar
//! operations:
//!
//! - `(a + ∇a) + (b + ∇b) = (a+b) + (∇a+∇b)`
//! - `(a + ∇a) - (b + ∇b) = (a-b) + (∇a-∇b)`
//! - `(a + ∇a) * (b + ∇b) = ab + (b∇a + a∇b)`
//! - `(a + ∇a) / (b + ∇b) = a/b + (b∇a - a∇b)/b²`
//!
//! A plain scalar operand behaves as a constant: it changes the value
//! only, except for `*` and `/`, which scale every derivative.
//!
//! # Example
//!
//! ```
//! use densead::{DenseAd, Evaluation};
//!
//! let x = Evaluation::<f64, 2>::variable(4.0, 0);
//! let y = Evaluation::<f64, 2>::variable(5.0, 1);
//! let z = x * y + 3.0;
//!
//! assert_eq!(z.value(), 23.0);
//! assert_eq!(z.derivative(0), 5.0); // ∂z/∂x = y
//! assert_eq!(z.derivative(1), 4.0); // ∂z/∂y = x
//! ```
//!
//! Loops over the derivative array have a compile-time trip count and
//! are unrolled per `N` by the optimiser. Nothing here allocates.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::ad::DenseAd;
use crate::check::check_defined;
use crate::error::ConfigError;
use crate::rules;
use crate::scalar::Scalar;

/// A function value and `N` partial derivatives.
///
/// # Type Parameters
///
/// - `T`: the element type (typically `f64` or `f32`)
/// - `N`: the number of independent variables
///
/// # Examples
///
/// ## Creating Variables
///
/// ```
/// use densead::{DenseAd, Evaluation};
///
/// // Pressure at position 0, saturation at position 1
/// let p = Evaluation::<f64, 2>::variable(200.0, 0);
/// assert_eq!(p.derivatives(), &[1.0, 0.0]);
///
/// let sw = Evaluation::<f64, 2>::variable(0.3, 1);
/// assert_eq!(sw.derivatives(), &[0.0, 1.0]);
///
/// // Constants carry no derivatives
/// let c = Evaluation::<f64, 2>::constant(2.0);
/// assert_eq!(c.derivatives(), &[0.0, 0.0]);
/// ```
///
/// ## Comparisons
///
/// Ordering looks at the value only, equality at the whole state:
///
/// ```
/// use densead::Evaluation;
///
/// let x = Evaluation::<f64, 2>::variable(1.0, 0);
/// let y = Evaluation::<f64, 2>::variable(1.0, 1);
///
/// assert!(x <= y && x >= y);
/// assert!(x != y);
/// assert!(x == 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation<T, const N: usize> {
    value: T,
    derivs: [T; N],
}

impl<T: Scalar, const N: usize> Evaluation<T, N> {
    /// Creates an evaluation with explicit value and derivatives.
    ///
    /// ```
    /// use densead::{DenseAd, Evaluation};
    ///
    /// let e = Evaluation::new(5.0, [1.0, 2.0, 3.0]);
    /// assert_eq!(e.value(), 5.0);
    /// assert_eq!(e.derivative(2), 3.0);
    /// ```
    #[inline]
    pub fn new(value: T, derivs: [T; N]) -> Self {
        check_defined(&derivs);
        Self { value, derivs }
    }

    /// Creates a constant (all derivatives are zero).
    #[inline]
    pub fn constant(value: T) -> Self {
        Self {
            value,
            derivs: [T::zero(); N],
        }
    }

    /// Creates the independent variable at `index`.
    ///
    /// Sets `derivs[index] = 1` and every other derivative to zero.
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[inline]
    pub fn variable(value: T, index: usize) -> Self {
        assert!(
            index < N,
            "variable index {} out of bounds for an evaluation with {} derivatives",
            index,
            N
        );
        let mut derivs = [T::zero(); N];
        derivs[index] = T::one();
        Self { value, derivs }
    }

    /// The derivatives as a fixed-size array.
    #[inline]
    pub fn derivative_array(&self) -> &[T; N] {
        &self.derivs
    }

    /// Splits into value and derivatives.
    #[inline]
    pub fn into_parts(self) -> (T, [T; N]) {
        (self.value, self.derivs)
    }
}

fn check_static_size<const N: usize>(requested: usize) -> Result<(), ConfigError> {
    if requested != N {
        tracing::debug!(
            expected = N,
            requested,
            "derivative count does not match the static evaluation size"
        );
        return Err(ConfigError::SizeMismatch {
            expected: N,
            requested,
        });
    }
    Ok(())
}

impl<T: Scalar, const N: usize> DenseAd for Evaluation<T, N> {
    type Scalar = T;

    const STATIC_SIZE: Option<usize> = Some(N);

    #[inline]
    fn size(&self) -> usize {
        N
    }

    #[inline]
    fn value(&self) -> T {
        self.value
    }

    #[inline]
    fn set_value(&mut self, value: T) {
        self.value = value;
    }

    #[inline]
    fn derivatives(&self) -> &[T] {
        &self.derivs
    }

    #[inline]
    fn derivatives_mut(&mut self) -> &mut [T] {
        &mut self.derivs
    }

    #[inline]
    fn split_mut(&mut self) -> (&mut T, &mut [T]) {
        (&mut self.value, &mut self.derivs)
    }

    #[inline]
    fn create_blank(_: &Self) -> Self {
        Self::default()
    }

    #[inline]
    fn create_constant_like(_: &Self, value: T) -> Self {
        Self::constant(value)
    }

    #[inline]
    fn create_variable_like(_: &Self, value: T, pos: usize) -> Self {
        Self::variable(value, pos)
    }

    #[inline]
    fn try_constant(value: T) -> Result<Self, ConfigError> {
        Ok(Self::constant(value))
    }

    #[inline]
    fn try_variable(value: T, pos: usize) -> Result<Self, ConfigError> {
        Ok(Self::variable(value, pos))
    }

    fn constant_with_size(num_derivatives: usize, value: T) -> Result<Self, ConfigError> {
        check_static_size::<N>(num_derivatives)?;
        Ok(Self::constant(value))
    }

    fn variable_with_size(
        num_derivatives: usize,
        value: T,
        pos: usize,
    ) -> Result<Self, ConfigError> {
        check_static_size::<N>(num_derivatives)?;
        Ok(Self::variable(value, pos))
    }
}

impl<T: Scalar, const N: usize> Default for Evaluation<T, N> {
    fn default() -> Self {
        Self::constant(T::zero())
    }
}

impl<T: Scalar, const N: usize> From<T> for Evaluation<T, N> {
    #[inline]
    fn from(value: T) -> Self {
        Self::constant(value)
    }
}

impl<T: Scalar, const N: usize> fmt::Display for Evaluation<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

impl<T: Scalar, const N: usize> PartialOrd for Evaluation<T, N> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<T: Scalar, const N: usize> AddAssign for Evaluation<T, N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        rules::add_assign(&mut self.value, &mut self.derivs, rhs.value, &rhs.derivs);
    }
}

impl<T: Scalar, const N: usize> SubAssign for Evaluation<T, N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        rules::sub_assign(&mut self.value, &mut self.derivs, rhs.value, &rhs.derivs);
    }
}

impl<T: Scalar, const N: usize> MulAssign for Evaluation<T, N> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        rules::mul_assign(&mut self.value, &mut self.derivs, rhs.value, &rhs.derivs);
    }
}

impl<T: Scalar, const N: usize> DivAssign for Evaluation<T, N> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        rules::div_assign(&mut self.value, &mut self.derivs, rhs.value, &rhs.derivs);
    }
}

/// Addition: `(a + ∇a) + (b + ∇b) = (a+b) + (∇a+∇b)`
impl<T: Scalar, const N: usize> Add for Evaluation<T, N> {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

/// Subtraction: `(a + ∇a) - (b + ∇b) = (a-b) + (∇a-∇b)`
impl<T: Scalar, const N: usize> Sub for Evaluation<T, N> {
    type Output = Self;

    #[inline]
    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

/// Multiplication: `(a + ∇a) * (b + ∇b) = ab + (b∇a + a∇b)`
///
/// ```
/// use densead::{DenseAd, Evaluation};
///
/// let x = Evaluation::<f64, 2>::variable(3.0, 0);
/// let y = Evaluation::<f64, 2>::variable(4.0, 1);
/// let product = x * y;
///
/// assert_eq!(product.value(), 12.0);
/// assert_eq!(product.derivatives(), &[4.0, 3.0]);
/// ```
impl<T: Scalar, const N: usize> Mul for Evaluation<T, N> {
    type Output = Self;

    #[inline]
    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

/// Division: `(a + ∇a) / (b + ∇b) = a/b + (b∇a - a∇b)/b²`
///
/// ```
/// use densead::{DenseAd, Evaluation};
///
/// let x = Evaluation::<f64, 2>::variable(6.0, 0);
/// let y = Evaluation::<f64, 2>::variable(2.0, 1);
/// let quotient = x / y;
///
/// assert_eq!(quotient.value(), 3.0);
/// assert_eq!(quotient.derivatives(), &[0.5, -1.5]);
/// ```
impl<T: Scalar, const N: usize> Div for Evaluation<T, N> {
    type Output = Self;

    #[inline]
    fn div(mut self, rhs: Self) -> Self {
        self /= rhs;
        self
    }
}

/// Negation: `-(a + ∇a) = -a + (-∇a)`
impl<T: Scalar, const N: usize> Neg for Evaluation<T, N> {
    type Output = Self;

    #[inline]
    fn neg(mut self) -> Self {
        rules::neg(&mut self.value, &mut self.derivs);
        self
    }
}

macro_rules! impl_scalar_ops {
    ($($t:ty),*) => {$(
        impl<const N: usize> AddAssign<$t> for Evaluation<$t, N> {
            #[inline]
            fn add_assign(&mut self, rhs: $t) {
                self.value += rhs;
            }
        }

        impl<const N: usize> SubAssign<$t> for Evaluation<$t, N> {
            #[inline]
            fn sub_assign(&mut self, rhs: $t) {
                self.value -= rhs;
            }
        }

        impl<const N: usize> MulAssign<$t> for Evaluation<$t, N> {
            #[inline]
            fn mul_assign(&mut self, rhs: $t) {
                rules::scale(&mut self.value, &mut self.derivs, rhs);
            }
        }

        impl<const N: usize> DivAssign<$t> for Evaluation<$t, N> {
            #[inline]
            fn div_assign(&mut self, rhs: $t) {
                rules::div_scalar(&mut self.value, &mut self.derivs, rhs);
            }
        }

        impl<const N: usize> Add<$t> for Evaluation<$t, N> {
            type Output = Self;

            #[inline]
            fn add(mut self, rhs: $t) -> Self {
                self += rhs;
                self
            }
        }

        impl<const N: usize> Sub<$t> for Evaluation<$t, N> {
            type Output = Self;

            #[inline]
            fn sub(mut self, rhs: $t) -> Self {
                self -= rhs;
                self
            }
        }

        impl<const N: usize> Mul<$t> for Evaluation<$t, N> {
            type Output = Self;

            #[inline]
            fn mul(mut self, rhs: $t) -> Self {
                self *= rhs;
                self
            }
        }

        impl<const N: usize> Div<$t> for Evaluation<$t, N> {
            type Output = Self;

            #[inline]
            fn div(mut self, rhs: $t) -> Self {
                self /= rhs;
                self
            }
        }

        impl<const N: usize> Add<Evaluation<$t, N>> for $t {
            type Output = Evaluation<$t, N>;

            #[inline]
            fn add(self, mut rhs: Evaluation<$t, N>) -> Evaluation<$t, N> {
                rhs += self;
                rhs
            }
        }

        impl<const N: usize> Sub<Evaluation<$t, N>> for $t {
            type Output = Evaluation<$t, N>;

            #[inline]
            fn sub(self, mut rhs: Evaluation<$t, N>) -> Evaluation<$t, N> {
                rules::scalar_sub(self, &mut rhs.value, &mut rhs.derivs);
                rhs
            }
        }

        impl<const N: usize> Mul<Evaluation<$t, N>> for $t {
            type Output = Evaluation<$t, N>;

            #[inline]
            fn mul(self, mut rhs: Evaluation<$t, N>) -> Evaluation<$t, N> {
                rhs *= self;
                rhs
            }
        }

        impl<const N: usize> Div<Evaluation<$t, N>> for $t {
            type Output = Evaluation<$t, N>;

            #[inline]
            fn div(self, mut rhs: Evaluation<$t, N>) -> Evaluation<$t, N> {
                rules::scalar_div(self, &mut rhs.value, &mut rhs.derivs);
                rhs
            }
        }

        impl<const N: usize> PartialEq<$t> for Evaluation<$t, N> {
            #[inline]
            fn eq(&self, other: &$t) -> bool {
                self.value == *other
            }
        }

        impl<const N: usize> PartialEq<Evaluation<$t, N>> for $t {
            #[inline]
            fn eq(&self, other: &Evaluation<$t, N>) -> bool {
                *self == other.value
            }
        }

        impl<const N: usize> PartialOrd<$t> for Evaluation<$t, N> {
            #[inline]
            fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                self.value.partial_cmp(other)
            }
        }

        impl<const N: usize> PartialOrd<Evaluation<$t, N>> for $t {
            #[inline]
            fn partial_cmp(&self, other: &Evaluation<$t, N>) -> Option<Ordering> {
                self.partial_cmp(&other.value)
            }
        }
    )*};
}

impl_scalar_ops!(f32, f64);
