//! Elementary functions of evaluations.
//!
//! [`AdMath`] is implemented for every [`DenseAd`] type. Each function
//! computes `f(u)` on the value and scales every derivative by
//! `f'(u)`, so results carry exact first derivatives through
//! arbitrary compositions.
//!
//! ```
//! use densead::{AdMath, DenseAd, Evaluation};
//!
//! let x = Evaluation::<f64, 1>::variable(0.0, 0);
//! let y = x.sin() + x.exp();
//!
//! assert_eq!(y.value(), 1.0);
//! assert_eq!(y.derivative(0), 2.0); // cos(0) + e^0
//! ```

use num_traits::{Float, FloatConst, One, Zero};

use crate::ad::{assert_same_size, DenseAd};
use crate::rules;

/// Applies `f` with derivative `df` to a copy of `x`.
#[inline]
fn unary<E: DenseAd>(x: &E, f: E::Scalar, df: E::Scalar) -> E {
    let mut result = x.clone();
    let (u, du) = result.split_mut();
    rules::chain(u, du, f, df);
    result
}

/// Applies `f(x, y)` with partials `f_x` and `f_y`.
#[inline]
#[track_caller]
fn binary<E: DenseAd>(x: &E, y: &E, f: E::Scalar, f_x: E::Scalar, f_y: E::Scalar) -> E {
    assert_same_size(x.size(), y.size());
    let mut result = x.clone();
    let (u, du) = result.split_mut();
    rules::chain2(u, du, y.derivatives(), f, f_x, f_y);
    result
}

/// Elementary functions with forward-mode derivatives.
pub trait AdMath: DenseAd {
    /// `1 / x`
    fn recip(&self) -> Self {
        let u = self.value();
        unary(self, u.recip(), -(u * u).recip())
    }

    /// `e^x`
    fn exp(&self) -> Self {
        let f = self.value().exp();
        unary(self, f, f)
    }

    /// Natural logarithm.
    fn ln(&self) -> Self {
        let u = self.value();
        unary(self, u.ln(), u.recip())
    }

    /// Base-10 logarithm.
    fn log10(&self) -> Self {
        let u = self.value();
        unary(self, u.log10(), (u * Self::Scalar::LN_10()).recip())
    }

    /// Square root; the derivative is `1 / (2√x)`.
    fn sqrt(&self) -> Self {
        let f = self.value().sqrt();
        unary(self, f, (f + f).recip())
    }

    /// Sine.
    ///
    /// ```
    /// use densead::{AdMath, DenseAd, Evaluation};
    ///
    /// let x = Evaluation::<f64, 1>::variable(0.0, 0);
    /// assert_eq!(x.sin().derivative(0), 1.0);
    /// ```
    fn sin(&self) -> Self {
        let (s, c) = self.value().sin_cos();
        unary(self, s, c)
    }

    /// Cosine; the derivative is `-sin(x)`.
    fn cos(&self) -> Self {
        let (s, c) = self.value().sin_cos();
        unary(self, c, -s)
    }

    /// Tangent; the derivative is `1 + tan²(x)`.
    fn tan(&self) -> Self {
        let f = self.value().tan();
        unary(self, f, Self::Scalar::one() + f * f)
    }

    /// Arcsine; the derivative is `1 / √(1 - x²)`.
    fn asin(&self) -> Self {
        let u = self.value();
        unary(self, u.asin(), (Self::Scalar::one() - u * u).sqrt().recip())
    }

    /// Arccosine; the derivative is `-1 / √(1 - x²)`.
    fn acos(&self) -> Self {
        let u = self.value();
        unary(self, u.acos(), -(Self::Scalar::one() - u * u).sqrt().recip())
    }

    /// Arctangent; the derivative is `1 / (1 + x²)`.
    fn atan(&self) -> Self {
        let u = self.value();
        unary(self, u.atan(), (Self::Scalar::one() + u * u).recip())
    }

    /// Absolute value; derivatives flip sign where the value is
    /// negative.
    fn abs(&self) -> Self {
        if self.value() < Self::Scalar::zero() {
            unary(self, -self.value(), -Self::Scalar::one())
        } else {
            self.clone()
        }
    }

    /// `x^n` for an integer exponent.
    ///
    /// ```
    /// use densead::{AdMath, DenseAd, Evaluation};
    ///
    /// let x = Evaluation::<f64, 1>::variable(2.0, 0);
    /// let cube = x.powi(3);
    /// assert_eq!(cube.value(), 8.0);
    /// assert_eq!(cube.derivative(0), 12.0);
    /// ```
    fn powi(&self, n: i32) -> Self {
        let u = self.value();
        let f = u.powi(n);
        // `n - 1` overflows for `i32::MIN`; fall back to `u^n / u` there.
        let lowered = match n.checked_sub(1) {
            Some(m) => u.powi(m),
            None => f / u,
        };
        let df = match n {
            0 => Self::Scalar::zero(),
            _ => scalar_from_i32::<Self::Scalar>(n) * lowered,
        };
        unary(self, f, df)
    }

    /// `x^e` for a constant exponent. A zero base yields zero
    /// derivatives.
    fn powf(&self, exp: Self::Scalar) -> Self {
        let u = self.value();
        let f = u.powf(exp);
        if u == Self::Scalar::zero() {
            unary(self, f, Self::Scalar::zero())
        } else {
            unary(self, f, exp * u.powf(exp - Self::Scalar::one()))
        }
    }

    /// `x^y` with both operands differentiated. A zero base yields zero
    /// derivatives.
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    #[track_caller]
    fn pow(&self, exp: &Self) -> Self {
        let u = self.value();
        let v = exp.value();
        let f = u.powf(v);
        if u == Self::Scalar::zero() {
            let zero = Self::Scalar::zero();
            binary(self, exp, f, zero, zero)
        } else {
            binary(self, exp, f, v * u.powf(v - Self::Scalar::one()), u.ln() * f)
        }
    }

    /// Four-quadrant arctangent of `self / x`.
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    #[track_caller]
    fn atan2(&self, x: &Self) -> Self {
        let a = self.value();
        let b = x.value();
        let r2 = a * a + b * b;
        binary(self, x, a.atan2(b), b / r2, -a / r2)
    }

    /// The operand with the larger value; ties return `other`.
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    #[track_caller]
    fn max(&self, other: &Self) -> Self {
        assert_same_size(self.size(), other.size());
        if self.value() > other.value() {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// The operand with the smaller value; ties return `other`.
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    #[track_caller]
    fn min(&self, other: &Self) -> Self {
        assert_same_size(self.size(), other.size());
        if self.value() < other.value() {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// `max(self, c)` where `c` is a constant.
    fn max_scalar(&self, c: Self::Scalar) -> Self {
        if self.value() > c {
            self.clone()
        } else {
            Self::create_constant_like(self, c)
        }
    }

    /// `min(self, c)` where `c` is a constant.
    fn min_scalar(&self, c: Self::Scalar) -> Self {
        if self.value() < c {
            self.clone()
        } else {
            Self::create_constant_like(self, c)
        }
    }
}

impl<E: DenseAd> AdMath for E {}

#[inline]
fn scalar_from_i32<T: Float>(n: i32) -> T {
    num_traits::cast::<i32, T>(n).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::Evaluation;

    type E2 = Evaluation<f64, 2>;

    fn x_at(v: f64) -> E2 {
        E2::variable(v, 0)
    }

    #[test]
    fn exp_and_ln_are_inverse() {
        let x = x_at(1.5);
        let y = x.exp().ln();
        assert_relative_eq!(y.value(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(y.derivative(0), 1.0, epsilon = 1e-12);
        assert_eq!(y.derivative(1), 0.0);
    }

    #[test]
    fn log10_derivative() {
        let x = x_at(100.0);
        let y = x.log10();
        assert_relative_eq!(y.value(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            y.derivative(0),
            1.0 / (100.0 * core::f64::consts::LN_10),
            epsilon = 1e-15
        );
    }

    #[test]
    fn sqrt_and_recip() {
        let x = x_at(4.0);
        let s = x.sqrt();
        assert_eq!(s.value(), 2.0);
        assert_eq!(s.derivative(0), 0.25);

        let r = x.recip();
        assert_eq!(r.value(), 0.25);
        assert_eq!(r.derivative(0), -1.0 / 16.0);
    }

    #[test]
    fn trigonometric_derivatives() {
        let v = 0.7;
        let x = x_at(v);
        assert_relative_eq!(x.sin().derivative(0), v.cos(), epsilon = 1e-12);
        assert_relative_eq!(x.cos().derivative(0), -v.sin(), epsilon = 1e-12);
        assert_relative_eq!(
            x.tan().derivative(0),
            1.0 / (v.cos() * v.cos()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn inverse_trigonometric_derivatives() {
        let v: f64 = 0.3;
        let x = x_at(v);
        let root = (1.0 - v * v).sqrt();
        assert_relative_eq!(x.asin().derivative(0), 1.0 / root, epsilon = 1e-12);
        assert_relative_eq!(x.acos().derivative(0), -1.0 / root, epsilon = 1e-12);
        assert_relative_eq!(x.atan().derivative(0), 1.0 / (1.0 + v * v), epsilon = 1e-12);
    }

    #[test]
    fn abs_flips_negative_values() {
        let neg = E2::new(-3.0, [1.0, -2.0]);
        let a = neg.abs();
        assert_eq!(a.value(), 3.0);
        assert_eq!(a.derivatives(), &[-1.0, 2.0]);

        let pos = E2::new(3.0, [1.0, -2.0]);
        assert_eq!(pos.abs(), pos);
    }

    #[test]
    fn powers() {
        let x = x_at(2.0);
        let cube = x.powi(3);
        assert_eq!(cube.value(), 8.0);
        assert_eq!(cube.derivative(0), 12.0);
        assert_eq!(x.powi(0).value(), 1.0);
        assert_eq!(x.powi(0).derivative(0), 0.0);

        let p = x.powf(0.5);
        assert_relative_eq!(p.value(), 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(p.derivative(0), 0.5 / 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn most_negative_integer_exponent_does_not_overflow() {
        let at_one = E2::variable(1.0, 0).powi(i32::MIN);
        assert_eq!(at_one.value(), 1.0);
        assert_eq!(at_one.derivative(0), f64::from(i32::MIN));

        let at_two = E2::variable(2.0, 0).powi(i32::MIN);
        assert_eq!(at_two.value(), 0.0);
        assert_eq!(at_two.derivative(0), 0.0);
        assert_eq!(at_two.derivative(1), 0.0);
    }

    #[test]
    fn unit_constants_feed_the_derivative_formulas() {
        // tan, asin, acos and atan all build their derivative from one.
        let x = x_at(0.0);
        assert_eq!(x.tan().derivative(0), 1.0);
        assert_eq!(x.asin().derivative(0), 1.0);
        assert_eq!(x.acos().derivative(0), -1.0);
        assert_eq!(x.atan().derivative(0), 1.0);
        assert_eq!(x_at(-0.5).abs().derivative(0), -1.0);
    }

    #[test]
    fn zero_base_power_has_zero_derivatives() {
        let x = x_at(0.0);
        let p = x.powf(0.5);
        assert_eq!(p.value(), 0.0);
        assert_eq!(p.derivatives(), &[0.0, 0.0]);

        let y = E2::variable(2.0, 1);
        let q = x.pow(&y);
        assert_eq!(q.value(), 0.0);
        assert_eq!(q.derivatives(), &[0.0, 0.0]);
    }

    #[test]
    fn general_power_differentiates_both_operands() {
        let x = E2::variable(2.0, 0);
        let y = E2::variable(3.0, 1);
        let p = x.pow(&y);
        assert_relative_eq!(p.value(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(p.derivative(0), 12.0, epsilon = 1e-12);
        assert_relative_eq!(p.derivative(1), 8.0 * 2f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn atan2_partials() {
        let y = E2::variable(1.0, 0);
        let x = E2::variable(1.0, 1);
        let a = y.atan2(&x);
        assert_relative_eq!(a.value(), core::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(a.derivative(0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(a.derivative(1), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn max_and_min_pick_whole_operands() {
        let a = E2::variable(1.0, 0);
        let b = E2::variable(2.0, 1);
        assert_eq!(a.max(&b), b);
        assert_eq!(a.min(&b), a);

        let tie = E2::variable(1.0, 1);
        assert_eq!(a.max(&tie), tie);
        assert_eq!(a.min(&tie), tie);

        assert_eq!(a.max_scalar(0.5), a);
        assert_eq!(a.max_scalar(3.0), E2::constant(3.0));
        assert_eq!(a.min_scalar(0.5), E2::constant(0.5));
    }

    #[test]
    fn chain_rule_through_composition() {
        // f(x, y) = sin(x * y) at (2, 3)
        let x = E2::variable(2.0, 0);
        let y = E2::variable(3.0, 1);
        let f = (x * y).sin();
        let c = 6f64.cos();
        assert_relative_eq!(f.derivative(0), 3.0 * c, epsilon = 1e-12);
        assert_relative_eq!(f.derivative(1), 2.0 * c, epsilon = 1e-12);
    }

    #[cfg(feature = "alloc")]
    #[test]
    #[should_panic(expected = "evaluations must have the same number of derivatives")]
    fn binary_functions_check_sizes() {
        use crate::DynamicEvaluation;

        let a = DynamicEvaluation::<f64>::variable(2, 1.0, 0);
        let b = DynamicEvaluation::<f64>::variable(3, 1.0, 0);
        let _ = a.atan2(&b);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn dynamic_evaluations_share_the_rules() {
        use crate::DynamicEvaluation;

        let x = DynamicEvaluation::<f64>::variable(3, 0.5, 2);
        let y = x.exp();
        assert_relative_eq!(y.derivative(2), 0.5f64.exp(), epsilon = 1e-12);
        assert_eq!(y.derivative(0), 0.0);
    }
}
