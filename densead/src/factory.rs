//! Construction helpers that work for either evaluation variant, and
//! one-pass gradient drivers.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::ad::DenseAd;
use crate::error::ConfigError;
use crate::evaluation::Evaluation;
use crate::scalar::Scalar;

#[cfg(feature = "alloc")]
use crate::dynamic::DynamicEvaluation;

/// A constant `value` with `num_derivatives` zero derivatives.
///
/// Fails with [`ConfigError::SizeMismatch`] when `E` fixes a different
/// derivative count.
///
/// ```
/// use densead::{constant, DenseAd, Evaluation};
///
/// let c: Evaluation<f64, 2> = constant(2, 7.0).unwrap();
/// assert_eq!(c.derivatives(), &[0.0, 0.0]);
/// assert!(constant::<Evaluation<f64, 2>>(3, 7.0).is_err());
/// ```
#[inline]
pub fn constant<E: DenseAd>(num_derivatives: usize, value: E::Scalar) -> Result<E, ConfigError> {
    E::constant_with_size(num_derivatives, value)
}

/// The independent variable at `pos` among `num_derivatives`.
///
/// Fails with [`ConfigError::SizeMismatch`] when `E` fixes a different
/// derivative count.
///
/// # Panics
///
/// Panics if `pos >= num_derivatives`.
#[inline]
pub fn variable<E: DenseAd>(
    num_derivatives: usize,
    value: E::Scalar,
    pos: usize,
) -> Result<E, ConfigError> {
    E::variable_with_size(num_derivatives, value, pos)
}

/// Evaluates `f` and its gradient at `point` in a single forward pass.
///
/// Input `i` is seeded as the variable with unit derivative at index
/// `i`.
///
/// ```
/// use densead::{gradient, Evaluation};
///
/// // f(x, y) = x² + 2xy + y²
/// let f = |[x, y]: [Evaluation<f64, 2>; 2]| x * x + 2.0 * x * y + y * y;
///
/// let (value, grad) = gradient(f, [3.0, 4.0]);
/// assert_eq!(value, 49.0);
/// assert_eq!(grad, [14.0, 14.0]);
/// ```
pub fn gradient<T, F, const N: usize>(f: F, point: [T; N]) -> (T, [T; N])
where
    T: Scalar,
    F: FnOnce([Evaluation<T, N>; N]) -> Evaluation<T, N>,
{
    let vars = core::array::from_fn(|i| Evaluation::variable(point[i], i));
    f(vars).into_parts()
}

/// [`gradient`] for a point whose dimension is only known at run time.
///
/// ```
/// use densead::{dynamic_gradient, DynamicEvaluation};
///
/// let f = |v: &[DynamicEvaluation<f64>]| &v[0] * &v[1] + &v[2];
///
/// let (value, grad) = dynamic_gradient(f, &[2.0, 3.0, 4.0]);
/// assert_eq!(value, 10.0);
/// assert_eq!(grad, vec![3.0, 2.0, 1.0]);
/// ```
#[cfg(feature = "alloc")]
pub fn dynamic_gradient<T, F>(f: F, point: &[T]) -> (T, Vec<T>)
where
    T: Scalar,
    F: FnOnce(&[DynamicEvaluation<T>]) -> DynamicEvaluation<T>,
{
    let n = point.len();
    let vars: Vec<DynamicEvaluation<T>> = point
        .iter()
        .enumerate()
        .map(|(i, &v)| DynamicEvaluation::variable(n, v, i))
        .collect();
    let result = f(&vars);
    (result.value(), result.derivatives().to_vec())
}

/// The value and derivatives of `e`, as a residual and its Jacobian
/// row.
#[inline]
pub fn jacobian_row<E: DenseAd>(e: &E) -> (E::Scalar, &[E::Scalar]) {
    (e.value(), e.derivatives())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::AdMath;

    #[test]
    fn static_factories_check_the_count() {
        let v: Evaluation<f64, 3> = variable(3, 2.0, 1).unwrap();
        assert_eq!(v.derivatives(), &[0.0, 1.0, 0.0]);

        assert_eq!(
            variable::<Evaluation<f64, 3>>(4, 2.0, 1).unwrap_err(),
            ConfigError::SizeMismatch {
                expected: 3,
                requested: 4
            }
        );
    }

    #[test]
    fn gradient_of_rosenbrock_vanishes_at_minimum() {
        let rosenbrock = |[x, y]: [Evaluation<f64, 2>; 2]| {
            let a = 1.0 - x;
            let b = y - x * x;
            a * a + 100.0 * b * b
        };

        let (value, grad) = gradient(rosenbrock, [1.0, 1.0]);
        assert_eq!(value, 0.0);
        assert_eq!(grad, [0.0, 0.0]);

        let (_, grad) = gradient(rosenbrock, [0.0, 0.0]);
        assert_eq!(grad, [-2.0, 0.0]);
    }

    #[test]
    fn gradient_through_elementary_functions() {
        // f(x, y, z) = x² + y·e^z at (1, 2, 0)
        let f = |[x, y, z]: [Evaluation<f64, 3>; 3]| x * x + y * z.exp();
        let (value, grad) = gradient(f, [1.0, 2.0, 0.0]);

        assert_relative_eq!(value, 3.0);
        assert_relative_eq!(grad[0], 2.0);
        assert_relative_eq!(grad[1], 1.0);
        assert_relative_eq!(grad[2], 2.0);
    }

    #[test]
    fn jacobian_row_borrows_the_evaluation() {
        let e = Evaluation::<f64, 2>::new(1.5, [0.5, -0.5]);
        let (value, row) = jacobian_row(&e);
        assert_eq!(value, 1.5);
        assert_eq!(row, &[0.5, -0.5]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn dynamic_factories_never_fail_on_sized_paths() {
        let c: DynamicEvaluation<f64> = constant(5, 1.0).unwrap();
        assert_eq!(c.size(), 5);

        let v: DynamicEvaluation<f64> = variable(2, 1.0, 1).unwrap();
        assert_eq!(v.derivatives(), &[0.0, 1.0]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn dynamic_gradient_matches_static_gradient() {
        let (sv, sg) = gradient(
            |[x, y]: [Evaluation<f64, 2>; 2]| (x * y).sin() / y,
            [0.5, 2.0],
        );
        let (dv, dg) = dynamic_gradient(|v| (&v[0] * &v[1]).sin() / &v[1], &[0.5_f64, 2.0]);

        assert_eq!(sv, dv);
        assert_eq!(&sg[..], &dg[..]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn dynamic_gradient_of_an_empty_point_is_a_scalar() {
        let (value, grad) = dynamic_gradient(|_| DynamicEvaluation::<f64>::constant(0, 4.0), &[]);
        assert_eq!(value, 4.0);
        assert!(grad.is_empty());
    }
}
