//! Debug-build validation that evaluation elements hold well-defined
//! values.
//!
//! Constructors and deserialisation paths hand every derivative
//! element to [`check_defined`]. With `debug_assertions` and the
//! `check-defined` feature both on, an element that reports itself as
//! undefined stops the program; in every other configuration the call
//! compiles to nothing and cannot change a computed result.

/// A scalar that can report whether it holds a well-defined value.
///
/// Implement this for custom element types. An implementation that
/// always returns `true` turns the check into a no-op.
pub trait CheckDefined {
    /// `false` when the element must not take part in arithmetic.
    fn is_defined(&self) -> bool;
}

impl CheckDefined for f64 {
    #[inline]
    fn is_defined(&self) -> bool {
        !self.is_nan()
    }
}

impl CheckDefined for f32 {
    #[inline]
    fn is_defined(&self) -> bool {
        !self.is_nan()
    }
}

/// Asserts that every element of `derivatives` is defined.
#[inline(always)]
pub(crate) fn check_defined<T: CheckDefined>(derivatives: &[T]) {
    #[cfg(all(debug_assertions, feature = "check-defined"))]
    for (idx, element) in derivatives.iter().enumerate() {
        assert!(
            element.is_defined(),
            "derivative {idx} of an evaluation is not a well-defined value"
        );
    }
    #[cfg(not(all(debug_assertions, feature = "check-defined")))]
    let _ = derivatives;
}

/// Index of the first derivative that fails the check, or `None` when
/// checking is compiled out.
#[cfg(feature = "serde")]
#[inline]
pub(crate) fn find_undefined<T: CheckDefined>(derivatives: &[T]) -> Option<usize> {
    if cfg!(all(debug_assertions, feature = "check-defined")) {
        derivatives.iter().position(|d| !d.is_defined())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_and_infinite_values_are_defined() {
        assert!(1.5_f64.is_defined());
        assert!(f64::INFINITY.is_defined());
        assert!((-0.0_f32).is_defined());
    }

    #[test]
    fn nan_is_not_defined() {
        assert!(!f64::NAN.is_defined());
        assert!(!f32::NAN.is_defined());
    }

    #[test]
    fn defined_slice_passes() {
        check_defined(&[0.0, 1.0, -2.5]);
        check_defined::<f64>(&[]);
    }

    #[cfg(all(debug_assertions, feature = "check-defined", feature = "serde"))]
    #[test]
    fn first_undefined_derivative_is_located() {
        assert_eq!(find_undefined(&[0.0, 1.0]), None);
        assert_eq!(find_undefined(&[0.0, f64::NAN, f64::NAN]), Some(1));
    }

    #[cfg(all(debug_assertions, feature = "check-defined"))]
    #[test]
    #[should_panic(expected = "derivative 1 of an evaluation is not a well-defined value")]
    fn nan_derivative_is_reported_in_debug_builds() {
        check_defined(&[0.0, f64::NAN]);
    }
}
