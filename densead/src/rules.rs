//! First-order differentiation rules on a split `(value, derivatives)`
//! representation.
//!
//! Both evaluation variants lower their arithmetic onto these
//! kernels, so the product, quotient and chain rules exist in exactly
//! one place. The kernels never allocate. Callers are responsible for
//! checking that paired derivative slices have equal length; the
//! kernels pair elements positionally.

use crate::scalar::Scalar;

/// `(u, u') += (v, v')`
#[inline(always)]
pub(crate) fn add_assign<T: Scalar>(u: &mut T, du: &mut [T], v: T, dv: &[T]) {
    *u = *u + v;
    for (a, &b) in du.iter_mut().zip(dv) {
        *a = *a + b;
    }
}

/// `(u, u') -= (v, v')`
#[inline(always)]
pub(crate) fn sub_assign<T: Scalar>(u: &mut T, du: &mut [T], v: T, dv: &[T]) {
    *u = *u - v;
    for (a, &b) in du.iter_mut().zip(dv) {
        *a = *a - b;
    }
}

/// Product rule: `(uv)' = u'v + uv'`, using the values before the
/// update.
#[inline(always)]
pub(crate) fn mul_assign<T: Scalar>(u: &mut T, du: &mut [T], v: T, dv: &[T]) {
    let uv = *u;
    for (a, &b) in du.iter_mut().zip(dv) {
        *a = *a * v + b * uv;
    }
    *u = uv * v;
}

/// Quotient rule: `(u/v)' = (vu' - uv') / v²`, derivatives first.
#[inline(always)]
pub(crate) fn div_assign<T: Scalar>(u: &mut T, du: &mut [T], v: T, dv: &[T]) {
    let uv = *u;
    let v2 = v * v;
    for (a, &b) in du.iter_mut().zip(dv) {
        *a = (v * *a - uv * b) / v2;
    }
    *u = uv / v;
}

/// Multiplies the value and every derivative by the constant `c`.
#[inline(always)]
pub(crate) fn scale<T: Scalar>(u: &mut T, du: &mut [T], c: T) {
    *u = *u * c;
    for a in du.iter_mut() {
        *a = *a * c;
    }
}

/// Divides by the constant `c` through its reciprocal.
#[inline(always)]
pub(crate) fn div_scalar<T: Scalar>(u: &mut T, du: &mut [T], c: T) {
    scale(u, du, T::one() / c);
}

/// `c - (u, u')`: the derivatives change sign.
#[inline(always)]
pub(crate) fn scalar_sub<T: Scalar>(c: T, u: &mut T, du: &mut [T]) {
    *u = c - *u;
    for a in du.iter_mut() {
        *a = -*a;
    }
}

/// `c / (u, u')`: derivative `-c u' / u²`.
#[inline(always)]
pub(crate) fn scalar_div<T: Scalar>(c: T, u: &mut T, du: &mut [T]) {
    let factor = -c / (*u * *u);
    for a in du.iter_mut() {
        *a = *a * factor;
    }
    *u = c / *u;
}

#[inline(always)]
pub(crate) fn neg<T: Scalar>(u: &mut T, du: &mut [T]) {
    *u = -*u;
    for a in du.iter_mut() {
        *a = -*a;
    }
}

/// Chain rule for `f(u)`: stores `f(u)` and scales every derivative by
/// `f'(u)`.
#[inline(always)]
pub(crate) fn chain<T: Scalar>(u: &mut T, du: &mut [T], f: T, df: T) {
    *u = f;
    for a in du.iter_mut() {
        *a = *a * df;
    }
}

/// Chain rule for `f(u, v)` with partials `f_u` and `f_v`:
/// `f' = f_u u' + f_v v'`.
#[inline(always)]
pub(crate) fn chain2<T: Scalar>(u: &mut T, du: &mut [T], dv: &[T], f: T, f_u: T, f_v: T) {
    *u = f;
    for (a, &b) in du.iter_mut().zip(dv) {
        *a = f_u * *a + f_v * b;
    }
}
