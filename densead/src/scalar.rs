//! The element type stored in evaluations.

use core::fmt::{Debug, Display};

use num_traits::{Float, FloatConst};

use crate::check::CheckDefined;

/// Element type of an evaluation: the value and every derivative are
/// stored as `Scalar`s.
///
/// Blanket-implemented; in practice this is `f64` or `f32`.
pub trait Scalar:
    Float + FloatConst + CheckDefined + Debug + Display + Send + Sync + 'static
{
}

impl<T> Scalar for T where
    T: Float + FloatConst + CheckDefined + Debug + Display + Send + Sync + 'static
{
}
