//! Element-wise traversal for checkpointing, and serde support.
//!
//! [`DenseAd::serialize_op`] hands the value and then every derivative,
//! in index order, to an [`ElementSerializer`]. The order is the
//! in-memory order, so packing an evaluation and unpacking the result
//! into an evaluation of the same size restores it bit for bit.
//!
//! ```
//! use densead::{DenseAd, Evaluation, Packer, Unpacker};
//!
//! let mut x = Evaluation::<f64, 2>::new(1.5, [0.25, -3.0]);
//! let mut packer = Packer::new();
//! packer.pack(&mut x);
//! let elements = packer.into_inner();
//! assert_eq!(elements, vec![1.5, 0.25, -3.0]);
//!
//! let mut restored = Evaluation::<f64, 2>::default();
//! let mut unpacker = Unpacker::new(&elements);
//! unpacker.unpack(&mut restored).unwrap();
//! unpacker.finish().unwrap();
//! assert_eq!(restored, x);
//! ```
//!
//! With the `serde` feature both evaluation types serialise as a flat
//! sequence `[value, d0, d1, ...]`.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::ad::DenseAd;
use crate::check::{check_defined, CheckDefined};
use crate::error::SerializeError;

/// Receives evaluation elements one at a time.
///
/// The same traversal serves both directions: a writer reads
/// `*element`, a reader overwrites it.
///
/// Any `FnMut(&mut T)` closure is a serializer:
///
/// ```
/// use densead::{DenseAd, Evaluation};
///
/// let mut x = Evaluation::<f64, 2>::variable(3.0, 1);
/// let mut sum = 0.0;
/// x.serialize_op(&mut |e: &mut f64| sum += *e);
/// assert_eq!(sum, 4.0);
/// ```
pub trait ElementSerializer<T> {
    /// Visits one element; called once per element in buffer order.
    fn element(&mut self, element: &mut T);
}

impl<T, F> ElementSerializer<T> for F
where
    F: FnMut(&mut T),
{
    #[inline]
    fn element(&mut self, element: &mut T) {
        self(element)
    }
}

/// Appends every visited element to a buffer.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Default)]
pub struct Packer<T> {
    elements: Vec<T>,
}

#[cfg(feature = "alloc")]
impl<T: Copy> Packer<T> {
    /// Creates an empty packer.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Creates an empty packer with room for `capacity` elements, e.g.
    /// `count * (size + 1)` for `count` evaluations of `size`
    /// derivatives.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Appends the elements of `e`.
    pub fn pack<E>(&mut self, e: &mut E) -> &mut Self
    where
        E: DenseAd<Scalar = T>,
    {
        e.serialize_op(self);
        self
    }

    /// The elements packed so far.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Consumes the packer and returns its buffer.
    pub fn into_inner(self) -> Vec<T> {
        self.elements
    }
}

#[cfg(feature = "alloc")]
impl<T: Copy> ElementSerializer<T> for Packer<T> {
    #[inline]
    fn element(&mut self, element: &mut T) {
        self.elements.push(*element);
    }
}

/// Restores visited elements from a slice, in order.
///
/// [`unpack`](Self::unpack) only writes to an evaluation when the
/// buffer holds all of its elements. Used directly as an
/// [`ElementSerializer`], running past the end of the slice leaves the
/// remaining elements untouched and [`finish`](Self::finish) reports
/// it.
#[derive(Debug)]
pub struct Unpacker<'a, T> {
    elements: &'a [T],
    visited: usize,
}

impl<'a, T: Copy + CheckDefined> Unpacker<'a, T> {
    /// Creates an unpacker reading `elements` from the start.
    pub fn new(elements: &'a [T]) -> Self {
        Self {
            elements,
            visited: 0,
        }
    }

    /// Overwrites the elements of `e` with the next `e.size() + 1`
    /// buffered ones.
    ///
    /// Fails with [`SerializeError::Underflow`] and leaves `e` untouched
    /// when fewer elements remain.
    ///
    /// ```
    /// use densead::{DenseAd, Evaluation, SerializeError, Unpacker};
    ///
    /// let mut x = Evaluation::<f64, 2>::constant(9.0);
    /// let mut unpacker = Unpacker::new(&[1.0, 2.0]);
    /// assert_eq!(
    ///     unpacker.unpack(&mut x).unwrap_err(),
    ///     SerializeError::Underflow { needed: 3, available: 2 }
    /// );
    /// assert_eq!(x, Evaluation::constant(9.0));
    /// ```
    pub fn unpack<E>(&mut self, e: &mut E) -> Result<&mut Self, SerializeError>
    where
        E: DenseAd<Scalar = T>,
    {
        let needed = e.size() + 1;
        let available = self.remaining();
        if available < needed {
            tracing::debug!(needed, available, "element buffer underflow");
            return Err(SerializeError::Underflow { needed, available });
        }
        e.serialize_op(self);
        check_defined(e.derivatives());
        Ok(self)
    }

    /// Elements not yet consumed.
    pub fn remaining(&self) -> usize {
        self.elements.len().saturating_sub(self.visited)
    }

    /// Checks that the traversal consumed the buffer exactly.
    pub fn finish(self) -> Result<(), SerializeError> {
        let available = self.elements.len();
        if self.visited > available {
            tracing::debug!(needed = self.visited, available, "element buffer underflow");
            return Err(SerializeError::Underflow {
                needed: self.visited,
                available,
            });
        }
        if self.visited < available {
            tracing::debug!(trailing = available - self.visited, "unconsumed elements");
            return Err(SerializeError::TrailingElements(available - self.visited));
        }
        Ok(())
    }
}

impl<T: Copy> ElementSerializer<T> for Unpacker<'_, T> {
    #[inline]
    fn element(&mut self, element: &mut T) {
        if let Some(&stored) = self.elements.get(self.visited) {
            *element = stored;
        }
        self.visited += 1;
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use core::fmt;
    use core::marker::PhantomData;

    use serde::de::{Deserialize, Deserializer, Error, IgnoredAny, SeqAccess, Visitor};
    use serde::ser::{Serialize, SerializeSeq, SerializeTuple, Serializer};

    use crate::ad::DenseAd;
    use crate::check::find_undefined;
    use crate::evaluation::Evaluation;
    use crate::scalar::Scalar;

    fn undefined_derivative<E: Error>(idx: usize) -> E {
        E::custom(format_args!(
            "derivative {idx} of an evaluation is not a well-defined value"
        ))
    }

    impl<T, const N: usize> Serialize for Evaluation<T, N>
    where
        T: Scalar + Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut tuple = serializer.serialize_tuple(N + 1)?;
            tuple.serialize_element(&self.value())?;
            for d in self.derivatives() {
                tuple.serialize_element(d)?;
            }
            tuple.end()
        }
    }

    struct EvaluationVisitor<T, const N: usize>(PhantomData<T>);

    impl<'de, T, const N: usize> Visitor<'de> for EvaluationVisitor<T, N>
    where
        T: Scalar + Deserialize<'de>,
    {
        type Value = Evaluation<T, N>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a sequence of {} elements", N + 1)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let value: T = seq
                .next_element()?
                .ok_or_else(|| Error::invalid_length(0, &self))?;
            let mut derivs = [T::zero(); N];
            for (i, d) in derivs.iter_mut().enumerate() {
                *d = seq
                    .next_element()?
                    .ok_or_else(|| Error::invalid_length(i + 1, &self))?;
            }
            if seq.next_element::<IgnoredAny>()?.is_some() {
                return Err(Error::invalid_length(N + 2, &self));
            }
            if let Some(idx) = find_undefined(&derivs) {
                return Err(undefined_derivative(idx));
            }
            Ok(Evaluation::new(value, derivs))
        }
    }

    /// Expects exactly `N + 1` elements. With `check-defined` in a
    /// debug build, an undefined derivative is reported as an error.
    impl<'de, T, const N: usize> Deserialize<'de> for Evaluation<T, N>
    where
        T: Scalar + Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_tuple(N + 1, EvaluationVisitor::<T, N>(PhantomData))
        }
    }

    #[cfg(feature = "alloc")]
    mod dynamic {
        use alloc::vec::Vec;

        use super::*;
        use crate::dynamic::DynamicEvaluation;

        // Caps preallocation from untrusted size hints.
        const MAX_PREALLOCATED: usize = 4096;

        impl<T, const INLINE: usize> Serialize for DynamicEvaluation<T, INLINE>
        where
            T: Scalar + Serialize,
        {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let elements = self.elements();
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for e in elements {
                    seq.serialize_element(e)?;
                }
                seq.end()
            }
        }

        struct DynamicVisitor<T, const INLINE: usize>(PhantomData<T>);

        impl<'de, T, const INLINE: usize> Visitor<'de> for DynamicVisitor<T, INLINE>
        where
            T: Scalar + Deserialize<'de>,
        {
            type Value = DynamicEvaluation<T, INLINE>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-empty sequence of elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let hint = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATED);
                let mut elements: Vec<T> = Vec::with_capacity(hint);
                while let Some(e) = seq.next_element()? {
                    elements.push(e);
                }
                if elements.is_empty() {
                    return Err(Error::invalid_length(0, &self));
                }
                if let Some(idx) = find_undefined(&elements[1..]) {
                    return Err(undefined_derivative(idx));
                }
                Ok(DynamicEvaluation::from_elements(&elements))
            }
        }

        /// Takes its size from the sequence length, which must be at
        /// least one. With `check-defined` in a debug build, an
        /// undefined derivative is reported as an error.
        impl<'de, T, const INLINE: usize> Deserialize<'de> for DynamicEvaluation<T, INLINE>
        where
            T: Scalar + Deserialize<'de>,
        {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_seq(DynamicVisitor::<T, INLINE>(PhantomData))
            }
        }
    }
}
