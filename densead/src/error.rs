//! Errors reported by evaluation construction and element traversal.
//!
//! Size mismatches between operands and out-of-range derivative
//! indices are precondition violations and panic instead; the types
//! here cover caller-usage errors that are detectable at the
//! construction site.

use thiserror::Error;

/// An evaluation was requested with a derivative count it cannot
/// represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A run-time sized evaluation was constructed without stating
    /// how many derivatives it carries.
    #[error(
        "dynamically sized evaluations require that the number of derivatives \
         is specified when creating an evaluation"
    )]
    MissingDerivativeCount,

    /// A statically sized evaluation was asked for a different number
    /// of derivatives than its type fixes.
    #[error(
        "this statically sized evaluation can only represent objects with \
         {expected} derivatives, but {requested} were requested"
    )]
    SizeMismatch {
        /// Derivative count fixed by the type.
        expected: usize,
        /// Derivative count asked for by the caller.
        requested: usize,
    },
}

/// Restoring an evaluation from a flat element buffer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// The buffer ran out before every element was restored.
    #[error("element buffer underflow: {needed} elements needed, {available} available")]
    Underflow {
        /// Elements required.
        needed: usize,
        /// Elements available.
        available: usize,
    },

    /// Elements were left over after the traversal finished.
    #[error("{0} trailing elements left in the buffer")]
    TrailingElements(usize),
}
