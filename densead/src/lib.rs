//! Dense forward-mode automatic differentiation.
//!
//! An evaluation is a function value together with its partial
//! derivatives with respect to a fixed set of independent variables.
//! Arithmetic on evaluations applies the chain rule element by
//! element, so evaluating a residual expression once yields both the
//! residual and its Jacobian row.
//!
//! Two variants share one operation set, the [`DenseAd`] trait:
//!
//! - [`Evaluation`]: the number of derivatives is a const generic.
//!   Storage is an inline array and nothing allocates.
//! - [`DynamicEvaluation`]: the number of derivatives is chosen at run
//!   time. Small buffers stay inline, larger ones spill to the heap.
//!
//! # Statically sized evaluations
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
//! # Run-time sized evaluations
//!
//! ```
//! use densead::{DenseAd, DynamicEvaluation};
//!
//! let n = 3;
//! let p = DynamicEvaluation::<f64>::variable(n, 2.0, 0);
//! let s = DynamicEvaluation::<f64>::variable(n, 0.25, 2);
//! let mobility = &p * &s / 0.5;
//!
//! assert_eq!(mobility.value(), 1.0);
//! assert_eq!(mobility.derivatives(), &[0.5, 0.0, 4.0]);
//! ```
//!
//! # Gradients
//!
//! [`gradient`] seeds one variable per input and runs a closure once:
//!
//! ```
//! use densead::{gradient, AdMath, Evaluation};
//!
//! // f(x, y) = x·sin(y)
//! let f = |[x, y]: [Evaluation<f64, 2>; 2]| x * y.sin();
//!
//! let (value, grad) = gradient(f, [2.0, 0.0]);
//! assert_eq!(value, 0.0);
//! assert_eq!(grad, [0.0, 2.0]);
//! ```
//!
//! # Features
//!
//! - `std` (default): implies `alloc`.
//! - `alloc`: enables [`DynamicEvaluation`], [`Packer`] and
//!   [`dynamic_gradient`].
//! - `serde` (default): serialises evaluations as flat sequences.
//! - `check-defined` (default): in debug builds, constructors reject
//!   derivatives that are not well-defined values.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod ad;
pub mod check;
#[cfg(feature = "alloc")]
pub mod dynamic;
pub mod error;
pub mod evaluation;
pub mod factory;
pub mod math;
mod rules;
pub mod scalar;
pub mod serialize;
#[cfg(feature = "alloc")]
pub mod storage;

pub use ad::DenseAd;
pub use check::CheckDefined;
#[cfg(feature = "alloc")]
pub use dynamic::DynamicEvaluation;
pub use error::{ConfigError, SerializeError};
pub use evaluation::Evaluation;
#[cfg(feature = "alloc")]
pub use factory::dynamic_gradient;
pub use factory::{constant, gradient, jacobian_row, variable};
pub use math::AdMath;
pub use scalar::Scalar;
#[cfg(feature = "alloc")]
pub use serialize::Packer;
pub use serialize::{ElementSerializer, Unpacker};
#[cfg(feature = "alloc")]
pub use storage::{FastSmallVector, DEFAULT_INLINE_CAPACITY};
