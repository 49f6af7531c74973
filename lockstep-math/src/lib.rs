//! # lockstep-math
//!
//! Deterministic Q31.32 fixed-point arithmetic for lockstep simulation.
//!
//! This crate provides [`Fix64`] — a scalar wrapping one signed 64-bit raw
//! value (represented number = raw / 2^32, ~2.3e-10 precision, range
//! approximately [-2^31, 2^31)). Every operation is a pure function over
//! immutable values and produces bit-identical results across platforms and
//! compilers, which is what replay files and networked lockstep require.
//!
//! Key items:
//! - [`Fix64`]: the value type, its named constants and conversions
//! - [`FixedError`]: domain and divide-by-zero errors
//! - checked operators saturate to `MAX`/`MIN` on overflow; the
//!   `wrapping_*` / `fast_*` variants skip the checks entirely (a documented
//!   speed/safety trade-off, unsound under overflow)
//! - trigonometry via lookup-table interpolation, inverse trig and
//!   logarithms/exponentials via convergent series
//!
//! **Minimal external dependencies** (only `thiserror` for error types) —
//! auditable in isolation.

pub mod fixed_point;
pub mod ops;
pub mod series;
pub mod sqrt;
pub mod trig;

pub use fixed_point::{Fix64, FixedError, ParseFixedError};
