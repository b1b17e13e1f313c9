//! Utility types and functions.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam plus bitwise float helpers

mod error;
mod math;

pub use error::*;
pub use math::*;
