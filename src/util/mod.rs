//! Utility types shared by every layer.
//!
//! - [`Storage`] - physical scalar kind of an array
//! - [`Numeric`] / [`Scalar`] - width-generic component conversion
//! - [`TypeInfo`] - semantic interpretation of a tuple
//! - [`Error`] / [`Result`] / [`Status`] - error handling
//! - Math type re-exports from glam

mod storage;
mod numeric;
mod type_info;
mod error;
mod status;
mod math;

pub use storage::*;
pub use numeric::*;
pub use type_info::*;
pub use error::*;
pub use status::*;
pub use math::*;
