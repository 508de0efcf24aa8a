//! # geoprim
//!
//! Columnar geometry attributes and primitive refinement.
//!
//! Geometry data lives in typed, tuple-valued data arrays shared through
//! reference-counted handles. Views (constants, gathers, sub-ranges,
//! concatenations, ranges, random values) compose without copying and can be
//! hardened into flat arrays at any time. Attributes are grouped in lists
//! sharing one name map, and primitives carrying those lists refine into
//! simpler primitives until only drawable ones remain.
//!
//! ## Modules
//!
//! - [`util`] - Storage kinds, numeric conversion, type info, errors, math
//! - [`array`] - Data array trait and every storage backend and view
//! - [`attrib`] - Attribute map, list, merge and declaration builder
//! - [`prim`] - Primitives, refiners and the fixed-point refinement driver
//! - [`parms`] - Refine parameters
//! - [`provider`] - Seam to an external geometry detail
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use geoprim::prelude::*;
//!
//! let sphere = Quadric::new(QuadricKind::Sphere, Mat4::IDENTITY);
//! let root: PrimitiveHandle = Arc::new(Primitive::Quadric(sphere));
//! let result = refine_primitive(root, &RefineParms::new());
//! assert!(!result.truncated);
//! assert_eq!(result.primitives[0].kind_name(), "polygon_mesh");
//! ```

pub mod util;
pub mod array;
pub mod attrib;
pub mod prim;
pub mod parms;
pub mod provider;

// Re-export commonly used types
pub use util::{Error, Result, Scalar, Status, Storage, TypeInfo};
pub use array::{DataArray, DataArrayExt, DataArrayHandle};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BBox3f, Error, Mat4, Numeric, Result, Scalar, Status, Storage, TypeInfo, Vec3};
    pub use crate::array::*;
    pub use crate::attrib::*;
    pub use crate::prim::*;
    pub use crate::parms::{FacesetMode, RefineParms, ViewportLod};
    pub use crate::provider::{GeometryProvider, IndexMapping, MemoryProvider};
}
