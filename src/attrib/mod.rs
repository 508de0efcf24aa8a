//! Attribute schema and storage.
//!
//! - [`AttributeMap`] - ordered names with a hash lookup
//! - [`AttributeList`] - one data array per attribute and motion segment
//! - [`AttributeMerge`] - index translation for the union of two maps
//! - [`AttributeBuilder`] - zero-filled lists from textual declarations

mod map;
mod merge;
mod list;
mod builder;

pub use map::*;
pub use merge::*;
pub use list::*;
pub use builder::*;
