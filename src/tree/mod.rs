//! Lazy navigation trees over the business object directory.
//!
//! [`HierarchicalTreeProvider`] is the single parametrized data source for
//! every tree view: it is configured with a root object and a
//! [`ContainmentRelation`] and answers one level at a time. [`ExpandedTree`]
//! sits on the consumer side and caches what has been expanded.

mod expanded;
mod notify;
mod provider;
mod render;

pub use expanded::*;
pub use notify::*;
pub use provider::*;
pub use render::*;
