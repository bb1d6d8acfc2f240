//! Domain models for the inventory navigator.
//!
//! # Core Concepts
//!
//! - [`InventoryObjectRef`]: identifies a business object by class name and id.
//!   The unit the tree provider and the directory exchange.
//! - [`InventoryClass`]: class metadata. Classes form an inheritance tree that
//!   drives subclass-aware action lookups.
//! - [`BusinessObject`]: a stored object with its containment position.
//! - [`SpecialRelationship`]: a secondary edge outside the containment tree.
//! - [`Pool`]: a named grouping of objects constrained to a class.

mod class;
mod object;
mod pool;
mod relationship;

pub use class::*;
pub use object::*;
pub use pool::*;
pub use relationship::*;
