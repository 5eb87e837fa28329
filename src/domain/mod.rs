//! Domain layer: nested-set nodes, their storage backends and the nesting engine
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod error;
pub mod forest;
pub mod markup;
pub mod memory;
pub mod nested_set;
pub mod node;
pub mod policy;
pub mod position;
pub mod store;

pub use error::{NestError, NestResult};
pub use forest::{Forest, NodeId, MAX_BOUNDARY};
pub use markup::{Element, ElementRef, MarkupBounds};
pub use memory::FieldBounds;
pub use nested_set::NestedSet;
pub use node::NodeMut;
pub use policy::NestingPolicy;
pub use position::{resolve_insert, resolve_remove, Descriptor, Position, SortOrder};
pub use store::{Boundary, BoundaryStore};
