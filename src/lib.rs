//! Nested-set encoded trees.
//!
//! Every node carries `(left, right, level)` such that an ancestor's
//! interval strictly contains its descendants' intervals and `level` is the
//! depth below the root. A [`Forest`](domain::Forest) keeps these values
//! consistent either on every mutation ([`NestingPolicy::AutoNest`](domain::NestingPolicy))
//! or on demand through [`updated_nesting`](domain::Forest::updated_nesting).
//!
//! ```
//! use nestset::domain::{FieldBounds, Forest, NestingPolicy, Position};
//!
//! let mut forest = Forest::with_nesting(NestingPolicy::AutoNest);
//! let root = forest.create_node(FieldBounds::default());
//! let a = forest.create_node(FieldBounds::unset());
//! let b = forest.create_node(FieldBounds::unset());
//! forest
//!     .add_descendant(root, a, Position::First)?
//!     .add_descendant(root, b, Position::Last)?;
//!
//! assert_eq!((forest.left(a)?, forest.right(a)?, forest.level(a)?), (1, 2, 1));
//! assert_eq!((forest.left(b)?, forest.right(b)?, forest.level(b)?), (3, 4, 1));
//! assert_eq!(forest.right(root)?, 5);
//! # Ok::<(), nestset::domain::NestError>(())
//! ```

pub mod config;
pub mod domain;
pub mod tree_traits;
pub mod util;
