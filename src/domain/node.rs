//! Fluent proxy to a single node.

use crate::domain::error::NestResult;
use crate::domain::forest::{Forest, NodeId};
use crate::domain::position::{Descriptor, Position};
use crate::domain::store::BoundaryStore;

/// Mutable reference to a node.
///
/// Setters return the proxy itself so calls chain:
///
/// ```
/// use nestset::domain::{FieldBounds, Forest};
///
/// let mut forest = Forest::new();
/// let id = forest.create_node(FieldBounds::unset());
/// forest
///     .node_mut(id)
///     .expect("node exists")
///     .set_left(2)?
///     .set_level(0)?
///     .set_right(3)?;
/// assert_eq!(forest.right(id)?, 3);
/// # Ok::<(), nestset::domain::NestError>(())
/// ```
#[derive(Debug)]
pub struct NodeMut<'a, S> {
    forest: &'a mut Forest<S>,
    id: NodeId,
}

impl<'a, S: BoundaryStore> NodeMut<'a, S> {
    pub(super) fn new(forest: &'a mut Forest<S>, id: NodeId) -> Option<Self> {
        if !forest.contains(id) {
            return None;
        }
        Some(Self { forest, id })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn left(&self) -> NestResult<i64> {
        self.forest.left(self.id)
    }

    pub fn level(&self) -> NestResult<i64> {
        self.forest.level(self.id)
    }

    pub fn right(&self) -> NestResult<i64> {
        self.forest.right(self.id)
    }

    pub fn descendants(&self) -> NestResult<&[NodeId]> {
        self.forest.descendants(self.id)
    }

    pub fn set_left(&mut self, value: i64) -> NestResult<&mut Self> {
        self.forest.set_left(self.id, value)?;
        Ok(self)
    }

    pub fn set_level(&mut self, value: i64) -> NestResult<&mut Self> {
        self.forest.set_level(self.id, value)?;
        Ok(self)
    }

    pub fn set_right(&mut self, value: i64) -> NestResult<&mut Self> {
        self.forest.set_right(self.id, value)?;
        Ok(self)
    }

    pub fn add_descendant(&mut self, child: NodeId, position: Position) -> NestResult<&mut Self> {
        self.forest.add_descendant(self.id, child, position)?;
        Ok(self)
    }

    pub fn add_descendant_at(
        &mut self,
        child: NodeId,
        at: impl Into<Descriptor>,
    ) -> NestResult<&mut Self> {
        self.forest.add_descendant_at(self.id, child, at)?;
        Ok(self)
    }

    pub fn remove_descendant(&mut self, position: Position) -> NestResult<Option<NodeId>> {
        self.forest.remove_descendant(self.id, position)
    }

    pub fn set_descendants(&mut self, descendants: Vec<NodeId>) -> NestResult<&mut Self> {
        self.forest.set_descendants(self.id, descendants)?;
        Ok(self)
    }

    pub fn updated_nesting(&mut self, index: i64, level: i64) -> NestResult<&mut Self> {
        self.forest.updated_nesting(self.id, index, level)?;
        Ok(self)
    }
}
