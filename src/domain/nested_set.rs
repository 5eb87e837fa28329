//! A single rooted tree on top of a [`Forest`].

use tracing::{debug, instrument};

use crate::config::Settings;
use crate::domain::error::NestResult;
use crate::domain::forest::{Forest, NodeId};
use crate::domain::position::{Descriptor, Position, SortOrder};
use crate::domain::store::BoundaryStore;

/// Tree handle: a forest plus the node acting as root.
///
/// Structural calls that take an optional ancestor target the root when no
/// ancestor is given. Other operations are reached through
/// [`forest`](Self::forest) and [`forest_mut`](Self::forest_mut).
#[derive(Debug)]
pub struct NestedSet<S> {
    forest: Forest<S>,
    root: NodeId,
    default_position: Descriptor,
    start_index: i64,
    start_level: i64,
}

impl<S: BoundaryStore> NestedSet<S> {
    /// Creates a manual-policy tree whose root uses `root_store` as is.
    pub fn new(root_store: S) -> Self {
        let mut forest = Forest::new();
        let root = forest.create_node(root_store);
        Self::from_forest(forest, root)
    }

    /// Wraps an existing forest; `root` becomes the tree's root node.
    pub fn from_forest(forest: Forest<S>, root: NodeId) -> Self {
        Self {
            forest,
            root,
            default_position: Descriptor::default(),
            start_index: 0,
            start_level: 0,
        }
    }

    /// Creates a tree configured by `settings` and stamps the root with the
    /// configured start index and level.
    #[instrument(level = "debug", skip(root_store))]
    pub fn with_settings(root_store: S, settings: &Settings) -> NestResult<Self> {
        let mut forest = Forest::with_nesting(settings.policy());
        let root = forest.create_node(root_store);
        let mut tree = Self {
            forest,
            root,
            default_position: settings.default_position.clone(),
            start_index: settings.start_index,
            start_level: settings.start_level,
        };
        tree.updated_nesting()?;
        debug!(root = %tree.root, "nested set ready");
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) -> &mut Self {
        self.root = root;
        self
    }

    pub fn forest(&self) -> &Forest<S> {
        &self.forest
    }

    pub fn forest_mut(&mut self) -> &mut Forest<S> {
        &mut self.forest
    }

    pub fn into_forest(self) -> Forest<S> {
        self.forest
    }

    /// Creates a detached node in the underlying forest.
    pub fn create_node(&mut self, store: S) -> NodeId {
        self.forest.create_node(store)
    }

    /// Adds `descendant` under `ancestor`, or under the root when `ancestor` is `None`.
    pub fn add_descendant_to_node(
        &mut self,
        descendant: NodeId,
        ancestor: Option<NodeId>,
        position: Position,
    ) -> NestResult<&mut Self> {
        let target = ancestor.unwrap_or(self.root);
        self.forest.add_descendant(target, descendant, position)?;
        Ok(self)
    }

    /// Like [`add_descendant_to_node`](Self::add_descendant_to_node), at the
    /// configured default position.
    pub fn add_descendant(
        &mut self,
        descendant: NodeId,
        ancestor: Option<NodeId>,
    ) -> NestResult<&mut Self> {
        let target = ancestor.unwrap_or(self.root);
        let at = self.default_position.clone();
        self.forest.add_descendant_at(target, descendant, at)?;
        Ok(self)
    }

    /// Renumbers the whole tree from the configured start index and level.
    pub fn updated_nesting(&mut self) -> NestResult<&mut Self> {
        self.forest
            .updated_nesting(self.root, self.start_index, self.start_level)?;
        Ok(self)
    }

    /// Validates the nested-set invariants over the whole tree.
    pub fn check_nesting(&self) -> NestResult<()> {
        self.forest.check_nesting(self.root)
    }

    pub fn ancestor_list(
        &self,
        id: NodeId,
        levels_above: usize,
        order: SortOrder,
    ) -> NestResult<Vec<NodeId>> {
        self.forest.ancestor_list(id, levels_above, order)
    }
}
