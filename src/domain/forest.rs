//! Arena of nested-set nodes and the engine keeping their boundaries consistent.
//!
//! Nodes live in a [`generational_arena::Arena`]. Each slot records its parent
//! and its ordered children, so a node can never sit under two parents: it has
//! to be detached (removed from its parent) before it is added elsewhere.
//!
//! ```text
//! root [0, 7] level 0
//! |-- a [1, 4] level 1
//! |   `-- a-0 [2, 3] level 2
//! `-- b [5, 6] level 1
//! ```

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::mem;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{NestError, NestResult};
use crate::domain::node::NodeMut;
use crate::domain::policy::NestingPolicy;
use crate::domain::position::{resolve_insert, resolve_remove, Descriptor, Position, SortOrder};
use crate::domain::store::{Boundary, BoundaryStore};

/// Reserved value that is never a legal `left`, so `left + 1` cannot overflow.
pub const MAX_BOUNDARY: i64 = i64::MAX;

/// Handle to a node inside a [`Forest`].
///
/// Ids of discarded nodes are never reused for other nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Index);

// Prevent `{:#?}` from printing the index in redundant lines.
impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.0.into_raw_parts();
        write!(f, "NodeId({}g{})", index, generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.0.into_raw_parts();
        write!(f, "#{}g{}", index, generation)
    }
}

/// Arena slot: the node's storage plus its links.
#[derive(Debug)]
struct Slot<S> {
    store: S,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Progress of [`Forest::check_nesting`] through one node.
struct CheckFrame {
    node: NodeId,
    next: usize,
    expected_left: i64,
    child_level: i64,
    right: i64,
}

fn step(value: i64) -> NestResult<i64> {
    value.checked_add(1).ok_or(NestError::Overflow)
}

/// Nested-set forest.
///
/// All nodes of one forest share one storage backend `S` and one
/// [`NestingPolicy`]. Under [`NestingPolicy::AutoNest`] every mutation
/// renumbers the affected subtree. Under [`NestingPolicy::Manual`] only the
/// addressed node is touched and [`Forest::updated_nesting`] must be called
/// before the boundaries are relied upon.
#[derive(Debug)]
pub struct Forest<S> {
    arena: Arena<Slot<S>>,
    policy: NestingPolicy,
}

impl<S> Default for Forest<S> {
    fn default() -> Self {
        Self {
            arena: Arena::new(),
            policy: NestingPolicy::default(),
        }
    }
}

impl<S: BoundaryStore> Forest<S> {
    /// Creates an empty forest running under [`NestingPolicy::Manual`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nesting(policy: NestingPolicy) -> Self {
        Self {
            arena: Arena::new(),
            policy,
        }
    }

    pub fn policy(&self) -> NestingPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: NestingPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Runs `f` under `policy` and restores the previous policy afterwards,
    /// whether `f` succeeds or not.
    pub fn with_policy<R, F>(&mut self, policy: NestingPolicy, f: F) -> NestResult<R>
    where
        F: FnOnce(&mut Self) -> NestResult<R>,
    {
        let previous = mem::replace(&mut self.policy, policy);
        let result = f(self);
        self.policy = previous;
        result
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Adds a detached node. Its boundaries are whatever `store` holds.
    pub fn create_node(&mut self, store: S) -> NodeId {
        let id = NodeId(self.arena.insert(Slot {
            store,
            parent: None,
            children: Vec::new(),
        }));
        trace!(%id, "created node");
        id
    }

    /// Drops the node and its whole subtree.
    ///
    /// The node is unlinked from its parent first; under auto-nest the
    /// parent is renumbered afterwards.
    #[instrument(level = "trace", skip(self))]
    pub fn discard(&mut self, id: NodeId) -> NestResult<()> {
        let parent = self.slot(id)?.parent;
        if let Some(parent) = parent {
            self.slot_mut(parent)?.children.retain(|&c| c != id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(slot) = self.arena.remove(next.0) {
                pending.extend(slot.children);
            }
        }
        if let Some(parent) = parent {
            self.cascade(parent)?;
        }
        Ok(())
    }

    fn slot(&self, id: NodeId) -> NestResult<&Slot<S>> {
        self.arena.get(id.0).ok_or(NestError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> NestResult<&mut Slot<S>> {
        self.arena.get_mut(id.0).ok_or(NestError::UnknownNode(id))
    }

    /// Returns the node's storage.
    pub fn store(&self, id: NodeId) -> NestResult<&S> {
        Ok(&self.slot(id)?.store)
    }

    /// Returns the node's storage for direct access.
    ///
    /// Writes made here bypass range checks and cascades.
    pub fn store_mut(&mut self, id: NodeId) -> NestResult<&mut S> {
        Ok(&mut self.slot_mut(id)?.store)
    }

    /// Returns a fluent proxy to the node, or `None` if it does not exist.
    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_, S>> {
        NodeMut::new(self, id)
    }

    pub fn left(&self, id: NodeId) -> NestResult<i64> {
        self.slot(id)?.store.read(Boundary::Left)
    }

    pub fn level(&self, id: NodeId) -> NestResult<i64> {
        self.slot(id)?.store.read(Boundary::Level)
    }

    pub fn right(&self, id: NodeId) -> NestResult<i64> {
        self.slot(id)?.store.read(Boundary::Right)
    }

    /// Sets the left boundary.
    ///
    /// Under auto-nest the whole subtree is laid out again from `value`:
    /// each child in sibling order gets `left = cursor + 1`, the cursor moves
    /// to that child's resulting right, and finally this node's right becomes
    /// `cursor + 1`.
    ///
    /// # Errors
    ///
    /// * [`NestError::MaxBoundary`] if `value` is [`MAX_BOUNDARY`]; the node is left untouched.
    /// * [`NestError::Overflow`] if the cascade runs past `i64::MAX`.
    pub fn set_left(&mut self, id: NodeId, value: i64) -> NestResult<&mut Self> {
        self.write_left(id, value)?;
        if self.policy.is_auto() {
            self.lay_out(id, value)?;
        }
        Ok(self)
    }

    fn write_left(&mut self, id: NodeId, value: i64) -> NestResult<()> {
        if value == MAX_BOUNDARY {
            return Err(NestError::MaxBoundary);
        }
        self.slot_mut(id)?.store.write(Boundary::Left, value)?;
        trace!(%id, value, "set left");
        Ok(())
    }

    /// Lays out the subtree below `id`, whose left is already `left`.
    ///
    /// Each frame holds a node, the index of its next child and the cursor,
    /// which is the last boundary handed out inside that node.
    fn lay_out(&mut self, id: NodeId, left: i64) -> NestResult<()> {
        let mut stack: Vec<(NodeId, usize, i64)> = vec![(id, 0, left)];
        while let Some(&(node, next, cursor)) = stack.last() {
            let top = stack.len() - 1;
            match self.slot(node)?.children.get(next).copied() {
                Some(child) => {
                    stack[top].1 += 1;
                    let child_left = step(cursor)?;
                    self.write_left(child, child_left)?;
                    stack.push((child, 0, child_left));
                }
                None => {
                    let right = step(cursor)?;
                    self.set_right(node, right)?;
                    stack.pop();
                    if let Some(parent) = stack.last_mut() {
                        parent.2 = right;
                    }
                }
            }
        }
        Ok(())
    }

    /// Sets the level. Under auto-nest every descendant gets its depth
    /// relative to `value`.
    pub fn set_level(&mut self, id: NodeId, value: i64) -> NestResult<&mut Self> {
        self.write_level(id, value)?;
        if self.policy.is_auto() {
            let mut pending = VecDeque::from([(id, value)]);
            while let Some((node, level)) = pending.pop_front() {
                if !self.has_direct_children(node)? {
                    continue;
                }
                let child_level = step(level)?;
                for child in self.slot(node)?.children.clone() {
                    self.write_level(child, child_level)?;
                    pending.push_back((child, child_level));
                }
            }
        }
        Ok(self)
    }

    fn write_level(&mut self, id: NodeId, value: i64) -> NestResult<()> {
        self.slot_mut(id)?.store.write(Boundary::Level, value)?;
        trace!(%id, value, "set level");
        Ok(())
    }

    /// Sets the right boundary. Never cascades.
    ///
    /// # Errors
    ///
    /// * [`NestError::UnsetProperty`] if left has not been set.
    /// * [`NestError::InvalidRange`] if `value <= left`.
    pub fn set_right(&mut self, id: NodeId, value: i64) -> NestResult<&mut Self> {
        let left = self.left(id)?;
        if value <= left {
            return Err(NestError::InvalidRange { left, right: value });
        }
        self.slot_mut(id)?.store.write(Boundary::Right, value)?;
        trace!(%id, value, "set right");
        Ok(self)
    }

    /// Recomputes left, right and level of the node and all its descendants,
    /// regardless of the current policy.
    ///
    /// The policy is forced to auto-nest for the duration of the call and
    /// restored afterwards, also when the cascade fails.
    #[instrument(level = "debug", skip(self))]
    pub fn updated_nesting(&mut self, id: NodeId, index: i64, level: i64) -> NestResult<&mut Self> {
        debug!("renumbering subtree");
        self.with_policy(NestingPolicy::AutoNest, |forest| {
            forest.set_left(id, index)?;
            forest.set_level(id, level)?;
            Ok(())
        })?;
        Ok(self)
    }

    /// Renumbers `id` from its own left and level when auto-nest is on.
    fn cascade(&mut self, id: NodeId) -> NestResult<()> {
        if self.policy.is_auto() {
            let left = self.left(id)?;
            let level = self.level(id)?;
            self.updated_nesting(id, left, level)?;
        }
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> NestResult<Option<NodeId>> {
        Ok(self.slot(id)?.parent)
    }

    pub fn is_root(&self, id: NodeId) -> NestResult<bool> {
        Ok(self.parent(id)?.is_none())
    }

    /// Returns the root of the tree containing the node.
    pub fn root_of(&self, id: NodeId) -> NestResult<NodeId> {
        let mut current = id;
        while let Some(parent) = self.parent(current)? {
            current = parent;
        }
        Ok(current)
    }

    /// Direct descendants in sibling order.
    pub fn descendants(&self, id: NodeId) -> NestResult<&[NodeId]> {
        Ok(&self.slot(id)?.children)
    }

    pub fn descendant_count(&self, id: NodeId) -> NestResult<usize> {
        Ok(self.slot(id)?.children.len())
    }

    /// True if the node's child list is non-empty.
    pub fn has_direct_children(&self, id: NodeId) -> NestResult<bool> {
        Ok(!self.slot(id)?.children.is_empty())
    }

    /// True if the node's interval leaves room for descendants
    /// (`right - left > 1`), whatever its child list holds.
    pub fn has_structural_gap(&self, id: NodeId) -> NestResult<bool> {
        let left = i128::from(self.left(id)?);
        let right = i128::from(self.right(id)?);
        Ok(right - left > 1)
    }

    /// Fails if `child` is `parent` or one of its ancestors.
    fn check_loop(&self, parent: NodeId, child: NodeId) -> NestResult<()> {
        let mut current = Some(parent);
        while let Some(node) = current {
            if node == child {
                return Err(NestError::AncestorDescendantLoop);
            }
            current = self.slot(node)?.parent;
        }
        Ok(())
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> NestResult<()> {
        self.slot(parent)?;
        if self.slot(child)?.parent.is_some() {
            return Err(NestError::AlreadyAttached(child));
        }
        self.check_loop(parent, child)
    }

    /// Adds a detached node to the head or tail of `parent`'s descendants.
    ///
    /// # Errors
    ///
    /// * [`NestError::AlreadyAttached`] if `child` already has a parent.
    /// * [`NestError::AncestorDescendantLoop`] if `child` is `parent` or one of its ancestors.
    pub fn add_descendant(
        &mut self,
        parent: NodeId,
        child: NodeId,
        position: Position,
    ) -> NestResult<&mut Self> {
        self.add_descendant_at(parent, child, position)
    }

    /// Adds a detached node at a token or signed offset.
    ///
    /// Non-negative offsets insert before the child at that index and are
    /// clamped to the end; negative offsets count from the end and are
    /// clamped to the head.
    #[instrument(level = "trace", skip(self, at))]
    pub fn add_descendant_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        at: impl Into<Descriptor>,
    ) -> NestResult<&mut Self> {
        let at = at.into();
        trace!(%at, "adding descendant");
        self.check_attachable(parent, child)?;
        let index = resolve_insert(&at, self.descendant_count(parent)?)?;
        self.slot_mut(parent)?.children.insert(index, child);
        self.slot_mut(child)?.parent = Some(parent);
        self.cascade(parent)?;
        Ok(self)
    }

    fn detach_at(&mut self, parent: NodeId, index: usize) -> NestResult<NodeId> {
        let child = self.slot_mut(parent)?.children.remove(index);
        self.slot_mut(child)?.parent = None;
        trace!(%parent, %child, index, "detached descendant");
        Ok(child)
    }

    /// Detaches the first or last descendant.
    ///
    /// Returns `None` if there was nothing to remove. The removed node stays
    /// in the forest as a detached root.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_descendant(
        &mut self,
        parent: NodeId,
        position: Position,
    ) -> NestResult<Option<NodeId>> {
        let removed = match position.remove_index(self.descendant_count(parent)?) {
            Some(index) => Some(self.detach_at(parent, index)?),
            None => None,
        };
        self.cascade(parent)?;
        Ok(removed)
    }

    /// Detaches the descendant at a token or signed offset.
    ///
    /// # Errors
    ///
    /// [`NestError::NotFound`] if no descendant occupies the slot.
    #[instrument(level = "trace", skip(self, at))]
    pub fn remove_descendant_at(
        &mut self,
        parent: NodeId,
        at: impl Into<Descriptor>,
    ) -> NestResult<NodeId> {
        let at = at.into();
        trace!(%at, "removing descendant");
        let index = resolve_remove(&at, self.descendant_count(parent)?)?;
        let removed = self.detach_at(parent, index)?;
        self.cascade(parent)?;
        Ok(removed)
    }

    /// Detaches the descendant whose current left equals `left`.
    ///
    /// Descendants without a readable left never match.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_descendant_by_left(&mut self, parent: NodeId, left: i64) -> NestResult<NodeId> {
        let index = self
            .descendants(parent)?
            .iter()
            .position(|&c| matches!(self.left(c), Ok(v) if v == left))
            .ok_or_else(|| NestError::NotFound(format!("left {}", left)))?;
        let removed = self.detach_at(parent, index)?;
        self.cascade(parent)?;
        Ok(removed)
    }

    /// Replaces the descendant list, keeping the given order.
    ///
    /// Nodes may be current descendants of `parent` (reordering) or detached
    /// nodes. Previous descendants missing from `descendants` become
    /// detached roots.
    #[instrument(level = "trace", skip(self))]
    pub fn set_descendants(
        &mut self,
        parent: NodeId,
        descendants: Vec<NodeId>,
    ) -> NestResult<&mut Self> {
        self.slot(parent)?;
        let mut listed = HashSet::with_capacity(descendants.len());
        for &child in &descendants {
            if !listed.insert(child) {
                return Err(NestError::DuplicateDescendant(child));
            }
            match self.slot(child)?.parent {
                Some(p) if p == parent => {}
                Some(_) => return Err(NestError::AlreadyAttached(child)),
                None => self.check_loop(parent, child)?,
            }
        }

        let previous = mem::take(&mut self.slot_mut(parent)?.children);
        for old in previous.into_iter().filter(|c| !listed.contains(c)) {
            self.slot_mut(old)?.parent = None;
        }
        for &child in &descendants {
            self.slot_mut(child)?.parent = Some(parent);
        }
        let has_descendants = !descendants.is_empty();
        self.slot_mut(parent)?.children = descendants;

        if has_descendants {
            self.cascade(parent)?;
        }
        Ok(self)
    }

    /// Immediate ancestor.
    pub fn ancestor(&self, id: NodeId) -> NestResult<Option<NodeId>> {
        self.parent(id)
    }

    pub fn has_ancestors(&self, id: NodeId) -> NestResult<bool> {
        Ok(self.parent(id)?.is_some())
    }

    /// Up to `levels_above` ancestors of the node.
    ///
    /// [`SortOrder::Asc`] lists from the topmost included ancestor down to the
    /// immediate one, [`SortOrder::Desc`] the other way round. A root yields
    /// an empty list.
    pub fn ancestor_list(
        &self,
        id: NodeId,
        levels_above: usize,
        order: SortOrder,
    ) -> NestResult<Vec<NodeId>> {
        let mut list = Vec::new();
        let mut current = self.parent(id)?;
        while let Some(ancestor) = current {
            if list.len() >= levels_above {
                break;
            }
            list.push(ancestor);
            current = self.parent(ancestor)?;
        }
        if order == SortOrder::Asc {
            list.reverse();
        }
        Ok(list)
    }

    /// All ancestors, root first.
    pub fn ancestors(&self, id: NodeId) -> NestResult<Vec<NodeId>> {
        self.ancestor_list(id, usize::MAX, SortOrder::Asc)
    }

    /// Validates the nested-set invariants over the subtree rooted at `id`.
    ///
    /// # Errors
    ///
    /// The first [`NestError::Violation`] found in depth-first order, or
    /// the read error of a node whose boundaries are not set.
    #[instrument(level = "trace", skip(self))]
    pub fn check_nesting(&self, id: NodeId) -> NestResult<()> {
        let mut stack = vec![self.open_check(id)?];
        while let Some(top) = stack.last_mut() {
            match self.slot(top.node)?.children.get(top.next).copied() {
                Some(child) => {
                    top.next += 1;
                    let child_left = self.left(child)?;
                    if child_left != top.expected_left {
                        return Err(NestError::Violation {
                            node: child,
                            reason: format!(
                                "left {} where {} was expected",
                                child_left, top.expected_left
                            ),
                        });
                    }
                    let actual_level = self.level(child)?;
                    if actual_level != top.child_level {
                        return Err(NestError::Violation {
                            node: child,
                            reason: format!(
                                "level {} where {} was expected",
                                actual_level, top.child_level
                            ),
                        });
                    }
                    let frame = self.open_check(child)?;
                    stack.push(frame);
                }
                None => {
                    if top.right != top.expected_left {
                        return Err(NestError::Violation {
                            node: top.node,
                            reason: format!(
                                "right {} where {} was expected",
                                top.right, top.expected_left
                            ),
                        });
                    }
                    let right = top.right;
                    stack.pop();
                    if let Some(parent) = stack.last_mut() {
                        parent.expected_left = step(right)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn open_check(&self, id: NodeId) -> NestResult<CheckFrame> {
        let left = self.left(id)?;
        let level = self.level(id)?;
        let right = self.right(id)?;
        if left >= right {
            return Err(NestError::Violation {
                node: id,
                reason: format!("left {} is not below right {}", left, right),
            });
        }
        Ok(CheckFrame {
            node: id,
            next: 0,
            expected_left: step(left)?,
            child_level: step(level)?,
            right,
        })
    }
}
