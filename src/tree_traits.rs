use termtree::Tree;
use tracing::instrument;

use crate::domain::{Boundary, BoundaryStore, Forest, NestError, NestResult, NestedSet, NodeId};

/// Renders a subtree with each node's interval and level.
///
/// ```text
/// [0, 5] level 0
/// ├── [1, 2] level 1
/// └── [3, 4] level 1
/// ```
pub trait NestingTreeConvert {
    fn to_tree_string(&self, id: NodeId) -> NestResult<Tree<String>>;
}

fn label<S: BoundaryStore>(forest: &Forest<S>, id: NodeId) -> NestResult<String> {
    let store = forest.store(id)?;
    let show = |b: Boundary| -> NestResult<String> {
        Ok(store
            .try_read(b)?
            .map_or_else(|| "?".to_string(), |v| v.to_string()))
    };
    Ok(format!(
        "[{}, {}] level {}",
        show(Boundary::Left)?,
        show(Boundary::Right)?,
        show(Boundary::Level)?
    ))
}

impl<S: BoundaryStore> NestingTreeConvert for Forest<S> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, id: NodeId) -> NestResult<Tree<String>> {
        // (node, next child index, rendered so far)
        let mut stack = vec![(id, 0usize, Tree::new(label(self, id)?))];
        while let Some((node, next, _)) = stack.last() {
            let (node, next) = (*node, *next);
            let top = stack.len() - 1;
            match self.descendants(node)?.get(next).copied() {
                Some(child) => {
                    stack[top].1 += 1;
                    stack.push((child, 0, Tree::new(label(self, child)?)));
                }
                None => {
                    let Some((_, _, done)) = stack.pop() else {
                        break;
                    };
                    match stack.last_mut() {
                        Some((_, _, parent)) => {
                            parent.push(done);
                        }
                        None => return Ok(done),
                    }
                }
            }
        }
        Err(NestError::UnknownNode(id))
    }
}

impl<S: BoundaryStore> NestingTreeConvert for NestedSet<S> {
    fn to_tree_string(&self, id: NodeId) -> NestResult<Tree<String>> {
        self.forest().to_tree_string(id)
    }
}
