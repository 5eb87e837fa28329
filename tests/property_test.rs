//! Property tests: random structural edits under auto-nest keep the tree
//! consistent, and both stores agree on every boundary.

use proptest::prelude::*;

use nestset::domain::{
    BoundaryStore, FieldBounds, Forest, MarkupBounds, NestingPolicy, NodeId, Position,
};

#[derive(Debug, Clone)]
enum Edit {
    /// Attach a new node under the `n`-th existing node, at `at`.
    Add { parent: usize, at: i64 },
    /// Remove the first or last descendant of the `n`-th node.
    Remove { parent: usize, first: bool },
    /// Renumber the root from a new left value and level.
    Renumber { left: i64, level: i64 },
    /// Keep the descendants of the `n`-th node selected by `keep`, rotated
    /// by `rotate`. An empty selection clears the list.
    SetDescendants {
        parent: usize,
        keep: Vec<bool>,
        rotate: usize,
    },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => (0usize..64, -4i64..5).prop_map(|(parent, at)| Edit::Add { parent, at }),
        1 => (0usize..64, any::<bool>()).prop_map(|(parent, first)| Edit::Remove { parent, first }),
        1 => (-1000i64..1000, -10i64..10).prop_map(|(left, level)| Edit::Renumber { left, level }),
        1 => (0usize..64, prop::collection::vec(any::<bool>(), 0..6), 0usize..6)
            .prop_map(|(parent, keep, rotate)| Edit::SetDescendants { parent, keep, rotate }),
    ]
}

/// Applies the edits to an auto-nest forest and returns the nodes still
/// reachable from the root, in creation order.
///
/// Cascades only run downwards, so after each edit the subtree of the edited
/// node is checked rather than the whole tree. Clearing a descendant list
/// does not cascade, so that case is left for the final renumbering.
fn apply<S: BoundaryStore>(
    make: impl Fn() -> S,
    root_store: S,
    edits: &[Edit],
) -> (Forest<S>, NodeId, Vec<NodeId>) {
    let mut forest = Forest::with_nesting(NestingPolicy::AutoNest);
    let root = forest.create_node(root_store);
    let mut attached = vec![root];
    for edit in edits {
        match *edit {
            Edit::SetDescendants {
                parent,
                ref keep,
                rotate,
            } => {
                let parent = attached[parent % attached.len()];
                let mut kept: Vec<NodeId> = forest
                    .descendants(parent)
                    .unwrap()
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| !keep.is_empty() && keep[i % keep.len()])
                    .map(|(_, &n)| n)
                    .collect();
                if !kept.is_empty() {
                    let by = rotate % kept.len();
                    kept.rotate_left(by);
                }
                let cleared = kept.is_empty();
                forest.set_descendants(parent, kept).unwrap();
                attached.retain(|&n| forest.root_of(n).unwrap() == root);
                if !cleared {
                    forest.check_nesting(parent).unwrap();
                }
            }
            Edit::Add { parent, at } => {
                let parent = attached[parent % attached.len()];
                let child = forest.create_node(make());
                forest.add_descendant_at(parent, child, at).unwrap();
                forest.check_nesting(parent).unwrap();
                attached.push(child);
            }
            Edit::Remove { parent, first } => {
                let parent = attached[parent % attached.len()];
                let position = if first { Position::First } else { Position::Last };
                if let Some(removed) = forest.remove_descendant(parent, position).unwrap() {
                    forest.discard(removed).unwrap();
                    attached.retain(|&n| forest.contains(n));
                }
                forest.check_nesting(parent).unwrap();
            }
            Edit::Renumber { left, level } => {
                forest.updated_nesting(root, left, level).unwrap();
                forest.check_nesting(root).unwrap();
            }
        }
    }
    (forest, root, attached)
}

fn snapshot<S: BoundaryStore>(forest: &Forest<S>, nodes: &[NodeId]) -> Vec<(i64, i64, i64)> {
    nodes
        .iter()
        .map(|&n| {
            (
                forest.left(n).unwrap(),
                forest.right(n).unwrap(),
                forest.level(n).unwrap(),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn auto_nest_keeps_tree_consistent(edits in prop::collection::vec(edit_strategy(), 0..40)) {
        let (mut forest, root, attached) =
            apply(FieldBounds::unset, FieldBounds::default(), &edits);
        let (left, level) = (forest.left(root).unwrap(), forest.level(root).unwrap());
        forest.updated_nesting(root, left, level).unwrap();

        prop_assert!(forest.check_nesting(root).is_ok());
        let left = forest.left(root).unwrap();
        let right = forest.right(root).unwrap();
        prop_assert_eq!(right - left + 1, 2 * attached.len() as i64);
    }

    #[test]
    fn stores_agree(edits in prop::collection::vec(edit_strategy(), 0..40)) {
        let (fields, _, field_nodes) =
            apply(FieldBounds::unset, FieldBounds::default(), &edits);
        let (markup, _, markup_nodes) =
            apply(MarkupBounds::with_empty_root, MarkupBounds::default(), &edits);

        prop_assert_eq!(snapshot(&fields, &field_nodes), snapshot(&markup, &markup_nodes));
    }

    #[test]
    fn renumbering_twice_changes_nothing(
        edits in prop::collection::vec(edit_strategy(), 0..30),
        left in -1000i64..1000,
        level in 0i64..5,
    ) {
        let (mut forest, root, attached) =
            apply(FieldBounds::unset, FieldBounds::default(), &edits);

        forest.updated_nesting(root, left, level).unwrap();
        let once = snapshot(&forest, &attached);
        forest.updated_nesting(root, left, level).unwrap();

        prop_assert_eq!(once, snapshot(&forest, &attached));
    }
}
