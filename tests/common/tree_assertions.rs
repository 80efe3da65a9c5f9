use folio::{NodeId, RenderTree};

/// Checks every box below `root`: the recorded descendant count equals one plus the sum of
/// the children's counts and equals a walked count of the subtree.
pub fn check_counters(tree: &RenderTree, root: NodeId) -> Result<(), String> {
    for id in tree.descendants(root) {
        let node = tree.node(id).map_err(|e| e.to_string())?;
        let Some(b) = node.as_box() else {
            continue;
        };
        let children_sum: usize = tree
            .children(id)
            .map(|c| tree.node(c).map(|n| n.descendant_count()).unwrap_or(0))
            .sum();
        if b.descendant_count() != children_sum + 1 {
            return Err(format!(
                "{}: recorded {}, children sum {}",
                id,
                b.descendant_count(),
                children_sum + 1
            ));
        }
        let walked = tree.count_descendants(id);
        if b.descendant_count() != walked {
            return Err(format!(
                "{}: recorded {}, walked {}",
                id,
                b.descendant_count(),
                walked
            ));
        }
    }
    Ok(())
}

/// Assert that the descendant counters below a node are consistent
#[macro_export]
macro_rules! assert_counters_consistent {
    ($tree:expr, $root:expr) => {
        if let Err(message) = $crate::common::tree_assertions::check_counters(&$tree, $root) {
            panic!("Counter drift detected: {}", message);
        }
    };
}

/// Assert the children of a box, in order
#[macro_export]
macro_rules! assert_children {
    ($tree:expr, $parent:expr, $expected:expr) => {
        let actual: Vec<folio::NodeId> = $tree.children($parent).collect();
        assert_eq!(actual, $expected, "unexpected children of {}", $parent);
    };
}
