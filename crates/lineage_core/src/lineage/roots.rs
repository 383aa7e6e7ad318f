//! Root discovery over an assembled arena.

use crate::model::node::{NodeIndex, TreeNode};

/// Returns every node never linked as a child, in arena order.
///
/// Arena order is registry order for members followed by family units in
/// creation order, so the result is deterministic for one snapshot.
pub fn find_roots(nodes: &[TreeNode]) -> Vec<NodeIndex> {
    let mut referenced = vec![false; nodes.len()];
    for node in nodes {
        for &child in &node.children {
            referenced[child] = true;
        }
    }

    nodes
        .iter()
        .filter(|node| !referenced[node.index])
        .map(|node| node.index)
        .collect()
}
