//! Tree assembly: resolve working child lists into arena links.
//!
//! # Responsibility
//! - Lay members (registry order) and family units (creation order) out in
//!   one arena.
//! - Resolve every working child id into an arena index.
//! - Reject structures whose resolved edges loop.
//!
//! # Invariants
//! - Dangling child ids are skipped, never placed.
//! - A node is placed under at most one parent; the first placement in arena
//!   order wins.
//! - Cycle detection is iterative and never recurses on the call stack.

use crate::lineage::error::StructuralError;
use crate::lineage::registry::Registry;
use crate::model::member::NodeId;
use crate::model::node::{FamilyUnit, LineageNode, NodeIndex, TreeNode};
use log::debug;
use std::collections::HashMap;

/// Fully linked arena produced by assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledTree {
    pub nodes: Vec<TreeNode>,
    pub positions: HashMap<NodeId, NodeIndex>,
    /// Arena indices of family units, in creation order.
    pub family_units: Vec<NodeIndex>,
}

/// Builds the linked arena from a post-synthesis registry.
///
/// # Errors
/// - `IdCollision` when a family unit reuses an id already in the arena.
/// - `Cycle` when a node is reachable from itself through `children`.
pub fn assemble_tree(
    registry: Registry,
    family_units: Vec<FamilyUnit>,
) -> Result<AssembledTree, StructuralError> {
    let members = registry.into_members();
    let capacity = members.len() + family_units.len();
    let mut nodes: Vec<TreeNode> = Vec::with_capacity(capacity);
    let mut pending: Vec<Vec<NodeId>> = Vec::with_capacity(capacity);
    let mut positions: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(capacity);

    for member in members {
        let child_ids = member.child_ids().to_vec();
        push_node(
            &mut nodes,
            &mut positions,
            LineageNode::Member(member.record),
        )?;
        pending.push(child_ids);
    }

    let mut unit_indices = Vec::with_capacity(family_units.len());
    for unit in family_units {
        let child_ids = vec![unit.child_id.clone()];
        unit_indices.push(push_node(
            &mut nodes,
            &mut positions,
            LineageNode::FamilyUnit(unit),
        )?);
        pending.push(child_ids);
    }

    link_children(&mut nodes, &positions, pending);

    if let Some(path) = find_cycle(&nodes) {
        return Err(StructuralError::Cycle { path });
    }

    Ok(AssembledTree {
        nodes,
        positions,
        family_units: unit_indices,
    })
}

fn push_node(
    nodes: &mut Vec<TreeNode>,
    positions: &mut HashMap<NodeId, NodeIndex>,
    node: LineageNode,
) -> Result<NodeIndex, StructuralError> {
    let index = nodes.len();
    if positions.insert(node.id().to_string(), index).is_some() {
        return Err(StructuralError::IdCollision {
            id: node.id().to_string(),
        });
    }
    nodes.push(TreeNode {
        index,
        node,
        children: Vec::new(),
    });
    Ok(index)
}

fn link_children(
    nodes: &mut [TreeNode],
    positions: &HashMap<NodeId, NodeIndex>,
    pending: Vec<Vec<NodeId>>,
) {
    let mut placed = vec![false; nodes.len()];
    for (parent, child_ids) in pending.into_iter().enumerate() {
        for child_id in child_ids {
            let Some(&child) = positions.get(&child_id) else {
                debug!(
                    "event=dangling_child module=lineage status=skipped parent_id={}",
                    nodes[parent].id()
                );
                continue;
            };
            // Why: single placement must hold even for input the synthesizer
            // cannot reconcile; arena order makes the winner deterministic.
            if placed[child] {
                debug!(
                    "event=duplicate_placement module=lineage status=skipped parent_id={} child_id={}",
                    nodes[parent].id(),
                    child_id
                );
                continue;
            }
            placed[child] = true;
            nodes[parent].children.push(child);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Returns the first closed cycle found in arena order, if any.
fn find_cycle(nodes: &[TreeNode]) -> Option<Vec<NodeId>> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];

    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::OnPath;
        // (node, next child cursor)
        let mut path: Vec<(NodeIndex, usize)> = vec![(start, 0)];

        while let Some(frame) = path.last_mut() {
            let (node, cursor) = *frame;
            let Some(&child) = nodes[node].children.get(cursor) else {
                marks[node] = Mark::Done;
                path.pop();
                continue;
            };
            frame.1 += 1;

            match marks[child] {
                Mark::Unvisited => {
                    marks[child] = Mark::OnPath;
                    path.push((child, 0));
                }
                Mark::OnPath => {
                    let from = path
                        .iter()
                        .position(|&(on_path, _)| on_path == child)
                        .unwrap_or(0);
                    let mut cycle: Vec<NodeId> = path[from..]
                        .iter()
                        .map(|&(on_path, _)| nodes[on_path].id().to_string())
                        .collect();
                    cycle.push(nodes[child].id().to_string());
                    return Some(cycle);
                }
                Mark::Done => {}
            }
        }
    }

    None
}
