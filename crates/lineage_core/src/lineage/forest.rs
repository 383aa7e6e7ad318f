//! Lowered forest read model.
//!
//! # Responsibility
//! - Own the assembled arena, its roots and its family units.
//! - Serve lookups for renderers, detail views and export tooling.
//!
//! # Invariants
//! - Immutable after construction; safe to share across threads.
//! - Every node has exactly one depth; roots sit at depth 0.

use crate::lineage::assemble::AssembledTree;
use crate::model::member::{MemberDetails, MemberRecord, NodeId};
use crate::model::node::{FamilyUnit, LineageNode, NodeIndex, NodeKind, TreeNode};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::io;

/// Strict forest produced by one lowering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    positions: HashMap<NodeId, NodeIndex>,
    roots: Vec<NodeIndex>,
    family_units: Vec<NodeIndex>,
    depths: Vec<usize>,
}

impl Forest {
    pub(crate) fn new(assembled: AssembledTree, roots: Vec<NodeIndex>) -> Self {
        let depths = compute_depths(&assembled.nodes, &roots);
        Self {
            nodes: assembled.nodes,
            positions: assembled.positions,
            roots,
            family_units: assembled.family_units,
            depths,
        }
    }

    /// Total node count (members plus family units).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes backed by input records.
    pub fn member_count(&self) -> usize {
        self.nodes.len() - self.family_units.len()
    }

    /// Iterates every node in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Looks up one node by id.
    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.positions.get(id).map(|&index| &self.nodes[index])
    }

    /// Looks up one node by arena index.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Entry points of the forest, in arena order.
    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().map(|&index| &self.nodes[index])
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots().map(TreeNode::id).collect()
    }

    /// Resolved children of `node`, in link order.
    pub fn children<'a>(
        &'a self,
        node: &'a TreeNode,
    ) -> impl Iterator<Item = &'a TreeNode> + 'a {
        node.children.iter().map(move |&index| &self.nodes[index])
    }

    /// Child ids of the node with `id`; `None` when the id is unknown.
    pub fn child_ids(&self, id: &str) -> Option<Vec<&str>> {
        let node = self.get(id)?;
        Some(self.children(node).map(TreeNode::id).collect())
    }

    /// Synthesized family units, in creation order.
    pub fn family_units(&self) -> impl Iterator<Item = &TreeNode> {
        self.family_units.iter().map(|&index| &self.nodes[index])
    }

    pub fn family_unit_count(&self) -> usize {
        self.family_units.len()
    }

    /// Spouse records of one unit, attachment parent first.
    pub fn spouses(&self, unit: &FamilyUnit) -> Option<[&MemberRecord; 2]> {
        let [attachment_id, other_id] = unit.spouse_ids();
        let attachment = self.get(attachment_id)?.as_member()?;
        let other = self.get(other_id)?.as_member()?;
        Some([attachment, other])
    }

    /// Distance from the node's root; roots are at depth 0.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).map(|&index| self.depths[index])
    }

    /// Deepest node depth; `None` for an empty forest.
    pub fn max_depth(&self) -> Option<usize> {
        self.depths.iter().copied().max()
    }

    /// Nested view rooted at `id`.
    pub fn nested(&self, id: &str) -> Option<NestedNode<'_>> {
        let node = self.get(id)?;
        Some(NestedNode { forest: self, node })
    }

    /// Nested views for every root.
    pub fn nested_roots(&self) -> Vec<NestedNode<'_>> {
        self.roots()
            .map(|node| NestedNode { forest: self, node })
            .collect()
    }
}

fn compute_depths(nodes: &[TreeNode], roots: &[NodeIndex]) -> Vec<usize> {
    let mut depths = vec![0; nodes.len()];
    let mut queue: VecDeque<NodeIndex> = roots.iter().copied().collect();
    while let Some(index) = queue.pop_front() {
        for &child in &nodes[index].children {
            depths[child] = depths[index] + 1;
            queue.push_back(child);
        }
    }
    depths
}

/// Borrowed subtree view rendered as nested JSON.
///
/// Member nodes carry their display attributes; family units carry the full
/// `spouses` pair. Rendering walks an explicit stack, so lineage depth is
/// bounded by memory rather than by the call stack.
#[derive(Debug, Clone, Copy)]
pub struct NestedNode<'a> {
    forest: &'a Forest,
    node: &'a TreeNode,
}

impl<'a> NestedNode<'a> {
    pub fn node(&self) -> &'a TreeNode {
        self.node
    }

    pub fn children(&self) -> Vec<NestedNode<'a>> {
        let forest = self.forest;
        forest
            .children(self.node)
            .map(|node| NestedNode { forest, node })
            .collect()
    }

    /// Writes this subtree as compact JSON.
    ///
    /// # Errors
    /// - Any serialization or I/O error from `writer`.
    pub fn write_json<W: io::Write>(&self, writer: &mut W) -> Result<(), serde_json::Error> {
        write_subtrees(self.forest, std::slice::from_ref(&self.node), writer)
    }

    /// Renders this subtree as a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        self.write_json(&mut buffer)?;
        into_utf8(buffer)
    }
}

impl Forest {
    /// Writes every root subtree as one compact JSON array.
    ///
    /// # Errors
    /// - Any serialization or I/O error from `writer`.
    pub fn write_nested_json<W: io::Write>(&self, writer: &mut W) -> Result<(), serde_json::Error> {
        let roots: Vec<&TreeNode> = self.roots().collect();
        writer.write_all(b"[").map_err(serde_json::Error::io)?;
        write_subtrees(self, &roots, writer)?;
        writer.write_all(b"]").map_err(serde_json::Error::io)
    }

    /// Renders every root subtree as a compact JSON array string.
    pub fn nested_json(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        self.write_nested_json(&mut buffer)?;
        into_utf8(buffer)
    }
}

enum WriteStep<'a> {
    Open {
        node: &'a TreeNode,
        leading_comma: bool,
    },
    Close,
}

/// Writes comma-separated subtrees without recursing per generation.
fn write_subtrees<W: io::Write>(
    forest: &Forest,
    tops: &[&TreeNode],
    writer: &mut W,
) -> Result<(), serde_json::Error> {
    let mut stack: Vec<WriteStep<'_>> = tops
        .iter()
        .enumerate()
        .rev()
        .map(|(position, &node)| WriteStep::Open {
            node,
            leading_comma: position > 0,
        })
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            WriteStep::Open {
                node,
                leading_comma,
            } => {
                if leading_comma {
                    writer.write_all(b",").map_err(serde_json::Error::io)?;
                }
                writer
                    .write_all(&node_head(forest, node)?)
                    .map_err(serde_json::Error::io)?;
                stack.push(WriteStep::Close);
                for (position, &child) in node.children.iter().enumerate().rev() {
                    stack.push(WriteStep::Open {
                        node: &forest.nodes[child],
                        leading_comma: position > 0,
                    });
                }
            }
            WriteStep::Close => writer.write_all(b"]}").map_err(serde_json::Error::io)?,
        }
    }
    Ok(())
}

/// Serializes one node's own fields and opens its `children` array.
fn node_head(forest: &Forest, node: &TreeNode) -> Result<Vec<u8>, serde_json::Error> {
    let mut head = match &node.node {
        LineageNode::Member(record) => serde_json::to_vec(&MemberView {
            kind: NodeKind::Member,
            id: &record.id,
            name: &record.name,
            spouse_id: record.spouse_id.as_deref(),
            details: &record.details,
        })?,
        LineageNode::FamilyUnit(unit) => serde_json::to_vec(&FamilyUnitView {
            kind: NodeKind::FamilyUnit,
            id: &unit.id,
            name: &unit.name,
            spouses: forest.spouses(unit).map(Vec::from).unwrap_or_default(),
        })?,
    };
    // Compact object output always ends with `}` and holds at least `kind`.
    head.pop();
    head.extend_from_slice(b",\"children\":[");
    Ok(head)
}

fn into_utf8(buffer: Vec<u8>) -> Result<String, serde_json::Error> {
    String::from_utf8(buffer).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberView<'a> {
    kind: NodeKind,
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    spouse_id: Option<&'a str>,
    #[serde(flatten)]
    details: &'a MemberDetails,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FamilyUnitView<'a> {
    kind: NodeKind,
    id: &'a str,
    name: &'a str,
    spouses: Vec<&'a MemberRecord>,
}

#[cfg(test)]
mod tests {
    use crate::lineage::lower_records;
    use crate::model::member::MemberRecord;

    #[test]
    fn deep_lineage_renders_nested_json_without_recursion() {
        let depth = 50_000;
        let records = (0..depth).map(|generation| {
            let record = MemberRecord::new(generation.to_string(), "Heir");
            if generation + 1 < depth {
                record.with_children([(generation + 1).to_string()])
            } else {
                record
            }
        });
        let forest = lower_records(records).unwrap();
        assert_eq!(forest.max_depth(), Some(depth - 1));

        let text = forest.nested_json().unwrap();
        assert!(text.starts_with("[{\"kind\":\"member\",\"id\":\"0\""));
        assert!(text.ends_with(&format!("{}]", "]}".repeat(depth))));
        assert_eq!(text.matches("\"children\":[").count(), depth);
    }

    #[test]
    fn siblings_are_comma_separated() {
        let forest = lower_records([
            MemberRecord::new("p", "P").with_children(["a", "b"]),
            MemberRecord::new("a", "A"),
            MemberRecord::new("b", "B"),
        ])
        .unwrap();

        let text = forest.nested("p").unwrap().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["children"][0]["id"], "a");
        assert_eq!(value["children"][1]["id"], "b");
        assert_eq!(value["children"][1]["children"], serde_json::json!([]));
    }
}
