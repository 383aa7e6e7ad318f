//! Verification snapshot export.
//!
//! # Responsibility
//! - Summarize one forest as root ids, family units and an optional focus node.
//! - Render the summary as pretty JSON for diffing between runs.
//!
//! # Invariants
//! - Snapshot order mirrors forest order, so equal inputs yield equal text.
//! - Core never writes snapshots to disk; callers own persistence.

use crate::lineage::forest::Forest;
use crate::model::member::NodeId;
use crate::model::node::{NodeKind, TreeNode};
use serde::Serialize;

/// Errors from snapshot export.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Focus id is not present in the forest.
    #[error("focus node not found: {0}")]
    FocusNotFound(NodeId),
    /// Snapshot could not be rendered as JSON.
    #[error("snapshot serialization failed: {0}")]
    Serialize(String),
}

/// Serializable verification summary of one forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestSnapshot {
    pub roots: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusSnapshot>,
    pub family_units: Vec<FamilyUnitSnapshot>,
}

/// Direct children and grandchildren of one designated node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSnapshot {
    pub id: NodeId,
    pub name: String,
    pub children: Vec<ChildEntry>,
    pub grandchildren: Vec<GrandchildEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildEntry {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

/// Grandchild reached through one direct child (`via`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrandchildEntry {
    pub id: NodeId,
    pub name: String,
    pub via_id: NodeId,
    pub via: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyUnitSnapshot {
    pub id: NodeId,
    pub name: String,
    pub children: Vec<NodeId>,
}

impl ForestSnapshot {
    /// Renders the snapshot as two-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|err| SnapshotError::Serialize(err.to_string()))
    }
}

impl Forest {
    /// Builds a verification snapshot, optionally focused on one node.
    ///
    /// # Errors
    /// - `FocusNotFound` when `focus` names an unknown id.
    pub fn snapshot(&self, focus: Option<&str>) -> Result<ForestSnapshot, SnapshotError> {
        let focus = match focus {
            Some(id) => {
                let node = self
                    .get(id)
                    .ok_or_else(|| SnapshotError::FocusNotFound(id.to_string()))?;
                Some(self.focus_snapshot(node))
            }
            None => None,
        };

        Ok(ForestSnapshot {
            roots: self.roots().map(|node| node.id().to_string()).collect(),
            focus,
            family_units: self
                .family_units()
                .map(|unit| FamilyUnitSnapshot {
                    id: unit.id().to_string(),
                    name: unit.name().to_string(),
                    children: self
                        .children(unit)
                        .map(|child| child.id().to_string())
                        .collect(),
                })
                .collect(),
        })
    }

    fn focus_snapshot(&self, node: &TreeNode) -> FocusSnapshot {
        let mut children = Vec::with_capacity(node.children.len());
        let mut grandchildren = Vec::new();
        for child in self.children(node) {
            children.push(ChildEntry {
                id: child.id().to_string(),
                name: child.name().to_string(),
                kind: child.kind(),
            });
            for grandchild in self.children(child) {
                grandchildren.push(GrandchildEntry {
                    id: grandchild.id().to_string(),
                    name: grandchild.name().to_string(),
                    via_id: child.id().to_string(),
                    via: child.name().to_string(),
                });
            }
        }

        FocusSnapshot {
            id: node.id().to_string(),
            name: node.name().to_string(),
            children,
            grandchildren,
        }
    }
}
