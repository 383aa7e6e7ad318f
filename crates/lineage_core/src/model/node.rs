//! Lowered tree node model.
//!
//! # Responsibility
//! - Define the synthetic family-unit node created for couples.
//! - Define the closed `LineageNode` variant set and the arena `TreeNode`.
//!
//! # Invariants
//! - A family unit references exactly one triggering child.
//! - Family-unit ids are `family-<attachment>-<other>-<child>`.
//! - `TreeNode::children` holds arena indices, never owning references.

use crate::model::member::{MemberRecord, NodeId};
use serde::Serialize;

/// Index of one node inside a forest arena.
pub type NodeIndex = usize;

/// Discriminator exposed to consumers that must handle both node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Node backed by one input record.
    Member,
    /// Synthetic couple node above one shared child.
    FamilyUnit,
}

impl NodeKind {
    /// Stable wire label (`member` | `family-unit`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::FamilyUnit => "family-unit",
        }
    }
}

/// Synthetic node standing in for a couple above one shared child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyUnit {
    pub id: NodeId,
    /// `"<attachment name> & <other name>"`.
    pub name: String,
    /// Parent whose spouse pointer matched; the unit hangs below this member.
    pub attachment_parent: NodeId,
    /// Matched spouse; receives no link to the unit.
    pub other_parent: NodeId,
    /// The single child that triggered synthesis.
    pub child_id: NodeId,
}

impl FamilyUnit {
    /// Creates a unit for `attachment` + `other` above `child_id`.
    pub fn new(attachment: &MemberRecord, other: &MemberRecord, child_id: &str) -> Self {
        Self {
            id: Self::derive_id(&attachment.id, &other.id, child_id),
            name: format!("{} & {}", attachment.name, other.name),
            attachment_parent: attachment.id.clone(),
            other_parent: other.id.clone(),
            child_id: child_id.to_string(),
        }
    }

    /// Deterministic id for one `(attachment, other, child)` triple.
    pub fn derive_id(attachment_id: &str, other_id: &str, child_id: &str) -> NodeId {
        format!("family-{attachment_id}-{other_id}-{child_id}")
    }

    /// Ordered spouse pair: attachment parent first.
    pub fn spouse_ids(&self) -> [&str; 2] {
        [self.attachment_parent.as_str(), self.other_parent.as_str()]
    }
}

/// Closed variant set for lowered nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum LineageNode {
    Member(MemberRecord),
    FamilyUnit(FamilyUnit),
}

impl LineageNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Member(record) => &record.id,
            Self::FamilyUnit(unit) => &unit.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Member(record) => &record.name,
            Self::FamilyUnit(unit) => &unit.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Member(_) => NodeKind::Member,
            Self::FamilyUnit(_) => NodeKind::FamilyUnit,
        }
    }
}

/// One arena slot of an assembled forest.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Position inside the owning forest arena.
    pub index: NodeIndex,
    pub node: LineageNode,
    /// Resolved children in declaration order.
    pub children: Vec<NodeIndex>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        self.node.id()
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    /// Returns the backing record for member nodes.
    pub fn as_member(&self) -> Option<&MemberRecord> {
        match &self.node {
            LineageNode::Member(record) => Some(record),
            LineageNode::FamilyUnit(_) => None,
        }
    }

    /// Returns the unit payload for family-unit nodes.
    pub fn as_family_unit(&self) -> Option<&FamilyUnit> {
        match &self.node {
            LineageNode::Member(_) => None,
            LineageNode::FamilyUnit(unit) => Some(unit),
        }
    }
}
