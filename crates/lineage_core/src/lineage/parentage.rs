//! Child -> claiming parents index.
//!
//! # Invariants
//! - Child ids iterate in first-claim order.
//! - Parent ids per child follow registry iteration order; a parent listing a
//!   child twice appears twice.

use crate::lineage::registry::Registry;
use crate::model::member::NodeId;
use std::collections::HashMap;

/// Every parent claiming one child id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildClaims {
    pub child_id: NodeId,
    /// Claiming parents in scan order, duplicates kept.
    pub parent_ids: Vec<NodeId>,
}

impl ChildClaims {
    /// Claiming parents with repeats removed, first occurrence kept.
    pub fn distinct_parents(&self) -> Vec<&str> {
        let mut distinct: Vec<&str> = Vec::with_capacity(self.parent_ids.len());
        for parent_id in &self.parent_ids {
            if !distinct.contains(&parent_id.as_str()) {
                distinct.push(parent_id);
            }
        }
        distinct
    }
}

/// Inverted view of every member's working child list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentageIndex {
    claims: Vec<ChildClaims>,
    positions: HashMap<NodeId, usize>,
}

impl ParentageIndex {
    /// Scans the registry once and records every claim.
    pub fn build(registry: &Registry) -> Self {
        let mut index = Self::default();
        for member in registry.iter() {
            for child_id in member.child_ids() {
                index.record_claim(child_id, &member.record.id);
            }
        }
        index
    }

    /// Parents claiming `child_id`, empty when unclaimed.
    pub fn parents_of(&self, child_id: &str) -> &[NodeId] {
        self.positions
            .get(child_id)
            .map(|&position| self.claims[position].parent_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates claims in first-claim order.
    pub fn iter(&self) -> impl Iterator<Item = &ChildClaims> {
        self.claims.iter()
    }

    /// Number of distinct claimed child ids.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    fn record_claim(&mut self, child_id: &str, parent_id: &str) {
        let position = match self.positions.get(child_id) {
            Some(&position) => position,
            None => {
                self.positions
                    .insert(child_id.to_string(), self.claims.len());
                self.claims.push(ChildClaims {
                    child_id: child_id.to_string(),
                    parent_ids: Vec::new(),
                });
                self.claims.len() - 1
            }
        };
        self.claims[position].parent_ids.push(parent_id.to_string());
    }
}
