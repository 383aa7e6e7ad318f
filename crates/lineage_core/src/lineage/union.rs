//! Family-unit synthesis for multi-parent children.
//!
//! # Responsibility
//! - Resolve every child claimed by two or more distinct parents to a single
//!   parent context.
//! - Materialize one `FamilyUnit` per child whose claimants contain a spouse
//!   pair.
//!
//! # Invariants
//! - Pair search walks claimants in claim order; the first claimant whose
//!   `spouse_id` is also a claimant becomes the attachment parent.
//! - A family unit is linked only from its attachment parent.
//! - Without a pair, only the first claimant keeps the child.
//! - Only working child lists change; one generation, one child at a time.

use crate::lineage::error::StructuralError;
use crate::lineage::parentage::{ChildClaims, ParentageIndex};
use crate::lineage::registry::Registry;
use crate::model::member::NodeId;
use crate::model::node::FamilyUnit;
use log::debug;
use std::collections::HashSet;

/// Rewrites working child lists and returns units in creation order.
///
/// Units are created even when the shared child is absent from the
/// registry; assembly then drops the dangling id and the unit stays childless.
///
/// # Errors
/// - `IdCollision` when a derived unit id equals a member id or an earlier
///   unit id.
pub fn synthesize_unions(
    registry: &mut Registry,
    parentage: &ParentageIndex,
) -> Result<Vec<FamilyUnit>, StructuralError> {
    let mut units: Vec<FamilyUnit> = Vec::new();
    let mut unit_ids: HashSet<NodeId> = HashSet::new();

    for claims in parentage.iter() {
        let claimants = claims.distinct_parents();
        if claimants.len() < 2 {
            continue;
        }

        match find_spouse_pair(registry, &claimants) {
            Some((attachment_id, other_id)) => {
                // Claimants come from the registry scan, so both lookups succeed.
                let (Some(attachment), Some(other)) =
                    (registry.get(attachment_id), registry.get(other_id))
                else {
                    continue;
                };
                let unit = FamilyUnit::new(attachment, other, &claims.child_id);
                if registry.contains(&unit.id) || !unit_ids.insert(unit.id.clone()) {
                    return Err(StructuralError::IdCollision { id: unit.id });
                }

                // Why: claimants outside the pair also drop the child so it is
                // placed once, below the unit.
                for parent_id in &claimants {
                    registry.strip_child(parent_id, &claims.child_id);
                }
                registry.push_child(attachment_id, unit.id.clone());
                debug!(
                    "event=family_unit module=lineage status=ok unit_id={} claimants={}",
                    unit.id,
                    claimants.len()
                );
                units.push(unit);
            }
            None => keep_first_claimant(registry, claims, &claimants),
        }
    }

    Ok(units)
}

/// Finds `(attachment, other)` among claimants, honoring claim order.
///
/// A member naming itself as spouse never pairs.
fn find_spouse_pair<'a>(
    registry: &Registry,
    claimants: &[&'a str],
) -> Option<(&'a str, &'a str)> {
    claimants.iter().find_map(|&parent_id| {
        let spouse_id = registry.get(parent_id)?.spouse_id.as_deref()?;
        claimants
            .iter()
            .find(|&&candidate| candidate == spouse_id && candidate != parent_id)
            .map(|&other_id| (parent_id, other_id))
    })
}

fn keep_first_claimant(registry: &mut Registry, claims: &ChildClaims, claimants: &[&str]) {
    for parent_id in claimants.iter().skip(1) {
        registry.strip_child(parent_id, &claims.child_id);
    }
    debug!(
        "event=claim_fallback module=lineage status=ok claimants={} kept_parent={}",
        claimants.len(),
        claimants[0]
    );
}
