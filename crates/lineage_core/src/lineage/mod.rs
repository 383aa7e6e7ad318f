//! Lineage-graph lowering pipeline.
//!
//! # Responsibility
//! - Lower a flat, relationally linked member snapshot into a strict forest.
//! - Run the stages in fixed order: registry, parentage index, union
//!   synthesis, tree assembly, root discovery.
//!
//! # Invariants
//! - Every call works on fresh copies; the input snapshot is never mutated.
//! - The same snapshot always yields the same forest.
//! - Fatal errors abort the run; no partial forest is returned.
//! - Log events carry ids and counts only, never names or attributes.

pub mod assemble;
pub mod error;
pub mod forest;
pub mod parentage;
pub mod registry;
pub mod roots;
pub mod snapshot;
pub mod union;

use crate::model::member::MemberRecord;
use assemble::assemble_tree;
use error::{LineageResult, StructuralError};
use forest::Forest;
use log::{error, info};
use parentage::ParentageIndex;
use registry::Registry;
use roots::find_roots;
use serde_json::Value;
use std::time::Instant;
use union::synthesize_unions;

/// Lowers typed member records into a forest.
///
/// # Errors
/// - `LineageError::Load` for missing or duplicate ids.
/// - `LineageError::Structural` for cycles or family-unit id collisions.
pub fn lower_records(records: impl IntoIterator<Item = MemberRecord>) -> LineageResult<Forest> {
    run_logged("records", || Ok(Registry::load(records)?))
}

/// Lowers a JSON array of member objects into a forest.
pub fn lower_json(text: &str) -> LineageResult<Forest> {
    run_logged("json", || Ok(Registry::from_json_str(text)?))
}

/// Lowers an already parsed JSON array of member objects into a forest.
pub fn lower_json_value(value: &Value) -> LineageResult<Forest> {
    run_logged("json", || Ok(Registry::from_json_value(value)?))
}

/// Runs every stage after loading on an owned registry.
///
/// # Errors
/// - `IdCollision` when a synthesized unit id is already taken.
/// - `Cycle` when resolved child edges loop.
pub fn lower_registry(mut registry: Registry) -> Result<Forest, StructuralError> {
    let parentage = ParentageIndex::build(&registry);
    let family_units = synthesize_unions(&mut registry, &parentage)?;
    let assembled = assemble_tree(registry, family_units)?;
    let roots = find_roots(&assembled.nodes);
    Ok(Forest::new(assembled, roots))
}

fn run_logged(
    source: &'static str,
    load: impl FnOnce() -> LineageResult<Registry>,
) -> LineageResult<Forest> {
    let started_at = Instant::now();
    info!("event=lineage_lower module=lineage status=start source={source}");

    let result = load().and_then(|registry| Ok(lower_registry(registry)?));
    match &result {
        Ok(forest) => info!(
            "event=lineage_lower module=lineage status=ok source={} duration_ms={} members={} family_units={} roots={}",
            source,
            started_at.elapsed().as_millis(),
            forest.member_count(),
            forest.family_unit_count(),
            forest.roots().count()
        ),
        Err(err) => error!(
            "event=lineage_lower module=lineage status=error source={} duration_ms={} error_code={} error={}",
            source,
            started_at.elapsed().as_millis(),
            err.code(),
            err
        ),
    }
    result
}
