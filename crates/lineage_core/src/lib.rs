//! Core lineage lowering for genealogy snapshots.
//! This crate is the single source of truth for turning flat member records
//! into the strict forest consumed by renderers and export tooling.

pub mod lineage;
pub mod logging;
pub mod model;

pub use lineage::error::{LineageError, LineageResult, LoadError, StructuralError};
pub use lineage::forest::{Forest, NestedNode};
pub use lineage::parentage::{ChildClaims, ParentageIndex};
pub use lineage::registry::{RegisteredMember, Registry};
pub use lineage::snapshot::{
    ChildEntry, FamilyUnitSnapshot, FocusSnapshot, ForestSnapshot, GrandchildEntry, SnapshotError,
};
pub use lineage::{lower_json, lower_json_value, lower_records, lower_registry};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::member::{MemberDetails, MemberRecord, NodeId};
pub use model::node::{FamilyUnit, LineageNode, NodeIndex, NodeKind, TreeNode};

/// Minimal health-check API for linkage probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping, Forest};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn forest_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Forest>();
    }
}
