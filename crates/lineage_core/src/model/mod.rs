//! Domain model for genealogy records and lowered tree nodes.
//!
//! # Responsibility
//! - Define the canonical input record read by every lineage stage.
//! - Define the closed node variant set (`member` | `family-unit`) consumed by
//!   renderers, detail views and snapshot tooling.
//!
//! # Invariants
//! - Every node is addressed by a canonical string `NodeId`.
//! - Display attributes are carried verbatim and never interpreted by core.

pub mod member;
pub mod node;
