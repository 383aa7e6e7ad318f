//! Error taxonomy for lineage lowering.
//!
//! # Invariants
//! - Load and structural failures are fatal; no partial forest is returned.
//! - Soft conditions (dangling refs, claim fallback) never surface here.

use crate::model::member::NodeId;

/// Result type used by the lowering pipeline entry points.
pub type LineageResult<T> = Result<T, LineageError>;

/// Input snapshot could not be loaded into a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Input text is not valid JSON.
    #[error("malformed member json: {0}")]
    MalformedJson(String),
    /// Top-level value is not an array.
    #[error("member input must be a sequence, got {found}")]
    NotASequence { found: &'static str },
    /// One array entry is not a JSON object.
    #[error("member record #{index} must be an object, got {found}")]
    RecordNotObject { index: usize, found: &'static str },
    /// Record has no id, a null id, or a blank id.
    #[error("member record #{index} has no id")]
    MissingId { index: usize },
    /// One field has a shape that cannot be canonicalized.
    #[error("member record #{index} has invalid `{field}`: {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },
    /// Two records share one canonical id.
    #[error("duplicate member id `{id}` at records #{first_index} and #{index}")]
    DuplicateId {
        id: NodeId,
        first_index: usize,
        index: usize,
    },
}

/// Lowered structure cannot form a strict forest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// Resolved child edges loop back; `path` is closed (first id == last id).
    #[error("lineage cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<NodeId> },
    /// A synthesized family-unit id is already taken.
    #[error("synthesized family unit id `{id}` collides with an existing node")]
    IdCollision { id: NodeId },
}

/// Umbrella error for the full lowering pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineageError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl LineageError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Load(_) => "load_failed",
            Self::Structural(StructuralError::Cycle { .. }) => "cycle_detected",
            Self::Structural(StructuralError::IdCollision { .. }) => "id_collision",
        }
    }
}
