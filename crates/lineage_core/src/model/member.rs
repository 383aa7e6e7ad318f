//! Member record model.
//!
//! # Responsibility
//! - Define the immutable per-person record ingested by the registry.
//! - Canonicalize loosely typed wire identifiers into `NodeId` strings.
//!
//! # Invariants
//! - `id` is non-blank once a record has been accepted by the registry.
//! - `child_ids` keeps declaration order; duplicates are tolerated here and
//!   collapsed later by tree assembly.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Stable identifier shared by members and synthesized family units.
///
/// Wire ids may arrive as numbers or strings; the registry stores the
/// canonical string form only.
pub type NodeId = String;

/// Display attributes carried alongside one member.
///
/// Core never reads these fields; they are preserved for detail views and
/// export tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Remaining keys (e.g. `generation`, `spouse`), kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One genealogy record as declared by the input snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    /// Canonical member id.
    pub id: NodeId,
    /// Display name. Empty when the input omitted it.
    #[serde(default)]
    pub name: String,
    /// Declared spouse. Not required to point back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_id: Option<NodeId>,
    /// Declared child claims, serialized as `children` to match the wire shape.
    #[serde(default, rename = "children")]
    pub child_ids: Vec<NodeId>,
    #[serde(flatten)]
    pub details: MemberDetails,
}

impl MemberRecord {
    /// Creates a record with no spouse, no children and empty details.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            spouse_id: None,
            child_ids: Vec::new(),
            details: MemberDetails::default(),
        }
    }

    /// Sets the declared spouse.
    pub fn with_spouse(mut self, spouse_id: impl Into<NodeId>) -> Self {
        self.spouse_id = Some(spouse_id.into());
        self
    }

    /// Replaces the declared child claims.
    pub fn with_children<I, S>(mut self, child_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.child_ids = child_ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Shape failure while canonicalizing one wire identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedIdShape {
    /// JSON type name of the offending value.
    pub found: &'static str,
}

/// Canonicalizes one wire identifier.
///
/// - `null` and blank strings yield `Ok(None)`.
/// - Strings are kept verbatim.
/// - Integral numbers print without a fraction (`6` and `6.0` both become `"6"`).
/// - Other numbers use their JSON text.
///
/// # Errors
/// - Returns `UnsupportedIdShape` for booleans, arrays and objects.
pub fn canonical_id(value: &Value) -> Result<Option<NodeId>, UnsupportedIdShape> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Number(number) => Ok(Some(canonical_number(number))),
        other => Err(UnsupportedIdShape {
            found: json_type_name(other),
        }),
    }
}

/// Returns the JSON type name used in load diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Integral floats up to 2^53 are exactly representable, so the i64 cast is lossless.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

fn canonical_number(number: &Number) -> NodeId {
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    if let Some(value) = number.as_u64() {
        return value.to_string();
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() <= MAX_EXACT_FLOAT_INT => {
            (value as i64).to_string()
        }
        _ => number.to_string(),
    }
}
