//! Member registry: canonical id lookup plus working child lists.
//!
//! # Responsibility
//! - Load typed records or a JSON document into an ordered id lookup.
//! - Own the per-member working `child_ids` copy rewritten by union synthesis.
//!
//! # Invariants
//! - Ids are unique and non-blank.
//! - Iteration order equals input order.
//! - Input records are never mutated; only working lists change.

use crate::lineage::error::LoadError;
use crate::model::member::{canonical_id, json_type_name, MemberDetails, MemberRecord, NodeId};
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;

const FIELD_ID: &str = "id";
const FIELD_NAME: &str = "name";
const FIELD_SPOUSE_ID: &str = "spouseId";
const FIELD_CHILDREN: &str = "children";
/// Keys the nested view writes itself; attributes may not shadow them.
const RESERVED_KEYS: [&str; 6] = [
    FIELD_ID,
    FIELD_NAME,
    FIELD_SPOUSE_ID,
    FIELD_CHILDREN,
    "kind",
    "spouses",
];

/// One registered member with its working child list.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredMember {
    pub record: MemberRecord,
    child_ids: Vec<NodeId>,
}

impl RegisteredMember {
    /// Current working child list (declared list until synthesis rewrites it).
    pub fn child_ids(&self) -> &[NodeId] {
        &self.child_ids
    }
}

/// Ordered id -> member lookup for one input snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    members: Vec<RegisteredMember>,
    positions: HashMap<NodeId, usize>,
}

impl Registry {
    /// Registers typed records in input order.
    ///
    /// # Errors
    /// - `MissingId` when a record id is blank.
    /// - `DuplicateId` when two records share one id.
    pub fn load(records: impl IntoIterator<Item = MemberRecord>) -> Result<Self, LoadError> {
        let mut registry = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(LoadError::MissingId { index });
            }
            registry.insert(index, record)?;
        }
        Ok(registry)
    }

    /// Parses JSON text and registers its records.
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| LoadError::MalformedJson(err.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Registers records from an already parsed JSON array.
    ///
    /// Ids, spouse ids and child ids may be numbers or strings; see
    /// [`canonical_id`] for the coercion rules.
    pub fn from_json_value(value: &Value) -> Result<Self, LoadError> {
        let entries = value.as_array().ok_or(LoadError::NotASequence {
            found: json_type_name(value),
        })?;

        let mut registry = Self::default();
        for (index, entry) in entries.iter().enumerate() {
            let record = parse_record(index, entry)?;
            registry.insert(index, record)?;
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Returns one record by canonical id.
    pub fn get(&self, id: &str) -> Option<&MemberRecord> {
        self.member(id).map(|member| &member.record)
    }

    /// Returns one registered member (record plus working list) by id.
    pub fn member(&self, id: &str) -> Option<&RegisteredMember> {
        self.positions.get(id).map(|&position| &self.members[position])
    }

    /// Iterates members in input order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMember> {
        self.members.iter()
    }

    /// Removes every occurrence of `child_id` from one member's working list.
    ///
    /// Returns `false` when the member is unknown.
    pub(crate) fn strip_child(&mut self, parent_id: &str, child_id: &str) -> bool {
        match self.positions.get(parent_id) {
            Some(&position) => {
                self.members[position]
                    .child_ids
                    .retain(|existing| existing != child_id);
                true
            }
            None => false,
        }
    }

    /// Appends one id to a member's working list.
    pub(crate) fn push_child(&mut self, parent_id: &str, child_id: NodeId) -> bool {
        match self.positions.get(parent_id) {
            Some(&position) => {
                self.members[position].child_ids.push(child_id);
                true
            }
            None => false,
        }
    }

    pub(crate) fn into_members(self) -> Vec<RegisteredMember> {
        self.members
    }

    fn insert(&mut self, index: usize, mut record: MemberRecord) -> Result<(), LoadError> {
        strip_reserved_keys(&mut record);
        if let Some(&first_index) = self.positions.get(&record.id) {
            return Err(LoadError::DuplicateId {
                id: record.id,
                first_index,
                index,
            });
        }
        self.positions.insert(record.id.clone(), self.members.len());
        self.members.push(RegisteredMember {
            child_ids: record.child_ids.clone(),
            record,
        });
        Ok(())
    }
}

fn strip_reserved_keys(record: &mut MemberRecord) {
    for key in RESERVED_KEYS {
        if record.details.extra.remove(key).is_some() {
            debug!(
                "event=reserved_attribute module=lineage status=skipped member_id={} key={}",
                record.id, key
            );
        }
    }
}

fn parse_record(index: usize, entry: &Value) -> Result<MemberRecord, LoadError> {
    let object = entry.as_object().ok_or(LoadError::RecordNotObject {
        index,
        found: json_type_name(entry),
    })?;
    let mut rest = object.clone();

    let id = match rest.remove(FIELD_ID) {
        Some(value) => parse_id(index, FIELD_ID, &value)?,
        None => None,
    }
    .ok_or(LoadError::MissingId { index })?;

    let name = match rest.remove(FIELD_NAME) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(value @ (Value::Number(_) | Value::Bool(_))) => value.to_string(),
        Some(other) => {
            return Err(LoadError::InvalidField {
                index,
                field: FIELD_NAME,
                reason: format!("expected string, got {}", json_type_name(&other)),
            })
        }
    };

    let spouse_id = match rest.remove(FIELD_SPOUSE_ID) {
        Some(value) => parse_id(index, FIELD_SPOUSE_ID, &value)?,
        None => None,
    };

    let child_ids = match rest.remove(FIELD_CHILDREN) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => parse_child_ids(index, &items)?,
        Some(other) => {
            return Err(LoadError::InvalidField {
                index,
                field: FIELD_CHILDREN,
                reason: format!("expected array, got {}", json_type_name(&other)),
            })
        }
    };

    Ok(MemberRecord {
        id,
        name,
        spouse_id,
        child_ids,
        details: parse_details(index, rest)?,
    })
}

fn parse_id(index: usize, field: &'static str, value: &Value) -> Result<Option<NodeId>, LoadError> {
    canonical_id(value).map_err(|shape| LoadError::InvalidField {
        index,
        field,
        reason: format!("expected string or number, got {}", shape.found),
    })
}

fn parse_child_ids(index: usize, items: &[Value]) -> Result<Vec<NodeId>, LoadError> {
    let mut child_ids = Vec::with_capacity(items.len());
    for item in items {
        match parse_id(index, FIELD_CHILDREN, item)? {
            Some(child_id) => child_ids.push(child_id),
            None => {
                return Err(LoadError::InvalidField {
                    index,
                    field: FIELD_CHILDREN,
                    reason: "child id must not be null or blank".to_string(),
                })
            }
        }
    }
    Ok(child_ids)
}

fn parse_details(index: usize, rest: Map<String, Value>) -> Result<MemberDetails, LoadError> {
    serde_json::from_value(Value::Object(rest)).map_err(|err| LoadError::InvalidField {
        index,
        field: "attributes",
        reason: err.to_string(),
    })
}
