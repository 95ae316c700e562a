//! Host records and record filters
//!
//! A host record is any application entity that references registry nodes.
//! Single-valued references are stored in `{field}_id`, multi-valued ones in
//! `{singular(field)}_ids`. The registry never owns host records; it only
//! reads the referenced ids through [`HostRecord`].

use crate::models::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The value of a reference field on a host record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(Option<NodeId>),
    Multiple(Vec<NodeId>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Single(None)
    }
}

impl FieldValue {
    /// Referenced ids, in stored order
    pub fn ids(&self) -> Vec<NodeId> {
        match self {
            FieldValue::Single(id) => id.iter().copied().collect(),
            FieldValue::Multiple(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        match self {
            FieldValue::Single(value) => *value == Some(id),
            FieldValue::Multiple(ids) => ids.contains(&id),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Single(value) => value.is_none(),
            FieldValue::Multiple(ids) => ids.is_empty(),
        }
    }
}

impl From<NodeId> for FieldValue {
    fn from(id: NodeId) -> Self {
        FieldValue::Single(Some(id))
    }
}

impl From<Vec<NodeId>> for FieldValue {
    fn from(ids: Vec<NodeId>) -> Self {
        FieldValue::Multiple(ids)
    }
}

/// Read access to the reference fields of a host entity
pub trait HostRecord: Send + Sync {
    /// Current value of `field_id`; unknown fields read as empty
    fn field_value(&self, field_id: &str) -> FieldValue;

    /// True until the record has been persisted
    fn is_new_record(&self) -> bool;
}

/// Map-backed [`HostRecord`] for hosts without a dedicated struct
///
/// # Examples
///
/// ```rust
/// # use selections_core::bindings::{DynamicRecord, FieldValue, HostRecord};
/// # use selections_core::models::NodeId;
/// let ticket = DynamicRecord::persisted().with_field("priority_id", NodeId(4));
/// assert!(ticket.field_value("priority_id").contains(NodeId(4)));
/// assert!(ticket.field_value("severity_id").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicRecord {
    fields: HashMap<String, FieldValue>,
    new_record: bool,
}

impl DynamicRecord {
    /// A record that has not been saved yet
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
            new_record: true,
        }
    }

    /// A record loaded from storage
    pub fn persisted() -> Self {
        Self {
            fields: HashMap::new(),
            new_record: false,
        }
    }

    pub fn with_field(mut self, field_id: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field_id, value);
        self
    }

    pub fn set(&mut self, field_id: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field_id.into(), value.into());
    }

    pub fn mark_persisted(&mut self) {
        self.new_record = false;
    }
}

impl HostRecord for DynamicRecord {
    fn field_value(&self, field_id: &str) -> FieldValue {
        self.fields.get(field_id).cloned().unwrap_or_default()
    }

    fn is_new_record(&self) -> bool {
        self.new_record
    }
}

/// How a [`HostFilter`] compares a reference field with a node id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Single-valued field equals the id
    Equals(NodeId),
    /// Multi-valued field contains the id
    Contains(NodeId),
    /// Matches no record
    Nothing,
}

/// A type-level selection of host records by reference value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFilter {
    pub field_id: String,
    pub matcher: Matcher,
}

impl HostFilter {
    pub fn equals(field_id: impl Into<String>, id: NodeId) -> Self {
        Self {
            field_id: field_id.into(),
            matcher: Matcher::Equals(id),
        }
    }

    pub fn contains(field_id: impl Into<String>, id: NodeId) -> Self {
        Self {
            field_id: field_id.into(),
            matcher: Matcher::Contains(id),
        }
    }

    /// The empty result set
    pub fn none() -> Self {
        Self {
            field_id: String::new(),
            matcher: Matcher::Nothing,
        }
    }

    pub fn is_none(&self) -> bool {
        self.matcher == Matcher::Nothing
    }

    pub fn matches(&self, record: &dyn HostRecord) -> bool {
        match self.matcher {
            Matcher::Nothing => false,
            Matcher::Equals(id) => match record.field_value(&self.field_id) {
                FieldValue::Single(value) => value == Some(id),
                FieldValue::Multiple(_) => false,
            },
            Matcher::Contains(id) => record.field_value(&self.field_id).contains(id),
        }
    }

    /// Records of `records` selected by this filter, in input order
    pub fn apply<'a, R: HostRecord>(&self, records: &'a [R]) -> Vec<&'a R> {
        records
            .iter()
            .filter(|record| self.matches(*record))
            .collect()
    }
}
