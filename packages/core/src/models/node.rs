//! Node Data Structures
//!
//! This module defines the `Node` struct, the single entity of the selections
//! registry, together with its identifier, pending-insert and partial-update
//! types.
//!
//! # Architecture
//!
//! - **Arena storage**: nodes are addressed by [`NodeId`]; `parent_id` is a
//!   non-owning back-reference and children are computed from an index
//! - **System codes**: every node carries an immutable machine-readable code
//!   (`ticket_priority_high`) used for convention-based lookup
//! - **Soft archival**: nodes are never deleted, `archived_at` retires them
//!   from new selections while existing references stay displayable
//!
//! # Examples
//!
//! ```rust
//! use selections_core::models::{NodeId, NodeUpdate};
//!
//! // Promote a node to default and give it an explicit position
//! let update = NodeUpdate::new().with_default(true).with_position(Some(10));
//! assert!(!update.is_empty());
//!
//! assert_eq!("42".parse::<NodeId>().unwrap(), NodeId(42));
//! ```

use crate::config::HIDDEN_POSITION;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Format every system code must satisfy
const SYSTEM_CODE_PATTERN: &str = r"^[a-z][a-zA-Z0-9_]*$";

/// Check a system code against the allowed format
pub fn is_valid_system_code(code: &str) -> bool {
    static CODE_REGEX: OnceLock<Regex> = OnceLock::new();
    let code_regex = CODE_REGEX.get_or_init(|| Regex::new(SYSTEM_CODE_PATTERN).unwrap());
    code_regex.is_match(code)
}

/// Validation errors for Node operations
///
/// Each variant maps to the node field it concerns (see [`ValidationError::field`])
/// so callers can surface the message next to the offending input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name can't be blank")]
    BlankName,

    #[error("Name '{name}' has already been taken")]
    DuplicateName { name: String },

    #[error("System code '{0}' can only contain alphanumeric characters and '_', not spaces")]
    InvalidSystemCode(String),

    #[error("System code '{0}' has already been taken")]
    DuplicateSystemCode(String),

    #[error("System code cannot be changed")]
    ImmutableSystemCode,

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Circular reference detected: {0}")]
    CircularReference(String),
}

impl ValidationError {
    /// Name of the node field the error is reported against
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankName | Self::DuplicateName { .. } => "name",
            Self::InvalidSystemCode(_)
            | Self::DuplicateSystemCode(_)
            | Self::ImmutableSystemCode => "system_code",
            Self::InvalidParent(_) | Self::CircularReference(_) => "parent_id",
        }
    }
}

/// Opaque node identifier assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(NodeId)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId(value)
    }
}

/// A single entry in the hierarchical lookup registry.
///
/// # Fields
///
/// - `id`: Store-assigned identifier
/// - `name`: Display label, unique among siblings
/// - `parent_id`: Optional parent reference (`None` = root)
/// - `system_code`: Immutable machine-readable code
/// - `position_value`: Display order; [`HIDDEN_POSITION`] when unpositioned
/// - `is_default`: At most one sibling holds `true`
/// - `is_system`: Reserved flag, persisted but not interpreted
/// - `archived_at`: Archival timestamp (`None` = active)
/// - `created_at` / `updated_at`: Audit timestamps
///
/// Serializes with the column names of the `selections` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub parent_id: Option<NodeId>,
    pub system_code: String,
    #[serde(default = "default_position_value")]
    pub position_value: i64,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_position_value() -> i64 {
    HIDDEN_POSITION
}

impl Node {
    /// Check if this node is a root (has no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if the node has been retired from new selections
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Explicit display position, `None` when the node is unpositioned
    pub fn position(&self) -> Option<i64> {
        position_from_value(self.position_value)
    }

    /// Sort key for child listings: `(position_value, name)`
    pub fn sort_key(&self) -> (i64, &str) {
        (self.position_value, self.name.as_str())
    }

    /// Validate the node-local rules (blank name, code format, self-parenting)
    ///
    /// Rules that need other nodes (sibling names, code uniqueness, cycles)
    /// are checked by the registry service before a write is committed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.system_code)?;

        if self.parent_id == Some(self.id) {
            return Err(ValidationError::CircularReference(
                "Node cannot be its own parent".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Map a stored `position_value` back to an optional explicit position
pub fn position_from_value(position_value: i64) -> Option<i64> {
    (position_value != HIDDEN_POSITION).then_some(position_value)
}

/// Map an optional explicit position to the stored `position_value`
pub fn position_to_value(position: Option<i64>) -> i64 {
    position.unwrap_or(HIDDEN_POSITION)
}

fn validate_fields(name: &str, system_code: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }

    if !is_valid_system_code(system_code) {
        return Err(ValidationError::InvalidSystemCode(system_code.to_string()));
    }

    Ok(())
}

/// A node that has been validated but not yet assigned an id by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub name: String,
    pub parent_id: Option<NodeId>,
    pub system_code: String,
    pub position_value: i64,
    pub is_default: bool,
    pub is_system: bool,
    pub archived_at: Option<DateTime<Utc>>,
}

impl NodeDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.system_code)
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Custom deserializer for optional fields that accepts both plain values and nested Options
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - value → Some(Some(value)) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update
///
/// All fields are optional; only provided fields are changed.
///
/// # Double-Option Pattern for Nullable Fields
///
/// `parent_id` and `position` distinguish three states:
///
/// - `None`: Don't change this field
/// - `Some(None)`: Clear it (make the node a root / restore the hidden position)
/// - `Some(Some(value))`: Set it to the specified value
///
/// `system_code` exists only so that attempts to change it can be rejected
/// with a validation error; a code is immutable once written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<NodeId>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_code: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub position: Option<Option<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,

    /// `true` archives (keeping an existing timestamp), `false` restores
    ///
    /// Also accepts the form checkbox strings, where only `"1"` archives.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_archived"
    )]
    pub archived: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_system: Option<bool>,
}

impl NodeUpdate {
    /// Create a new empty NodeUpdate
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent_id: Option<NodeId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_position(mut self, position: Option<i64>) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = Some(is_default);
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    pub fn with_system(mut self, is_system: bool) -> Self {
        self.is_system = Some(is_system);
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.parent_id.is_none()
            && self.system_code.is_none()
            && self.position.is_none()
            && self.is_default.is_none()
            && self.archived.is_none()
            && self.is_system.is_none()
    }
}

/// Parse the legacy "archived" form checkbox value (`"1"` = checked)
pub fn archived_from_checkbox(value: &str) -> bool {
    value == "1"
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArchivedInput {
    Flag(bool),
    Checkbox(String),
}

fn deserialize_archived<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<ArchivedInput>::deserialize(deserializer)?.map(|input| match input {
            ArchivedInput::Flag(archived) => archived,
            ArchivedInput::Checkbox(value) => archived_from_checkbox(&value),
        }),
    )
}
