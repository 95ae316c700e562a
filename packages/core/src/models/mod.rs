//! Data Models
//!
//! This module contains the data structures of the selections registry:
//!
//! - `Node` - The single registry entity (one lookup value in the tree)
//! - `NodeId` - Store-assigned identifier
//! - `NodeDraft` / `NodeUpdate` - Pending inserts and partial updates
//! - `ValidationError` - Field-level validation failures

mod node;

pub use node::{
    archived_from_checkbox, is_valid_system_code, position_from_value, position_to_value, Node,
    NodeDraft, NodeId, NodeUpdate, ValidationError,
};
