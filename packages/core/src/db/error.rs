//! Store Error Types
//!
//! This module defines error types for node store operations. Validation of
//! registry rules happens in the service layer; the store only reports
//! failures of the write/read itself.

use crate::models::NodeId;
use thiserror::Error;

/// Node store operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Target of an update does not exist
    #[error("Node not found in store: {id}")]
    NodeNotFound { id: NodeId },

    /// Referenced parent does not exist at commit time
    #[error("Parent node not found in store: {id}")]
    ParentNotFound { id: NodeId },

    /// Another node in the same sibling set already has this name
    #[error("Duplicate sibling name in store: {name}")]
    DuplicateName { name: String },

    /// The system code is taken within the batch's uniqueness scope
    #[error("Duplicate system code in store: {code}")]
    DuplicateCode { code: String },

    /// Backend-specific failure with context
    #[error("Store operation failed: {context}")]
    Backend { context: String },
}

impl StoreError {
    /// Create a node not found error
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    /// Create a parent not found error
    pub fn parent_not_found(id: NodeId) -> Self {
        Self::ParentNotFound { id }
    }

    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode { code: code.into() }
    }

    /// Create a backend error with context
    pub fn backend(context: impl Into<String>) -> Self {
        Self::Backend {
            context: context.into(),
        }
    }
}
