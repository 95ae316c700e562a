//! Service Layer Error Types
//!
//! This module defines error types for registry operations, wrapping model
//! validation failures and store failures with proper error chaining.

use crate::db::StoreError;
use crate::models::{NodeId, ValidationError};
use thiserror::Error;

/// Registry operation errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// Validation failed for node
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Store operation failed
    #[error("Store operation failed: {0}")]
    StoreFailed(#[source] StoreError),

    /// No node matches a lookup token, directly or as a parent code
    #[error("Undefined lookup: no {entity} with system code '{code}'")]
    LookupNotFound { entity: String, code: String },

    /// Invalid update operation
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),
}

/// Uniqueness rejections from a commit surface as field-level validation errors
impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateName { name } => ValidationError::DuplicateName { name }.into(),
            StoreError::DuplicateCode { code } => {
                ValidationError::DuplicateSystemCode(code).into()
            }
            other => Self::StoreFailed(other),
        }
    }
}

impl RegistryError {
    /// Create a node not found error
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    /// Create an undefined lookup error
    pub fn lookup_not_found(entity: impl Into<String>, code: impl Into<String>) -> Self {
        Self::LookupNotFound {
            entity: entity.into(),
            code: code.into(),
        }
    }

    /// Create an invalid update error
    pub fn invalid_update(msg: impl Into<String>) -> Self {
        Self::InvalidUpdate(msg.into())
    }

    /// The validation failure carried by this error, if any
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::ValidationFailed(err) => Some(err),
            _ => None,
        }
    }
}
