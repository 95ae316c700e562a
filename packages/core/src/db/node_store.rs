//! NodeStore Trait - Persistence Abstraction Layer
//!
//! This module defines the `NodeStore` trait that abstracts persistence of
//! registry nodes. The registry service owns every business rule; a store
//! only has to provide:
//!
//! - id assignment on insert
//! - point reads, code lookups and ordered child listings
//! - atomic write batches (a node write, uniqueness re-checks and sibling
//!   default clearing)
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async so that both embedded and
//!    networked backends fit behind the same trait
//! 2. **Ownership Semantics**: writes take ownership of the node to avoid cloning
//! 3. **Atomic default maintenance**: clearing a sibling's default flag is part
//!    of the same commit as the write that sets a new default, so readers
//!    never observe two defaults in one sibling set
//! 4. **Uniqueness under the write lock**: the registry validates sibling names
//!    and system codes up front, and the batch asks the store to re-check them
//!    while committing, so two concurrent writers cannot both pass
//!
//! # Examples
//!
//! ```rust
//! use selections_core::db::{InMemoryStore, NodeStore, NodeWrite, WriteBatch};
//! use selections_core::models::NodeDraft;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let store = InMemoryStore::new();
//! let committed = store
//!     .commit(WriteBatch::new(NodeWrite::Insert(NodeDraft {
//!         name: "priority".to_string(),
//!         parent_id: None,
//!         system_code: "priority".to_string(),
//!         position_value: 999888777,
//!         is_default: false,
//!         is_system: false,
//!         archived_at: None,
//!     })))
//!     .await?;
//! assert_eq!(committed.node.id.0, 1);
//! # Ok(())
//! # }
//! ```

use crate::config::CodeUniqueness;
use crate::db::StoreError;
use crate::models::{Node, NodeDraft, NodeId};
use async_trait::async_trait;

/// The node write carried by a [`WriteBatch`]
#[derive(Debug, Clone)]
pub enum NodeWrite {
    /// Insert a new node; the store assigns its id and timestamps
    Insert(NodeDraft),

    /// Replace an existing node; the store refreshes `updated_at`
    Update(Node),
}

/// A set of writes applied atomically by [`NodeStore::commit`]
#[derive(Debug, Clone)]
pub struct WriteBatch {
    pub write: NodeWrite,

    /// Clear `is_default` on every other node sharing the written node's parent
    pub clear_sibling_default: bool,

    /// Reject the write if another sibling has the same name
    pub unique_sibling_name: bool,

    /// Reject the write if the system code collides within this scope
    pub unique_code: Option<CodeUniqueness>,
}

impl WriteBatch {
    pub fn new(write: NodeWrite) -> Self {
        Self {
            write,
            clear_sibling_default: false,
            unique_sibling_name: false,
            unique_code: None,
        }
    }

    pub fn clearing_sibling_default(mut self, clear: bool) -> Self {
        self.clear_sibling_default = clear;
        self
    }

    pub fn requiring_unique_name(mut self, check: bool) -> Self {
        self.unique_sibling_name = check;
        self
    }

    pub fn requiring_unique_code(mut self, scope: Option<CodeUniqueness>) -> Self {
        self.unique_code = scope;
        self
    }
}

/// Result of a successful commit
#[derive(Debug, Clone)]
pub struct Committed {
    /// The node as persisted
    pub node: Node,

    /// Siblings whose default flag was cleared by this commit
    pub cleared: Vec<NodeId>,
}

/// Abstraction layer for node persistence operations
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so one store can be shared behind an
/// `Arc` by the registry, the augmenter and the field resolver.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Get node by ID (`Ok(None)` if it doesn't exist)
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>, StoreError>;

    /// Get the nodes with the given ids, in the order requested; unknown ids are skipped
    async fn get_nodes(&self, ids: &[NodeId]) -> Result<Vec<Node>, StoreError>;

    /// Direct children of `parent_id` (`None` = roots), ordered by `(position_value, name)`
    async fn get_children(&self, parent_id: Option<NodeId>) -> Result<Vec<Node>, StoreError>;

    /// Whether `id` has at least one child
    async fn has_children(&self, id: NodeId) -> Result<bool, StoreError>;

    /// Every node whose `system_code` equals `code` exactly, oldest first
    async fn find_by_code(&self, code: &str) -> Result<Vec<Node>, StoreError>;

    /// Apply a write batch atomically
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if an update targets a missing node
    /// - `ParentNotFound` if the written node references a missing parent
    /// - `DuplicateName` / `DuplicateCode` if a requested uniqueness check fails
    ///
    /// On error no part of the batch is applied.
    async fn commit(&self, batch: WriteBatch) -> Result<Committed, StoreError>;
}
