//! Registry Service - Node Lifecycle and Tree Queries
//!
//! This module provides the business logic layer for registry nodes:
//!
//! - Creation with system-code derivation and validation
//! - Updates with system-code immutability and default maintenance
//! - Tree queries (children, roots, grandchildren, leaf checks)
//! - Code lookups and selectable-value filtering
//!
//! # Default Maintenance
//!
//! Every create and update runs the same two steps before committing:
//!
//! 1. If the node ends up with `is_default = true`, the commit also clears the
//!    default flag of any sibling (same `parent_id`)
//! 2. If the node is archived, its own `is_default` is forced to `false`
//!
//! Step 1 is evaluated before step 2, so archiving a node while promoting it
//! clears the previous default and leaves no default in the sibling set.
//! Both happen inside one store commit.
//!
//! # Uniqueness
//!
//! Sibling names and system codes are checked before the commit so that
//! failures carry precise validation errors, and the commit re-checks both
//! under the store's write lock so concurrent writers cannot both pass.
//!
//! # System Code Derivation
//!
//! When no explicit code is supplied at creation, the code is derived from the
//! name (`"Board Chairman"` → `board_chairman`) and prefixed with the parent's
//! code (`board_chairman_ceo`). Codes are never re-derived or changed later.

use crate::config::RegistryConfig;
use crate::db::{NodeStore, NodeWrite, RegistryEvent, WriteBatch};
use crate::models::{
    position_to_value, Node, NodeDraft, NodeId, NodeUpdate, ValidationError,
};
use crate::services::error::RegistryError;
use crate::utils::{code_fragment, collapse_underscores};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Parameters for creating a node
///
/// # Examples
///
/// ```rust
/// # use selections_core::services::CreateNodeParams;
/// # use selections_core::models::NodeId;
/// let params = CreateNodeParams::new("High")
///     .under(NodeId(1))
///     .at_position(3)
///     .as_default();
/// assert_eq!(params.parent_id, Some(NodeId(1)));
/// assert!(params.system_code.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreateNodeParams {
    /// Display name (required, unique among siblings)
    pub name: String,
    /// Optional parent node (`None` creates a root)
    pub parent_id: Option<NodeId>,
    /// Explicit system code; derived from the name when `None`
    pub system_code: Option<String>,
    /// Explicit display position; hidden when `None`
    pub position: Option<i64>,
    /// Make this node the default of its sibling set
    pub is_default: bool,
    /// Reserved system flag
    pub is_system: bool,
}

impl CreateNodeParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn under(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_code(mut self, system_code: impl Into<String>) -> Self {
        self.system_code = Some(system_code.into());
        self
    }

    pub fn at_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Derive a system code from a name and optional parent code
///
/// `derive_system_code("Head Janitor", Some("board_chairman_ceo"))` yields
/// `board_chairman_ceo_head_janitor`.
pub fn derive_system_code(name: &str, parent_code: Option<&str>) -> String {
    let fragment = code_fragment(name);
    let code = match parent_code {
        Some(parent_code) => format!("{}_{}", parent_code, fragment),
        None => fragment,
    };
    collapse_underscores(&code)
}

/// The selections registry
///
/// Cheap to clone; clones share the store, configuration and event channel.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn NodeStore>,
    config: Arc<RegistryConfig>,
    event_tx: broadcast::Sender<RegistryEvent>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Create a registry over `store` with the default configuration
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self::with_config(store, RegistryConfig::default())
    }

    /// Create a registry over `store` with an explicit configuration
    pub fn with_config(store: Arc<dyn NodeStore>, config: RegistryConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            store,
            config: Arc::new(config),
            event_tx,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Subscribe to registry events
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: RegistryEvent) {
        let _ = self.event_tx.send(event);
    }

    fn emit_commit(&self, node: &Node, cleared: &[NodeId], created: bool) {
        for id in cleared {
            tracing::debug!(
                "Cleared default flag on {} {} (superseded by {})",
                self.config.entity_name,
                id,
                node.id
            );
            self.emit_event(RegistryEvent::DefaultCleared { id: *id });
        }
        if created {
            self.emit_event(RegistryEvent::NodeCreated(node.clone()));
        } else {
            self.emit_event(RegistryEvent::NodeUpdated(node.clone()));
        }
    }

    /// Create a new node
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when the name is blank or taken by a sibling, the
    /// system code is malformed or already taken, or the parent is missing.
    pub async fn create(&self, params: CreateNodeParams) -> Result<Node, RegistryError> {
        let parent = match params.parent_id {
            Some(parent_id) => Some(self.store.get_node(parent_id).await?.ok_or_else(|| {
                ValidationError::InvalidParent(format!("{} does not exist", parent_id))
            })?),
            None => None,
        };

        let system_code = match params.system_code {
            Some(code) => code,
            None => derive_system_code(
                &params.name,
                parent.as_ref().map(|p| p.system_code.as_str()),
            ),
        };

        let draft = NodeDraft {
            name: params.name,
            parent_id: params.parent_id,
            system_code,
            position_value: position_to_value(params.position),
            is_default: params.is_default,
            is_system: params.is_system,
            archived_at: None,
        };

        draft.validate()?;
        self.check_sibling_name(draft.parent_id, &draft.name, None)
            .await?;
        self.check_code_unique(&draft.system_code, draft.archived_at, None)
            .await?;

        let clear_sibling_default = draft.is_default;
        let committed = self
            .store
            .commit(
                WriteBatch::new(NodeWrite::Insert(draft))
                    .clearing_sibling_default(clear_sibling_default)
                    .requiring_unique_name(true)
                    .requiring_unique_code(Some(self.config.code_uniqueness)),
            )
            .await?;

        tracing::info!(
            "Created {} '{}' ({}) with id {}",
            self.config.entity_name,
            committed.node.name,
            committed.node.system_code,
            committed.node.id
        );
        self.emit_commit(&committed.node, &committed.cleared, true);

        Ok(committed.node)
    }

    /// Apply a partial update to a node
    ///
    /// # Errors
    ///
    /// - `InvalidUpdate` if the update is empty
    /// - `ValidationFailed(ImmutableSystemCode)` if `system_code` is present
    /// - `NodeNotFound` if `id` doesn't exist
    /// - `ValidationFailed` for name, parent or code-uniqueness violations
    ///
    /// A failed update leaves the stored node untouched.
    pub async fn update(&self, id: NodeId, update: NodeUpdate) -> Result<Node, RegistryError> {
        if update.is_empty() {
            return Err(RegistryError::invalid_update("Update contains no changes"));
        }

        if update.system_code.is_some() {
            return Err(ValidationError::ImmutableSystemCode.into());
        }

        let existing = self
            .store
            .get_node(id)
            .await?
            .ok_or_else(|| RegistryError::node_not_found(id))?;

        let mut updated = existing.clone();

        if let Some(name) = update.name {
            updated.name = name;
        }

        if let Some(parent_id) = update.parent_id {
            self.check_parent_move(id, parent_id).await?;
            updated.parent_id = parent_id;
        }

        if let Some(position) = update.position {
            updated.position_value = position_to_value(position);
        }

        if let Some(is_default) = update.is_default {
            updated.is_default = is_default;
        }

        if let Some(archived) = update.archived {
            if !archived {
                updated.archived_at = None;
            } else if updated.archived_at.is_none() {
                updated.archived_at = Some(Utc::now());
            }
        }

        if let Some(is_system) = update.is_system {
            updated.is_system = is_system;
        }

        updated.validate()?;

        let name_moved = updated.name != existing.name || updated.parent_id != existing.parent_id;
        if name_moved {
            self.check_sibling_name(updated.parent_id, &updated.name, Some(id))
                .await?;
        }

        let archival_changed = updated.archived_at != existing.archived_at;
        if archival_changed {
            self.check_code_unique(&updated.system_code, updated.archived_at, Some(id))
                .await?;
        }

        let clear_sibling_default = updated.is_default;
        if updated.is_archived() {
            updated.is_default = false;
        }

        let committed = self
            .store
            .commit(
                WriteBatch::new(NodeWrite::Update(updated))
                    .clearing_sibling_default(clear_sibling_default)
                    .requiring_unique_name(name_moved)
                    .requiring_unique_code(archival_changed.then_some(self.config.code_uniqueness)),
            )
            .await?;

        tracing::debug!(
            "Updated {} {} ({})",
            self.config.entity_name,
            committed.node.id,
            committed.node.system_code
        );
        self.emit_commit(&committed.node, &committed.cleared, false);

        Ok(committed.node)
    }

    /// Archive a node (idempotent: an existing timestamp is kept)
    pub async fn archive(&self, id: NodeId) -> Result<Node, RegistryError> {
        self.update(id, NodeUpdate::new().with_archived(true)).await
    }

    /// Return an archived node to the selectable set
    pub async fn restore(&self, id: NodeId) -> Result<Node, RegistryError> {
        self.update(id, NodeUpdate::new().with_archived(false)).await
    }

    /// Get node by ID
    pub async fn get(&self, id: NodeId) -> Result<Option<Node>, RegistryError> {
        Ok(self.store.get_node(id).await?)
    }

    /// Direct children of `id`, ordered by `(position_value, name)`
    ///
    /// An unknown id simply has no children.
    pub async fn children(&self, id: NodeId) -> Result<Vec<Node>, RegistryError> {
        Ok(self.store.get_children(Some(id)).await?)
    }

    /// Root nodes, ordered by `(position_value, name)`
    pub async fn roots(&self) -> Result<Vec<Node>, RegistryError> {
        Ok(self.store.get_children(None).await?)
    }

    /// Children of every child of `id`, grouped by child in listing order
    pub async fn grandchildren(&self, id: NodeId) -> Result<Vec<Node>, RegistryError> {
        let mut grandchildren = Vec::new();
        for child in self.children(id).await? {
            grandchildren.extend(self.children(child.id).await?);
        }
        Ok(grandchildren)
    }

    /// True iff `id` has no children
    pub async fn is_leaf(&self, id: NodeId) -> Result<bool, RegistryError> {
        Ok(!self.store.has_children(id).await?)
    }

    /// Find a node by exact system code
    ///
    /// When archived nodes share the code of an active node, the active node wins.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Node>, RegistryError> {
        let mut matches = self.store.find_by_code(code).await?;
        let active = matches.iter().position(|node| !node.is_archived());
        Ok(match active {
            Some(idx) => Some(matches.swap_remove(idx)),
            None => matches.into_iter().next(),
        })
    }

    /// Keep every unarchived node plus any archived node that is currently selected
    ///
    /// Existing references to retired values stay displayable instead of
    /// silently disappearing from a form. Order is preserved.
    pub fn filter_selectable(children: Vec<Node>, selected: &[NodeId]) -> Vec<Node> {
        children
            .into_iter()
            .filter(|node| !node.is_archived() || selected.contains(&node.id))
            .collect()
    }

    /// Comma-joined names of the given nodes, in the order given; unknown ids are skipped
    pub async fn names_of(&self, ids: &[NodeId]) -> Result<String, RegistryError> {
        let nodes = self.store.get_nodes(ids).await?;
        Ok(nodes
            .iter()
            .map(|node| node.name.as_str())
            .collect::<Vec<_>>()
            .join(", "))
    }

    async fn check_sibling_name(
        &self,
        parent_id: Option<NodeId>,
        name: &str,
        except: Option<NodeId>,
    ) -> Result<(), RegistryError> {
        let siblings = self.store.get_children(parent_id).await?;

        if siblings
            .iter()
            .any(|sibling| sibling.name == name && Some(sibling.id) != except)
        {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn check_code_unique(
        &self,
        code: &str,
        archived_at: Option<DateTime<Utc>>,
        except: Option<NodeId>,
    ) -> Result<(), RegistryError> {
        let scope = self.config.code_uniqueness;
        let taken = self
            .store
            .find_by_code(code)
            .await?
            .iter()
            .filter(|node| Some(node.id) != except)
            .any(|node| scope.collides(archived_at, node.archived_at));

        if taken {
            return Err(ValidationError::DuplicateSystemCode(code.to_string()).into());
        }
        Ok(())
    }

    /// Reject moves to a missing parent, to self, or below one's own descendants
    async fn check_parent_move(
        &self,
        id: NodeId,
        parent_id: Option<NodeId>,
    ) -> Result<(), RegistryError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        if parent_id == id {
            return Err(ValidationError::CircularReference(
                "Node cannot be its own parent".to_string(),
            )
            .into());
        }

        let mut visited = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if !visited.insert(current) {
                break;
            }
            let node = self.store.get_node(current).await?.ok_or_else(|| {
                ValidationError::InvalidParent(format!("{} does not exist", current))
            })?;
            if node.parent_id == Some(id) || node.id == id {
                return Err(ValidationError::CircularReference(format!(
                    "{} is a descendant of {}",
                    parent_id, id
                ))
                .into());
            }
            cursor = node.parent_id;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
