//! In-memory arena implementation of [`NodeStore`]
//!
//! Nodes live in an arena keyed by id. Two secondary indexes are maintained
//! alongside it: parent → child ids and system code → ids. No node holds a
//! reference to another node, so the tree can never form an ownership cycle.
//!
//! All writes of a batch happen under one write lock, which gives the atomic
//! commit semantics the registry relies on for default maintenance and for
//! sibling-name and system-code uniqueness.

use crate::config::CodeUniqueness;
use crate::db::node_store::{Committed, NodeStore, NodeWrite, WriteBatch};
use crate::db::StoreError;
use crate::models::{Node, NodeId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Arena {
    nodes: HashMap<NodeId, Node>,
    children: HashMap<Option<NodeId>, Vec<NodeId>>,
    codes: HashMap<String, Vec<NodeId>>,
    last_id: i64,
}

impl Arena {
    fn ordered(&self, ids: &[NodeId]) -> Vec<Node> {
        let mut nodes: Vec<Node> = ids
            .iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect();
        nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()).then(a.id.cmp(&b.id)));
        nodes
    }

    fn check_parent(&self, parent_id: Option<NodeId>) -> Result<(), StoreError> {
        match parent_id {
            Some(pid) if !self.nodes.contains_key(&pid) => Err(StoreError::parent_not_found(pid)),
            _ => Ok(()),
        }
    }

    fn check_sibling_name(
        &self,
        parent_id: Option<NodeId>,
        name: &str,
        except: Option<NodeId>,
    ) -> Result<(), StoreError> {
        let taken = self.children.get(&parent_id).is_some_and(|ids| {
            ids.iter()
                .filter(|id| Some(**id) != except)
                .filter_map(|id| self.nodes.get(id))
                .any(|sibling| sibling.name == name)
        });
        if taken {
            return Err(StoreError::duplicate_name(name));
        }
        Ok(())
    }

    fn check_code(
        &self,
        scope: CodeUniqueness,
        code: &str,
        archived_at: Option<DateTime<Utc>>,
        except: Option<NodeId>,
    ) -> Result<(), StoreError> {
        let taken = self.codes.get(code).is_some_and(|ids| {
            ids.iter()
                .filter(|id| Some(**id) != except)
                .filter_map(|id| self.nodes.get(id))
                .any(|other| scope.collides(archived_at, other.archived_at))
        });
        if taken {
            return Err(StoreError::duplicate_code(code));
        }
        Ok(())
    }

    fn clear_sibling_defaults(&mut self, parent_id: Option<NodeId>, except: NodeId) -> Vec<NodeId> {
        let now = Utc::now();
        let sibling_ids = self.children.get(&parent_id).cloned().unwrap_or_default();
        let mut cleared = Vec::new();

        for sibling_id in sibling_ids {
            if sibling_id == except {
                continue;
            }
            if let Some(sibling) = self.nodes.get_mut(&sibling_id) {
                if sibling.is_default {
                    sibling.is_default = false;
                    sibling.updated_at = now;
                    cleared.push(sibling_id);
                }
            }
        }

        cleared
    }

    fn detach(&mut self, parent_id: Option<NodeId>, id: NodeId) {
        if let Some(siblings) = self.children.get_mut(&parent_id) {
            siblings.retain(|sibling| *sibling != id);
        }
    }
}

/// Node store backed by an in-process arena
#[derive(Debug, Default)]
pub struct InMemoryStore {
    arena: RwLock<Arena>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes stored
    pub async fn len(&self) -> usize {
        self.arena.read().await.nodes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NodeStore for InMemoryStore {
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        Ok(self.arena.read().await.nodes.get(&id).cloned())
    }

    async fn get_nodes(&self, ids: &[NodeId]) -> Result<Vec<Node>, StoreError> {
        let arena = self.arena.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| arena.nodes.get(id).cloned())
            .collect())
    }

    async fn get_children(&self, parent_id: Option<NodeId>) -> Result<Vec<Node>, StoreError> {
        let arena = self.arena.read().await;
        Ok(arena
            .children
            .get(&parent_id)
            .map(|ids| arena.ordered(ids))
            .unwrap_or_default())
    }

    async fn has_children(&self, id: NodeId) -> Result<bool, StoreError> {
        let arena = self.arena.read().await;
        Ok(arena
            .children
            .get(&Some(id))
            .is_some_and(|ids| !ids.is_empty()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Vec<Node>, StoreError> {
        let arena = self.arena.read().await;
        let mut ids = arena.codes.get(code).cloned().unwrap_or_default();
        ids.sort();
        Ok(ids
            .iter()
            .filter_map(|id| arena.nodes.get(id).cloned())
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<Committed, StoreError> {
        let mut arena = self.arena.write().await;
        let now = Utc::now();

        let node = match batch.write {
            NodeWrite::Insert(draft) => {
                arena.check_parent(draft.parent_id)?;
                if batch.unique_sibling_name {
                    arena.check_sibling_name(draft.parent_id, &draft.name, None)?;
                }
                if let Some(scope) = batch.unique_code {
                    arena.check_code(scope, &draft.system_code, draft.archived_at, None)?;
                }

                arena.last_id += 1;
                let node = Node {
                    id: NodeId(arena.last_id),
                    name: draft.name,
                    parent_id: draft.parent_id,
                    system_code: draft.system_code,
                    position_value: draft.position_value,
                    is_default: draft.is_default,
                    is_system: draft.is_system,
                    archived_at: draft.archived_at,
                    created_at: now,
                    updated_at: now,
                };

                arena
                    .children
                    .entry(node.parent_id)
                    .or_default()
                    .push(node.id);
                arena
                    .codes
                    .entry(node.system_code.clone())
                    .or_default()
                    .push(node.id);
                arena.nodes.insert(node.id, node.clone());
                node
            }
            NodeWrite::Update(mut node) => {
                let previous_parent = arena
                    .nodes
                    .get(&node.id)
                    .map(|existing| existing.parent_id)
                    .ok_or_else(|| StoreError::node_not_found(node.id))?;
                arena.check_parent(node.parent_id)?;
                if batch.unique_sibling_name {
                    arena.check_sibling_name(node.parent_id, &node.name, Some(node.id))?;
                }
                if let Some(scope) = batch.unique_code {
                    arena.check_code(scope, &node.system_code, node.archived_at, Some(node.id))?;
                }

                if previous_parent != node.parent_id {
                    arena.detach(previous_parent, node.id);
                    arena
                        .children
                        .entry(node.parent_id)
                        .or_default()
                        .push(node.id);
                }

                node.updated_at = now;
                arena.nodes.insert(node.id, node.clone());
                node
            }
        };

        let cleared = if batch.clear_sibling_default {
            arena.clear_sibling_defaults(node.parent_id, node.id)
        } else {
            Vec::new()
        };

        Ok(Committed { node, cleared })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HIDDEN_POSITION;
    use crate::models::NodeDraft;

    fn draft(name: &str, parent_id: Option<NodeId>, position_value: i64) -> NodeDraft {
        NodeDraft {
            name: name.to_string(),
            parent_id,
            system_code: name.to_lowercase(),
            position_value,
            is_default: false,
            is_system: false,
            archived_at: None,
        }
    }

    async fn insert(store: &InMemoryStore, draft: NodeDraft) -> Node {
        store
            .commit(WriteBatch::new(NodeWrite::Insert(draft)))
            .await
            .unwrap()
            .node
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let store = InMemoryStore::new();
        let root = insert(&store, draft("priority", None, HIDDEN_POSITION)).await;
        let low = insert(&store, draft("low", Some(root.id), HIDDEN_POSITION)).await;

        assert_eq!(root.id, NodeId(1));
        assert_eq!(low.id, NodeId(2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_children_ordered_by_position_then_name() {
        let store = InMemoryStore::new();
        let root = insert(&store, draft("root", None, HIDDEN_POSITION)).await;
        insert(&store, draft("zulu", Some(root.id), HIDDEN_POSITION)).await;
        insert(&store, draft("alpha", Some(root.id), HIDDEN_POSITION)).await;
        insert(&store, draft("mike", Some(root.id), 1)).await;

        let names: Vec<String> = store
            .get_children(Some(root.id))
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["mike", "alpha", "zulu"]);
        assert!(store.has_children(root.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_rejects_missing_parent_without_side_effects() {
        let store = InMemoryStore::new();
        let err = store
            .commit(WriteBatch::new(NodeWrite::Insert(draft(
                "orphan",
                Some(NodeId(99)),
                HIDDEN_POSITION,
            ))))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::parent_not_found(NodeId(99)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_sibling_default_in_same_commit() {
        let store = InMemoryStore::new();
        let root = insert(&store, draft("root", None, HIDDEN_POSITION)).await;
        let mut first = draft("first", Some(root.id), HIDDEN_POSITION);
        first.is_default = true;
        let first = insert(&store, first).await;

        let mut second = draft("second", Some(root.id), HIDDEN_POSITION);
        second.is_default = true;
        let committed = store
            .commit(WriteBatch::new(NodeWrite::Insert(second)).clearing_sibling_default(true))
            .await
            .unwrap();

        assert_eq!(committed.cleared, vec![first.id]);
        let first = store.get_node(first.id).await.unwrap().unwrap();
        assert!(!first.is_default);
    }

    #[tokio::test]
    async fn test_commit_rechecks_uniqueness_under_lock() {
        let store = InMemoryStore::new();
        let root = insert(&store, draft("root", None, HIDDEN_POSITION)).await;
        insert(&store, draft("high", Some(root.id), HIDDEN_POSITION)).await;

        let mut same_name = draft("high", Some(root.id), HIDDEN_POSITION);
        same_name.system_code = "other_high".to_string();
        let err = store
            .commit(WriteBatch::new(NodeWrite::Insert(same_name)).requiring_unique_name(true))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::duplicate_name("high"));

        let unchecked = draft("High", None, HIDDEN_POSITION);
        let err = store
            .commit(
                WriteBatch::new(NodeWrite::Insert(draft("high", None, HIDDEN_POSITION)))
                    .requiring_unique_code(Some(CodeUniqueness::ActiveOnly)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::duplicate_code("high"));

        // Without the checks the batch is written as given
        store
            .commit(WriteBatch::new(NodeWrite::Insert(unchecked)))
            .await
            .unwrap();
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_update_moves_between_parents() {
        let store = InMemoryStore::new();
        let a = insert(&store, draft("a", None, HIDDEN_POSITION)).await;
        let b = insert(&store, draft("b", None, HIDDEN_POSITION)).await;
        let mut child = insert(&store, draft("child", Some(a.id), HIDDEN_POSITION)).await;

        child.parent_id = Some(b.id);
        store
            .commit(WriteBatch::new(NodeWrite::Update(child)))
            .await
            .unwrap();

        assert!(!store.has_children(a.id).await.unwrap());
        assert_eq!(store.get_children(Some(b.id)).await.unwrap().len(), 1);
    }
}
