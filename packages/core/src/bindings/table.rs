//! Relationship table for a host type
//!
//! [`HostBindings`] holds everything generated for one host type: predicates
//! evaluated against a record, scopes evaluated against a collection, and
//! names accessors. Dispatch by name is a map lookup. A miss falls back to a
//! safe default only when the name starts with the target of a declared
//! relationship; any other miss is [`DispatchError::Undefined`].
//!
//! Names accessors read the id→name map captured at declaration time. When a
//! record references an id the map doesn't know (a value seeded after the
//! declaration), the names are read from the attached registry instead.

use crate::bindings::error::DispatchError;
use crate::bindings::host::{HostFilter, HostRecord};
use crate::models::NodeId;
use crate::services::Registry;
use heck::ToSnakeCase;
use std::collections::HashMap;

/// Whether a relationship references one node or many
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple,
}

/// A declared reference from the host type to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Singular target name (`priority`, `tag`)
    pub target: String,
    /// Storage field on the host (`priority_id`, `tag_ids`)
    pub field_id: String,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone)]
struct Predicate {
    field_id: String,
    node_id: NodeId,
}

#[derive(Debug, Clone)]
struct NamesAccessor {
    field_id: String,
    names: HashMap<NodeId, String>,
}

/// Generated behavior of one host type
#[derive(Debug, Clone)]
pub struct HostBindings {
    host_type: String,
    relationships: Vec<Relationship>,
    predicates: HashMap<String, Predicate>,
    scopes: HashMap<String, HostFilter>,
    names: HashMap<String, NamesAccessor>,
    registry: Option<Registry>,
}

impl HostBindings {
    /// Empty bindings for `host_type`; the name is normalized to snake case
    pub fn new(host_type: &str) -> Self {
        Self {
            host_type: host_type.to_snake_case(),
            relationships: Vec::new(),
            predicates: HashMap::new(),
            scopes: HashMap::new(),
            names: HashMap::new(),
            registry: None,
        }
    }

    pub fn host_type(&self) -> &str {
        &self.host_type
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Generated predicate names, sorted
    pub fn predicate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Generated scope names, sorted
    pub fn scope_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scopes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registry used by names accessors for ids missing from their captured map
    pub(crate) fn attach(&mut self, registry: Registry) {
        self.registry = Some(registry);
    }

    pub(crate) fn declare(&mut self, relationship: Relationship) {
        self.relationships
            .retain(|existing| existing.field_id != relationship.field_id);
        self.relationships.push(relationship);
    }

    pub(crate) fn define_predicate(&mut self, name: String, field_id: &str, node_id: NodeId) {
        self.predicates.insert(
            name,
            Predicate {
                field_id: field_id.to_string(),
                node_id,
            },
        );
    }

    pub(crate) fn define_scope(&mut self, name: String, filter: HostFilter) {
        self.scopes.insert(name, filter);
    }

    pub(crate) fn define_names(
        &mut self,
        accessor: String,
        field_id: &str,
        names: HashMap<NodeId, String>,
    ) {
        self.names.insert(
            accessor,
            NamesAccessor {
                field_id: field_id.to_string(),
                names,
            },
        );
    }

    /// True when `name` starts with the target of a declared relationship
    fn covers(&self, name: &str) -> bool {
        self.relationships
            .iter()
            .any(|relationship| name.starts_with(&relationship.target))
    }

    /// Evaluate a predicate such as `ticket_priority_high?` against `record`
    ///
    /// # Errors
    ///
    /// `DispatchError::Undefined` when the name was not generated and is not
    /// a predicate-shaped name of a declared relationship.
    pub fn predicate(&self, record: &dyn HostRecord, name: &str) -> Result<bool, DispatchError> {
        if let Some(predicate) = self.predicates.get(name) {
            return Ok(record
                .field_value(&predicate.field_id)
                .contains(predicate.node_id));
        }

        if name.ends_with('?') && self.covers(name) {
            tracing::debug!(
                "Predicate '{}' on {} has no generated value, answering false",
                name,
                self.host_type
            );
            return Ok(false);
        }

        Err(DispatchError::undefined(&self.host_type, name))
    }

    /// Resolve a type-level scope such as `ticket_priority_highs`
    ///
    /// A scope-shaped name of a declared relationship without a generated
    /// scope yields [`HostFilter::none`].
    pub fn scope(&self, name: &str) -> Result<HostFilter, DispatchError> {
        if let Some(filter) = self.scopes.get(name) {
            return Ok(filter.clone());
        }

        if !name.ends_with('?') && self.covers(name) {
            tracing::debug!(
                "Scope '{}' on {} has no generated filter, answering empty",
                name,
                self.host_type
            );
            return Ok(HostFilter::none());
        }

        Err(DispatchError::undefined(&self.host_type, name))
    }

    /// Comma-joined names of the nodes `record` references through `accessor`
    ///
    /// # Errors
    ///
    /// `DispatchError::Undefined` for an unknown accessor and
    /// `DispatchError::NamesUnavailable` when the registry read fails.
    pub async fn names(
        &self,
        record: &dyn HostRecord,
        accessor: &str,
    ) -> Result<String, DispatchError> {
        let names = self
            .names
            .get(accessor)
            .ok_or_else(|| DispatchError::undefined(&self.host_type, accessor))?;

        let ids = record.field_value(&names.field_id).ids();
        let known: Vec<&str> = ids
            .iter()
            .filter_map(|id| names.names.get(id).map(String::as_str))
            .collect();

        match &self.registry {
            Some(registry) if known.len() < ids.len() => {
                tracing::debug!(
                    "Names accessor '{}' on {} reads {} ids from the registry",
                    accessor,
                    self.host_type,
                    ids.len()
                );
                registry
                    .names_of(&ids)
                    .await
                    .map_err(|e| DispatchError::names_unavailable(accessor, e.to_string()))
            }
            _ => Ok(known.join(", ")),
        }
    }

    /// Whether dispatching `name` would succeed
    pub fn responds_to(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
            || self.scopes.contains_key(name)
            || self.names.contains_key(name)
            || self.covers(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::host::DynamicRecord;
    use crate::db::InMemoryStore;
    use crate::services::CreateNodeParams;
    use std::sync::Arc;

    fn ticket_bindings() -> HostBindings {
        let mut bindings = HostBindings::new("Ticket");
        bindings.declare(Relationship {
            target: "priority".to_string(),
            field_id: "priority_id".to_string(),
            cardinality: Cardinality::Single,
        });
        bindings.define_predicate("ticket_priority_high?".to_string(), "priority_id", NodeId(4));
        bindings.define_scope(
            "ticket_priority_highs".to_string(),
            HostFilter::equals("priority_id", NodeId(4)),
        );
        bindings.define_names(
            "priority_names".to_string(),
            "priority_id",
            HashMap::from([(NodeId(4), "high".to_string())]),
        );
        bindings
    }

    #[test]
    fn test_host_type_is_snake_cased() {
        assert_eq!(HostBindings::new("SupportTicket").host_type(), "support_ticket");
    }

    #[test]
    fn test_generated_predicate() {
        let bindings = ticket_bindings();
        let record = DynamicRecord::persisted().with_field("priority_id", NodeId(4));
        assert!(bindings.predicate(&record, "ticket_priority_high?").unwrap());

        let other = DynamicRecord::persisted().with_field("priority_id", NodeId(2));
        assert!(!bindings.predicate(&other, "ticket_priority_high?").unwrap());
    }

    #[test]
    fn test_fallback_is_bounded_to_declared_targets() {
        let bindings = ticket_bindings();
        let record = DynamicRecord::persisted();

        assert!(!bindings.predicate(&record, "priority_urgent?").unwrap());
        assert!(bindings.scope("priority_urgents").unwrap().is_none());

        assert_eq!(
            bindings.predicate(&record, "severity_high?").unwrap_err(),
            DispatchError::undefined("ticket", "severity_high?")
        );
        assert!(bindings.scope("severity_highs").is_err());
        // Not predicate-shaped
        assert!(bindings.predicate(&record, "priority_urgent").is_err());
    }

    #[tokio::test]
    async fn test_names_accessor() {
        let bindings = ticket_bindings();
        let record = DynamicRecord::persisted().with_field("priority_id", NodeId(4));
        assert_eq!(bindings.names(&record, "priority_names").await.unwrap(), "high");
        assert_eq!(
            bindings
                .names(&DynamicRecord::new(), "priority_names")
                .await
                .unwrap(),
            ""
        );
        assert!(bindings.names(&record, "severity_names").await.is_err());
    }

    #[tokio::test]
    async fn test_names_accessor_reads_unknown_ids_from_registry() {
        let registry = Registry::new(Arc::new(InMemoryStore::new()));
        let root = registry.create(CreateNodeParams::new("priority")).await.unwrap();
        let urgent = registry
            .create(CreateNodeParams::new("urgent").under(root.id))
            .await
            .unwrap();

        let mut bindings = ticket_bindings();
        let record = DynamicRecord::persisted().with_field("priority_id", urgent.id);
        // Without a registry only the captured map is consulted
        assert_eq!(bindings.names(&record, "priority_names").await.unwrap(), "");

        bindings.attach(registry);
        assert_eq!(
            bindings.names(&record, "priority_names").await.unwrap(),
            "urgent"
        );
    }

    #[test]
    fn test_responds_to() {
        let bindings = ticket_bindings();
        assert!(bindings.responds_to("ticket_priority_high?"));
        assert!(bindings.responds_to("priority_names"));
        assert!(bindings.responds_to("priority_anything"));
        assert!(!bindings.responds_to("severity_high?"));
    }
}
