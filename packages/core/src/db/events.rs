//! Registry Domain Events
//!
//! Events emitted by the registry service after a successful commit. Other
//! parts of an application (caches of rendered option lists, audit logs) can
//! subscribe without coupling to the store implementation.
//!
//! Events are broadcast over a tokio broadcast channel; with no subscribers
//! they are dropped.

use crate::models::{Node, NodeId};

/// Domain events emitted by the registry
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A new node was created
    NodeCreated(Node),

    /// An existing node was updated
    NodeUpdated(Node),

    /// A sibling lost its default flag because another node became default
    DefaultCleared { id: NodeId },
}

impl RegistryEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            RegistryEvent::NodeCreated(_) => "node:created",
            RegistryEvent::NodeUpdated(_) => "node:updated",
            RegistryEvent::DefaultCleared { .. } => "node:default-cleared",
        }
    }
}
