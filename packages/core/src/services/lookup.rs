//! Dynamic code lookup
//!
//! A single entry point for ergonomic access by bare code token:
//! `lookup("priority")` yields the `priority` node itself, while
//! `lookup("priorities")` yields the values under it.

use crate::models::Node;
use crate::services::error::RegistryError;
use crate::services::registry::Registry;
use crate::utils::singularize;

/// Result of [`Registry::lookup`]
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The token matched a node's system code exactly
    Node(Node),

    /// The singularized token matched a node's code; these are its children
    Children(Vec<Node>),
}

impl Lookup {
    pub fn node(&self) -> Option<&Node> {
        match self {
            Lookup::Node(node) => Some(node),
            Lookup::Children(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Lookup::Node(_) => None,
            Lookup::Children(children) => Some(children),
        }
    }
}

impl Registry {
    /// Resolve a bare code token
    ///
    /// 1. Exact `system_code` match → [`Lookup::Node`]
    /// 2. Singularized token matches a code → [`Lookup::Children`] of that node
    /// 3. Otherwise → [`RegistryError::LookupNotFound`]
    pub async fn lookup(&self, token: &str) -> Result<Lookup, RegistryError> {
        if let Some(node) = self.find_by_code(token).await? {
            return Ok(Lookup::Node(node));
        }

        let singular = singularize(token);
        if singular != token {
            if let Some(parent) = self.find_by_code(&singular).await? {
                tracing::debug!(
                    "Lookup '{}' resolved to children of '{}'",
                    token,
                    parent.system_code
                );
                return Ok(Lookup::Children(self.children(parent.id).await?));
            }
        }

        Err(RegistryError::lookup_not_found(
            self.config().entity_name.clone(),
            token,
        ))
    }
}
