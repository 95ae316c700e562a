//! Selections Core
//!
//! A hierarchical registry of lookup values ("selections") shared by
//! application entities: priorities, statuses, categories and the like.
//!
//! # Architecture
//!
//! - **Tree of nodes**: each node is one value; the children of a node are the
//!   allowed values of the vocabulary it anchors
//! - **System codes**: immutable snake-case codes (`ticket_priority_high`)
//!   drive every convention-based lookup
//! - **Invariant maintenance**: at most one default per sibling set, archived
//!   nodes are never default, names unique among siblings
//! - **Explicit dispatch**: generated predicates and scopes live in a
//!   relationship table with a bounded fallback, not in runtime reflection
//!
//! # Modules
//!
//! - [`models`] - The `Node` entity, ids, drafts and partial updates
//! - [`db`] - Store trait, in-memory arena store and domain events
//! - [`services`] - Registry lifecycle, tree queries, lookup and seeding
//! - [`bindings`] - Host relationships, predicates and scopes
//! - [`forms`] - Option-set resolution and control presentations
//! - [`config`] - Registry configuration
//! - [`utils`] - Inflection helpers

pub mod bindings;
pub mod config;
pub mod db;
pub mod forms;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use bindings::{BindingOptions, DynamicRecord, HostBindings, HostRecord, RelationshipAugmenter};
pub use config::RegistryConfig;
pub use db::{InMemoryStore, NodeStore, RegistryEvent};
pub use forms::{FieldOptions, FieldTag, FieldTagResolver, FormContext, PresentationOptions};
pub use models::*;
pub use services::*;
