//! Host Bindings
//!
//! Connects application entity types to the registry:
//!
//! - `host` - Host record access and record filters
//! - `table` - Per-host relationship table and name dispatch
//! - `augmenter` - Generation of predicates, scopes and names accessors

pub mod augmenter;
pub mod error;
pub mod host;
pub mod table;

pub use augmenter::{BindingOptions, BindingReport, RelationshipAugmenter};
pub use error::DispatchError;
pub use host::{DynamicRecord, FieldValue, HostFilter, HostRecord, Matcher};
pub use table::{Cardinality, HostBindings, Relationship};
