//! Business Services
//!
//! This module contains the registry's business logic:
//!
//! - `Registry` - node lifecycle, invariant maintenance and tree queries
//! - `Registry::lookup` - dynamic lookup of a node or its values by code token
//! - `seed` - idempotent creation of vocabularies from JSON seed documents
//!
//! Services coordinate between the persistence layer and the bindings/forms
//! consumers, enforcing every registry rule before a write is committed.

pub mod error;
mod lookup;
mod registry;
pub mod seed;

pub use error::RegistryError;
pub use lookup::Lookup;
pub use registry::{derive_system_code, CreateNodeParams, Registry};
pub use seed::{load_seed_file, parse_seed, seed_vocabulary, SeedNode, SeedReport};
