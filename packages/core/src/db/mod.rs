//! Persistence Layer
//!
//! This module is the boundary between the registry and whatever engine
//! stores its nodes:
//!
//! - [`NodeStore`] - async persistence trait (reads, ordered child listings,
//!   atomic write batches)
//! - [`InMemoryStore`] - arena-backed implementation used by the seeding tool
//!   and by tests
//! - [`RegistryEvent`] - domain events broadcast after successful commits

mod error;
pub mod events;
mod memory_store;
mod node_store;

pub use error::StoreError;
pub use events::RegistryEvent;
pub use memory_store::InMemoryStore;
pub use node_store::{Committed, NodeStore, NodeWrite, WriteBatch};
