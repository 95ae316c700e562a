//! Utility functions shared across the registry, bindings and forms layers.

pub mod inflection;

pub use inflection::{code_fragment, collapse_underscores, pluralize, singularize};
