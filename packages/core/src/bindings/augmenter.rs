//! Relationship Augmenter
//!
//! Declares a host type's reference to the registry and generates its
//! behavior from the vocabulary present at declaration time.
//!
//! # Anchor Resolution
//!
//! The anchor is the node whose children are the allowed values. It is found
//! by trying, in order:
//!
//! 1. The `system_code` override from [`BindingOptions`]
//! 2. `"{host_type}_{target}"` (e.g. `ticket_priority`)
//! 3. `target` alone (e.g. `priority`)
//!
//! When none resolves the relationship is still declared, so fallback
//! dispatch and the names accessor work, but nothing is generated. Vocabularies
//! may be seeded after host types are declared, so this is only a warning.
//!
//! # Names Accessors
//!
//! Every declaration installs `{target}_names`. Single-valued declarations
//! also answer to `{target}_name`.
//!
//! # Generated Names
//!
//! For an anchor child with code `ticket_priority_high`:
//!
//! | Options                          | Predicates                                 | Scopes                                   |
//! |----------------------------------|--------------------------------------------|------------------------------------------|
//! | no override                      | `ticket_priority_high?`, `priority_high?`  | `ticket_priority_highs`, `priority_highs` |
//! | `system_code: "ticket_priority"` | `priority_high?`                           | `priority_highs`                         |
//!
//! The unprefixed alias is only generated when the code starts with the host
//! type prefix.

use crate::bindings::host::HostFilter;
use crate::bindings::table::{Cardinality, HostBindings, Relationship};
use crate::models::Node;
use crate::services::{Registry, RegistryError};
use crate::utils::{pluralize, singularize};
use std::collections::HashMap;

/// Options of a relationship declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingOptions {
    /// Explicit anchor code, tried before the naming conventions
    pub system_code: Option<String>,
    /// Generate instance-level predicates
    pub predicates: bool,
    /// Generate type-level scopes
    pub scopes: bool,
}

impl BindingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_code(mut self, system_code: impl Into<String>) -> Self {
        self.system_code = Some(system_code.into());
        self
    }

    pub fn with_predicates(mut self) -> Self {
        self.predicates = true;
        self
    }

    pub fn with_scopes(mut self) -> Self {
        self.scopes = true;
        self
    }
}

/// What a declaration generated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingReport {
    /// Code of the resolved anchor, if any
    pub anchor: Option<String>,
    pub predicates: Vec<String>,
    pub scopes: Vec<String>,
    pub names_accessor: String,
}

/// Generates host bindings from the registry
#[derive(Clone)]
pub struct RelationshipAugmenter {
    registry: Registry,
}

impl RelationshipAugmenter {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Declare a single-valued reference stored in `{field}_id`
    pub async fn reference_to_registry(
        &self,
        bindings: &mut HostBindings,
        field: &str,
        options: BindingOptions,
    ) -> Result<BindingReport, RegistryError> {
        let relationship = Relationship {
            target: field.to_string(),
            field_id: format!("{}_id", field),
            cardinality: Cardinality::Single,
        };
        let accessors = [format!("{}_names", field), format!("{}_name", field)];
        self.bind(bindings, relationship, &accessors, options).await
    }

    /// Declare a multi-valued reference stored in `{singular(field)}_ids`
    pub async fn references_registry(
        &self,
        bindings: &mut HostBindings,
        field: &str,
        options: BindingOptions,
    ) -> Result<BindingReport, RegistryError> {
        let target = singularize(field);
        let relationship = Relationship {
            field_id: format!("{}_ids", target),
            target: target.clone(),
            cardinality: Cardinality::Multiple,
        };
        let accessors = [format!("{}_names", target)];
        self.bind(bindings, relationship, &accessors, options).await
    }

    /// `accessors` is non-empty; the first one is reported
    async fn bind(
        &self,
        bindings: &mut HostBindings,
        relationship: Relationship,
        accessors: &[String],
        options: BindingOptions,
    ) -> Result<BindingReport, RegistryError> {
        let mut report = BindingReport {
            names_accessor: accessors.first().cloned().unwrap_or_default(),
            ..Default::default()
        };
        bindings.attach(self.registry.clone());
        bindings.declare(relationship.clone());

        let Some(anchor) = self
            .resolve_anchor(bindings.host_type(), &relationship.target, &options)
            .await?
        else {
            tracing::warn!(
                "No {} anchor for {}.{} (tried {}); skipping generated behavior",
                self.registry.config().entity_name,
                bindings.host_type(),
                relationship.target,
                self.candidates(bindings.host_type(), &relationship.target, &options)
                    .join(", ")
            );
            for accessor in accessors {
                bindings.define_names(accessor.clone(), &relationship.field_id, HashMap::new());
            }
            return Ok(report);
        };

        let children = self.registry.children(anchor.id).await?;
        let names: HashMap<_, _> = children
            .iter()
            .map(|child| (child.id, child.name.clone()))
            .collect();
        for accessor in accessors {
            bindings.define_names(accessor.clone(), &relationship.field_id, names.clone());
        }

        for child in &children {
            let stems = self.stems(bindings.host_type(), &relationship, &anchor, child, &options);

            if options.predicates {
                for stem in &stems {
                    let name = format!("{}?", stem);
                    bindings.define_predicate(name.clone(), &relationship.field_id, child.id);
                    report.predicates.push(name);
                }
            }

            if options.scopes {
                for stem in &stems {
                    let name = pluralize(stem);
                    let filter = match relationship.cardinality {
                        Cardinality::Single => HostFilter::equals(&relationship.field_id, child.id),
                        Cardinality::Multiple => {
                            HostFilter::contains(&relationship.field_id, child.id)
                        }
                    };
                    bindings.define_scope(name.clone(), filter);
                    report.scopes.push(name);
                }
            }
        }

        tracing::debug!(
            "Bound {}.{} to '{}': {} predicates, {} scopes",
            bindings.host_type(),
            relationship.target,
            anchor.system_code,
            report.predicates.len(),
            report.scopes.len()
        );
        report.anchor = Some(anchor.system_code);
        Ok(report)
    }

    fn candidates(&self, host_type: &str, target: &str, options: &BindingOptions) -> Vec<String> {
        let mut candidates = Vec::with_capacity(3);
        if let Some(code) = &options.system_code {
            candidates.push(code.clone());
        }
        candidates.push(format!("{}_{}", host_type, target));
        candidates.push(target.to_string());
        candidates
    }

    async fn resolve_anchor(
        &self,
        host_type: &str,
        target: &str,
        options: &BindingOptions,
    ) -> Result<Option<Node>, RegistryError> {
        for code in self.candidates(host_type, target, options) {
            if let Some(node) = self.registry.find_by_code(&code).await? {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Behavior names (without `?` or plural suffix) generated for `child`
    fn stems(
        &self,
        host_type: &str,
        relationship: &Relationship,
        anchor: &Node,
        child: &Node,
        options: &BindingOptions,
    ) -> Vec<String> {
        if options.system_code.is_some() {
            let anchor_prefix = format!("{}_", anchor.system_code);
            let leaf = child
                .system_code
                .strip_prefix(&anchor_prefix)
                .unwrap_or(&child.system_code);
            return vec![format!("{}_{}", relationship.target, leaf)];
        }

        let mut stems = vec![child.system_code.clone()];
        let host_prefix = format!("{}_", host_type);
        if let Some(alias) = child.system_code.strip_prefix(&host_prefix) {
            if !alias.is_empty() {
                stems.push(alias.to_string());
            }
        }
        stems
    }
}
