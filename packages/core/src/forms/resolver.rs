//! Field Tag Resolver
//!
//! Computes, per render, the option set of a bound field: the selectable
//! items, the selected value and whether a blank choice is offered. The
//! result is markup-neutral; see [`crate::forms::controls`] for the
//! presentation transforms.
//!
//! # Blank Choice
//!
//! Unless forced with `include_blank`, a blank choice is offered when the
//! record is new or its value is empty, and the vocabulary has no default:
//!
//! | Record             | Default exists | Blank |
//! |--------------------|----------------|-------|
//! | new                | no             | yes   |
//! | new                | yes            | no    |
//! | existing, set      | no             | no    |
//! | existing, empty    | no             | yes   |

use crate::bindings::{FieldValue, HostRecord};
use crate::forms::options::{FieldOptions, PresentationOptions, StyleHints};
use crate::models::{Node, NodeId};
use crate::services::{Registry, RegistryError};
use crate::utils::singularize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The form a field is rendered in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormContext {
    /// Snake-case name of the form object (`ticket`)
    pub object_name: String,
}

impl FormContext {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
        }
    }
}

/// One selectable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: NodeId,
    pub label: String,
    pub archived: bool,
}

impl From<&Node> for OptionItem {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            label: node.name.clone(),
            archived: node.is_archived(),
        }
    }
}

/// The value an option set starts with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selected {
    Single(Option<NodeId>),
    Multiple(BTreeSet<NodeId>),
}

impl Selected {
    pub fn contains(&self, id: NodeId) -> bool {
        match self {
            Selected::Single(selected) => *selected == Some(id),
            Selected::Multiple(selected) => selected.contains(&id),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selected::Single(selected) => selected.is_none(),
            Selected::Multiple(selected) => selected.is_empty(),
        }
    }
}

/// Everything a presentation layer needs to render a bound field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    pub field_id: String,
    pub items: Vec<OptionItem>,
    pub include_blank: bool,
    pub selected: Selected,
    pub blank_content: String,
    /// Styling from the field's presentation options, carried to every control
    pub style: StyleHints,
}

impl OptionSet {
    pub fn is_multiple(&self) -> bool {
        matches!(self.selected, Selected::Multiple(_))
    }
}

/// Outcome of [`FieldTagResolver::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTag {
    Ready(OptionSet),
    /// No anchor node; carries a diagnostic naming the codes tried
    Unresolved(String),
}

impl FieldTag {
    pub fn option_set(&self) -> Option<&OptionSet> {
        match self {
            FieldTag::Ready(set) => Some(set),
            FieldTag::Unresolved(_) => None,
        }
    }
}

/// Resolves one field of one record against the registry
pub struct FieldTagResolver<'a> {
    registry: &'a Registry,
    form: &'a FormContext,
    record: &'a dyn HostRecord,
    field: String,
    options: FieldOptions,
    presentation: PresentationOptions,
}

impl<'a> FieldTagResolver<'a> {
    pub fn new(
        registry: &'a Registry,
        form: &'a FormContext,
        record: &'a dyn HostRecord,
        field: impl Into<String>,
        options: FieldOptions,
        presentation: PresentationOptions,
    ) -> Self {
        Self {
            registry,
            form,
            record,
            field: field.into(),
            options,
            presentation,
        }
    }

    /// Storage field read from the record and submitted by the control
    pub fn field_id(&self) -> String {
        if let Some(field_id) = &self.presentation.field_id {
            return field_id.clone();
        }
        if self.options.multiple {
            format!("{}_ids", singularize(&self.field))
        } else {
            format!("{}_id", self.field)
        }
    }

    /// Anchor code stem: the override, else the field name
    pub fn system_code_name(&self) -> String {
        match &self.options.system_code {
            Some(code) => code.clone(),
            None if self.options.multiple => singularize(&self.field),
            None => self.field.clone(),
        }
    }

    fn anchor_candidates(&self) -> [String; 2] {
        let name = self.system_code_name();
        [format!("{}_{}", self.form.object_name, name), name]
    }

    async fn resolve_anchor(&self) -> Result<Option<Node>, RegistryError> {
        for code in self.anchor_candidates() {
            if let Some(node) = self.registry.find_by_code(&code).await? {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Compute the option set
    ///
    /// A missing anchor is reported as [`FieldTag::Unresolved`]; only store
    /// failures are errors.
    pub async fn resolve(&self) -> Result<FieldTag, RegistryError> {
        let Some(anchor) = self.resolve_anchor().await? else {
            let [prefixed, bare] = self.anchor_candidates();
            tracing::debug!(
                "Field '{}' of '{}' has no {} anchor",
                self.field,
                self.form.object_name,
                self.registry.config().entity_name
            );
            return Ok(FieldTag::Unresolved(format!(
                "Invalid system_code of '{}' (looked up '{}' and '{}')",
                self.system_code_name(),
                prefixed,
                bare
            )));
        };

        let field_id = self.field_id();
        let value = self.record.field_value(&field_id);
        let current = value.ids();

        let children = self.registry.children(anchor.id).await?;
        let items = Registry::filter_selectable(children, &current);
        let default_item = items.iter().find(|item| item.is_default).map(|item| item.id);

        let include_blank = match self.options.include_blank {
            Some(include_blank) => include_blank,
            None => (self.record.is_new_record() || value.is_empty()) && default_item.is_none(),
        };

        let use_default = self.record.is_new_record() && value.is_empty();
        let selected = if self.options.multiple {
            let ids = if use_default {
                default_item.into_iter().collect()
            } else {
                current.into_iter().collect()
            };
            Selected::Multiple(ids)
        } else if use_default {
            Selected::Single(default_item)
        } else {
            Selected::Single(match value {
                FieldValue::Single(id) => id,
                FieldValue::Multiple(ids) => ids.first().copied(),
            })
        };

        let blank_content = self
            .options
            .blank_content
            .clone()
            .unwrap_or_else(|| self.registry.config().default_blank_content.clone());

        Ok(FieldTag::Ready(OptionSet {
            field_id,
            items: items.iter().map(OptionItem::from).collect(),
            include_blank,
            selected,
            blank_content,
            style: self.presentation.style.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::DynamicRecord;
    use crate::db::InMemoryStore;
    use crate::forms::controls::as_checkbox_group;
    use crate::models::NodeUpdate;
    use crate::services::CreateNodeParams;
    use std::sync::Arc;

    struct Fixture {
        registry: Registry,
        low: NodeId,
        medium: NodeId,
        legacy: NodeId,
    }

    async fn priority_fixture(with_default: bool) -> Fixture {
        let registry = Registry::new(Arc::new(InMemoryStore::new()));
        let root = registry
            .create(CreateNodeParams::new("priority"))
            .await
            .unwrap();
        let low = registry
            .create(CreateNodeParams::new("low").under(root.id).at_position(1))
            .await
            .unwrap();
        let mut medium = CreateNodeParams::new("medium").under(root.id).at_position(2);
        medium.is_default = with_default;
        let medium = registry.create(medium).await.unwrap();
        let legacy = registry
            .create(CreateNodeParams::new("legacy").under(root.id).at_position(3))
            .await
            .unwrap();
        registry
            .update(legacy.id, NodeUpdate::new().with_archived(true))
            .await
            .unwrap();

        Fixture {
            registry,
            low: low.id,
            medium: medium.id,
            legacy: legacy.id,
        }
    }

    async fn resolve(
        registry: &Registry,
        record: &DynamicRecord,
        options: FieldOptions,
    ) -> FieldTag {
        let form = FormContext::new("ticket");
        FieldTagResolver::new(
            registry,
            &form,
            record,
            "priority",
            options,
            PresentationOptions::default(),
        )
        .resolve()
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_include_blank_truth_table() {
        let plain = priority_fixture(false).await;
        let defaulted = priority_fixture(true).await;

        let new_record = DynamicRecord::new();
        let existing_set = DynamicRecord::persisted().with_field("priority_id", plain.low);
        let existing_empty = DynamicRecord::persisted();

        let blank = |tag: FieldTag| tag.option_set().unwrap().include_blank;

        assert!(blank(resolve(&plain.registry, &new_record, FieldOptions::new()).await));
        assert!(!blank(resolve(&defaulted.registry, &new_record, FieldOptions::new()).await));
        assert!(!blank(resolve(&plain.registry, &existing_set, FieldOptions::new()).await));
        assert!(blank(resolve(&plain.registry, &existing_empty, FieldOptions::new()).await));

        // Explicit option wins
        assert!(blank(
            resolve(
                &defaulted.registry,
                &new_record,
                FieldOptions::new().with_include_blank(true)
            )
            .await
        ));
    }

    #[tokio::test]
    async fn test_new_record_selects_default() {
        let fixture = priority_fixture(true).await;
        let tag = resolve(&fixture.registry, &DynamicRecord::new(), FieldOptions::new()).await;
        let set = tag.option_set().unwrap();

        assert_eq!(set.field_id, "priority_id");
        assert_eq!(set.selected, Selected::Single(Some(fixture.medium)));
        assert_eq!(set.blank_content, "none");
        let labels: Vec<&str> = set.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["low", "medium"]);
    }

    #[tokio::test]
    async fn test_existing_record_keeps_archived_selection() {
        let fixture = priority_fixture(true).await;
        let record = DynamicRecord::persisted().with_field("priority_id", fixture.legacy);
        let tag = resolve(&fixture.registry, &record, FieldOptions::new()).await;
        let set = tag.option_set().unwrap();

        assert_eq!(set.selected, Selected::Single(Some(fixture.legacy)));
        let legacy = set.items.iter().find(|i| i.id == fixture.legacy).unwrap();
        assert!(legacy.archived);
    }

    #[tokio::test]
    async fn test_form_prefixed_anchor_wins() {
        let fixture = priority_fixture(false).await;
        let ticket_priority = fixture
            .registry
            .create(CreateNodeParams::new("ticket_priority"))
            .await
            .unwrap();
        let urgent = fixture
            .registry
            .create(CreateNodeParams::new("urgent").under(ticket_priority.id))
            .await
            .unwrap();

        let tag = resolve(&fixture.registry, &DynamicRecord::new(), FieldOptions::new()).await;
        let ids: Vec<NodeId> = tag.option_set().unwrap().items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![urgent.id]);
    }

    #[tokio::test]
    async fn test_unresolved_anchor_names_both_lookups() {
        let fixture = priority_fixture(false).await;
        let form = FormContext::new("ticket");
        let record = DynamicRecord::new();
        let tag = FieldTagResolver::new(
            &fixture.registry,
            &form,
            &record,
            "severity",
            FieldOptions::new(),
            PresentationOptions::default(),
        )
        .resolve()
        .await
        .unwrap();

        match tag {
            FieldTag::Unresolved(message) => {
                assert!(message.contains("ticket_severity"));
                assert!(message.contains("'severity'"));
            }
            other => panic!("expected unresolved tag, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_field_and_overrides() {
        let fixture = priority_fixture(false).await;
        let form = FormContext::new("ticket");
        let record = DynamicRecord::persisted()
            .with_field("levels", vec![fixture.low, fixture.medium]);

        let resolver = FieldTagResolver::new(
            &fixture.registry,
            &form,
            &record,
            "levels",
            FieldOptions::new()
                .with_system_code("priority")
                .with_blank_content("n/a")
                .multiple(),
            PresentationOptions::default()
                .with_field_id("levels")
                .with_style(StyleHints::default().with_class("inline")),
        );
        assert_eq!(resolver.field_id(), "levels");

        let tag = resolver.resolve().await.unwrap();
        let set = tag.option_set().unwrap();
        assert!(set.is_multiple());
        assert!(set.selected.contains(fixture.low));
        assert!(set.selected.contains(fixture.medium));
        assert!(!set.include_blank);
        assert_eq!(set.blank_content, "n/a");

        let group = as_checkbox_group(set);
        assert_eq!(group.name, "levels");
        assert_eq!(group.style.class.as_deref(), Some("inline"));
    }
}
