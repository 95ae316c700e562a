//! Field and presentation options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a bound field resolves its vocabulary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    /// Anchor code to use instead of the field name
    pub system_code: Option<String>,
    /// Force the blank choice on or off; computed when `None`
    pub include_blank: Option<bool>,
    /// Label of the blank choice
    pub blank_content: Option<String>,
    /// The field holds many ids (`{singular}_ids`)
    pub multiple: bool,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_code(mut self, system_code: impl Into<String>) -> Self {
        self.system_code = Some(system_code.into());
        self
    }

    pub fn with_include_blank(mut self, include_blank: bool) -> Self {
        self.include_blank = Some(include_blank);
        self
    }

    pub fn with_blank_content(mut self, blank_content: impl Into<String>) -> Self {
        self.blank_content = Some(blank_content.into());
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// Markup-neutral styling passed through to controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleHints {
    pub class: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl StyleHints {
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Presentation overrides of a bound field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationOptions {
    /// Storage field to read and submit instead of the derived one
    pub field_id: Option<String>,
    pub style: StyleHints,
}

impl PresentationOptions {
    pub fn with_field_id(mut self, field_id: impl Into<String>) -> Self {
        self.field_id = Some(field_id.into());
        self
    }

    pub fn with_style(mut self, style: StyleHints) -> Self {
        self.style = style;
        self
    }
}
