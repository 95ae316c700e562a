//! Presentation transforms
//!
//! Pure functions from an [`OptionSet`] to markup-neutral control
//! descriptions. Each control carries the set's style hints. Rendering them
//! to HTML or any other target is left to the caller.

use crate::forms::options::StyleHints;
use crate::forms::resolver::OptionSet;
use crate::models::NodeId;
use serde::Serialize;

/// A dropdown entry; `value` is `None` for the blank entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: Option<NodeId>,
    pub label: String,
    pub selected: bool,
}

/// A dropdown (single or multiple select)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectControl {
    pub name: String,
    pub multiple: bool,
    pub options: Vec<SelectOption>,
    pub style: StyleHints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    Radio,
    Checkbox,
}

/// A radio button or checkbox; `value` is `None` for the blank choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: Option<NodeId>,
    pub label: String,
    pub checked: bool,
}

/// A group of radio buttons or checkboxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceGroup {
    pub name: String,
    pub kind: ChoiceKind,
    pub choices: Vec<Choice>,
    pub style: StyleHints,
}

/// Dropdown with a leading empty entry when the blank choice is offered
pub fn as_select(set: &OptionSet) -> SelectControl {
    let mut options = Vec::with_capacity(set.items.len() + 1);
    if set.include_blank {
        options.push(SelectOption {
            value: None,
            label: String::new(),
            selected: set.selected.is_empty(),
        });
    }
    options.extend(set.items.iter().map(|item| SelectOption {
        value: Some(item.id),
        label: item.label.clone(),
        selected: set.selected.contains(item.id),
    }));

    SelectControl {
        name: set.field_id.clone(),
        multiple: set.is_multiple(),
        options,
        style: set.style.clone(),
    }
}

/// Radio buttons, with a trailing `blank_content` choice when the blank is offered
pub fn as_radio_group(set: &OptionSet) -> ChoiceGroup {
    choice_group(set, ChoiceKind::Radio)
}

/// Checkboxes, with a trailing `blank_content` choice when the blank is offered
pub fn as_checkbox_group(set: &OptionSet) -> ChoiceGroup {
    choice_group(set, ChoiceKind::Checkbox)
}

fn choice_group(set: &OptionSet, kind: ChoiceKind) -> ChoiceGroup {
    let mut choices: Vec<Choice> = set
        .items
        .iter()
        .map(|item| Choice {
            value: Some(item.id),
            label: item.label.clone(),
            checked: set.selected.contains(item.id),
        })
        .collect();

    if set.include_blank {
        choices.push(Choice {
            value: None,
            label: set.blank_content.clone(),
            checked: set.selected.is_empty(),
        });
    }

    ChoiceGroup {
        name: set.field_id.clone(),
        kind,
        choices,
        style: set.style.clone(),
    }
}
