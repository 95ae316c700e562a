//! Form Field Resolution
//!
//! - `options` - Field and presentation options
//! - `resolver` - Option-set computation for a bound field
//! - `controls` - Select, radio and checkbox presentations of an option set

pub mod controls;
pub mod options;
pub mod resolver;

pub use controls::{
    as_checkbox_group, as_radio_group, as_select, Choice, ChoiceGroup, ChoiceKind, SelectControl,
    SelectOption,
};
pub use options::{FieldOptions, PresentationOptions, StyleHints};
pub use resolver::{FieldTag, FieldTagResolver, FormContext, OptionItem, OptionSet, Selected};
