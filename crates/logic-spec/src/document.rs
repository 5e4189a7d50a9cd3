use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// Identifier of an element in the host document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Form control kinds as reported by the input's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Number,
    #[serde(other)]
    Other,
}

impl InputKind {
    /// Radio and checkbox groups answer with a set of checked values.
    pub fn is_choice(&self) -> bool {
        matches!(self, InputKind::Radio | InputKind::Checkbox)
    }
}

/// Current state of one form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
}

/// Position of one input inside its named group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputRef {
    pub name: String,
    pub index: usize,
}

impl InputRef {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Committed change.
    Change,
    /// Live edit.
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub target: InputRef,
    pub kind: EventKind,
}

/// Forced display style of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// No forced style; the element follows the default flow.
    Default,
    /// `display: none`
    None,
}

/// Read access to the current values of named input groups.
pub trait FormState {
    /// Inputs sharing `name`, in document order. Empty when no input carries it.
    fn inputs(&self, name: &str) -> Vec<InputState>;
}

/// The host document as seen by the binder.
pub trait Document: FormState {
    fn query_all(&self, selector: &Selector) -> Vec<ElementId>;

    fn attribute(&self, element: &ElementId, attribute: &str) -> Option<String>;

    /// Registers interest in `event` on one input.
    fn watch(&mut self, input: &InputRef, event: EventKind);

    fn unwatch(&mut self, input: &InputRef, event: EventKind);

    fn set_display(&mut self, element: &ElementId, display: Display);
}
