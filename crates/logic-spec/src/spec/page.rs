use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::{ElementId, InputKind};
use crate::selector::Selector;

/// Form control state carried by an input element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputSpec {
    #[serde(rename = "type")]
    pub kind: InputKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

/// One element of the server-rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ElementSpec {
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputSpec>,
    /// Whether the element currently carries a forced `display: none`.
    #[serde(default)]
    pub hidden: bool,
}

impl ElementSpec {
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").map(String::as_str)
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::HasAttribute(attribute) => self.attributes.contains_key(attribute),
            Selector::AttributeEquals { attribute, value } => {
                self.attributes.get(attribute) == Some(value)
            }
            Selector::Class { class, except } => {
                self.classes.contains(class)
                    && except
                        .as_ref()
                        .is_none_or(|except| !self.classes.contains(except))
            }
        }
    }
}

/// Markup of a survey page, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}
