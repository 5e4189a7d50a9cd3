use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::config::LogicConfig;
use crate::document::{
    Display, Document, ElementId, EventKind, FormState, InputEvent, InputKind, InputRef,
    InputState,
};
use crate::selector::Selector;
use crate::spec::page::{ElementSpec, PageSpec};
use crate::visibility::VisibilityMap;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to parse page: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("element id '{0}' is used more than once")]
    DuplicateElement(String),
    #[error("input element '{0}' has no name attribute")]
    UnnamedInput(String),
    #[error("no input named '{0}'")]
    UnknownInput(String),
    #[error("input group '{name}' has no choice with value '{value}'")]
    UnknownChoice { name: String, value: String },
}

/// Document backed by a [`PageSpec`], driving user interactions in memory.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    page: PageSpec,
    watchers: BTreeMap<(InputRef, EventKind), usize>,
}

impl MemoryDocument {
    pub fn new(page: PageSpec) -> Result<Self, PageError> {
        let mut ids = BTreeSet::new();
        for element in &page.elements {
            if !ids.insert(element.id.as_str()) {
                return Err(PageError::DuplicateElement(element.id.to_string()));
            }
            check_input_name(element)?;
        }
        Ok(Self {
            page,
            watchers: BTreeMap::new(),
        })
    }

    /// Adds an element at the end of the page, as a script inserting markup would.
    pub fn append(&mut self, element: ElementSpec) -> Result<(), PageError> {
        if self.element(&element.id).is_some() {
            return Err(PageError::DuplicateElement(element.id.to_string()));
        }
        check_input_name(&element)?;
        self.page.elements.push(element);
        Ok(())
    }

    pub fn from_json(raw: &str) -> Result<Self, PageError> {
        let page = serde_json::from_str(raw).map_err(PageError::Parse)?;
        Self::new(page)
    }

    pub fn page(&self) -> &PageSpec {
        &self.page
    }

    pub fn element(&self, id: &ElementId) -> Option<&ElementSpec> {
        self.page.elements.iter().find(|element| &element.id == id)
    }

    pub fn is_hidden(&self, id: &ElementId) -> Option<bool> {
        self.element(id).map(|element| element.hidden)
    }

    /// Visibility of every question flagged with the configured attribute.
    pub fn visibility(&self, config: &LogicConfig) -> VisibilityMap {
        let flag = Selector::has_attribute(&config.flag_attribute);
        self.page
            .elements
            .iter()
            .filter(|element| element.matches(&flag))
            .map(|element| (element.id.to_string(), !element.hidden))
            .collect()
    }

    pub fn watcher_count(&self, input: &InputRef, event: EventKind) -> usize {
        self.watchers
            .get(&(input.clone(), event))
            .copied()
            .unwrap_or(0)
    }

    pub fn watched_inputs(&self) -> usize {
        self.watchers.len()
    }

    /// Simulates the user answering `name` with `value`.
    ///
    /// Radio groups select the matching option, checkbox groups toggle it and
    /// every other input has its value replaced. Only events somebody watches
    /// are returned.
    pub fn change(&mut self, name: &str, value: &str) -> Result<Vec<InputEvent>, PageError> {
        let group = self.group_positions(name);
        let Some(&first) = group.first() else {
            return Err(PageError::UnknownInput(name.to_string()));
        };
        let kind = self.input_kind(first);

        let mut events = Vec::new();
        if kind.is_choice() {
            let index = group
                .iter()
                .position(|&position| self.input_value(position) == Some(value))
                .ok_or_else(|| PageError::UnknownChoice {
                    name: name.to_string(),
                    value: value.to_string(),
                })?;
            let fired = match kind {
                InputKind::Radio => self.select_radio(&group, index),
                _ => {
                    self.toggle(group[index]);
                    true
                }
            };
            if fired {
                events.push(InputEvent {
                    target: InputRef::new(name, index),
                    kind: EventKind::Change,
                });
            }
        } else if self.input_value(first) != Some(value) {
            if let Some(input) = self.page.elements[first].input.as_mut() {
                input.value = value.to_string();
            }
            for kind in [EventKind::Input, EventKind::Change] {
                events.push(InputEvent {
                    target: InputRef::new(name, 0),
                    kind,
                });
            }
        }

        events.retain(|event| self.watcher_count(&event.target, event.kind) > 0);
        Ok(events)
    }

    fn group_positions(&self, name: &str) -> Vec<usize> {
        self.page
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.input.is_some() && element.name() == Some(name))
            .map(|(position, _)| position)
            .collect()
    }

    fn input_kind(&self, position: usize) -> InputKind {
        self.page.elements[position]
            .input
            .as_ref()
            .map(|input| input.kind)
            .unwrap_or(InputKind::Other)
    }

    fn input_value(&self, position: usize) -> Option<&str> {
        self.page.elements[position]
            .input
            .as_ref()
            .map(|input| input.value.as_str())
    }

    /// Returns false when the option was already selected.
    fn select_radio(&mut self, group: &[usize], index: usize) -> bool {
        let already = self.page.elements[group[index]]
            .input
            .as_ref()
            .is_some_and(|input| input.checked);
        if already {
            return false;
        }
        for (offset, &position) in group.iter().enumerate() {
            if let Some(input) = self.page.elements[position].input.as_mut() {
                input.checked = offset == index;
            }
        }
        true
    }

    fn toggle(&mut self, position: usize) {
        if let Some(input) = self.page.elements[position].input.as_mut() {
            input.checked = !input.checked;
        }
    }
}

fn check_input_name(element: &ElementSpec) -> Result<(), PageError> {
    if element.input.is_some() && element.name().is_none() {
        Err(PageError::UnnamedInput(element.id.to_string()))
    } else {
        Ok(())
    }
}

impl FormState for MemoryDocument {
    fn inputs(&self, name: &str) -> Vec<InputState> {
        self.page
            .elements
            .iter()
            .filter(|element| element.name() == Some(name))
            .filter_map(|element| element.input.as_ref())
            .map(|input| InputState {
                kind: input.kind,
                value: input.value.clone(),
                checked: input.checked,
            })
            .collect()
    }
}

impl Document for MemoryDocument {
    fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        self.page
            .elements
            .iter()
            .filter(|element| element.matches(selector))
            .map(|element| element.id.clone())
            .collect()
    }

    fn attribute(&self, element: &ElementId, attribute: &str) -> Option<String> {
        self.element(element)
            .and_then(|element| element.attributes.get(attribute).cloned())
    }

    fn watch(&mut self, input: &InputRef, event: EventKind) {
        *self.watchers.entry((input.clone(), event)).or_insert(0) += 1;
    }

    fn unwatch(&mut self, input: &InputRef, event: EventKind) {
        let key = (input.clone(), event);
        if let Some(count) = self.watchers.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.watchers.remove(&key);
            }
        }
    }

    fn set_display(&mut self, element: &ElementId, display: Display) {
        if let Some(element) = self
            .page
            .elements
            .iter_mut()
            .find(|candidate| &candidate.id == element)
        {
            element.hidden = display == Display::None;
        }
    }
}
