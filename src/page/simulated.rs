use std::collections::HashSet;

use thiserror::Error;

use crate::page::host::{
    ChangeEventSource, FieldHandler, NavigationSlot, NodeId, PageHost, Selection,
    SubmissionSource, SubmitHandler, WatchOptions,
};
use crate::page::selector::Selector;
use crate::tracker::identity::{Field, SyntheticCounter};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("no element with handle {0}")]
    UnknownNode(NodeId),

    #[error("element {node} is a <{tag}>, not a form")]
    NotAForm { node: NodeId, tag: String },
}

/// An element of the in-memory page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub input_type: Option<String>,
    pub classes: Vec<String>,
    pub value: String,
    original_value: String,
    synthetic_key: Option<u64>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_type(mut self, input_type: &str) -> Self {
        self.input_type = Some(input_type.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set the loaded value; edits are compared against it.
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.original_value = value.to_string();
        self
    }

    pub fn original_value(&self) -> &str {
        &self.original_value
    }

    pub fn is_modified(&self) -> bool {
        self.value != self.original_value
    }

    pub fn synthetic_key(&self) -> Option<u64> {
        self.synthetic_key
    }

    pub fn attribute(&self, attr: &str) -> Option<&str> {
        match attr {
            "name" => self.name.as_deref(),
            "id" => self.id.as_deref(),
            "type" => self.input_type.as_deref(),
            "value" => Some(self.value.as_str()),
            _ => None,
        }
    }
}

impl Field for Element {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cached_key(&self) -> Option<u64> {
        self.synthetic_key
    }

    fn cache_key(&mut self, key: u64) {
        self.synthetic_key = Some(key);
    }
}

struct Watch {
    nodes: HashSet<NodeId>,
    /// Set only for live watches
    selector: Option<Selector>,
    events: Vec<String>,
    on_changed: FieldHandler,
    on_reverted: FieldHandler,
    /// Nodes whose "changed" was emitted and not yet reverted
    changed: HashSet<NodeId>,
}

impl Watch {
    fn covers(&self, node: NodeId, element: &Element) -> bool {
        self.nodes.contains(&node)
            || self.selector.as_ref().is_some_and(|s| s.matches(element))
    }

    fn listens_to(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }
}

struct SubmitBinding {
    selector: Selector,
    handler: SubmitHandler,
}

/// In-memory page: holds elements and plays every collaborator role
/// activation needs (event source, navigation host, submission source).
pub struct SimulatedPage {
    elements: Vec<Element>,
    watches: Vec<Watch>,
    submit_bindings: Vec<SubmitBinding>,
    navigation: NavigationSlot,
    event_source_available: bool,
    synthetic_counter: SyntheticCounter,
}

impl Default for SimulatedPage {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPage {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            watches: Vec::new(),
            submit_bindings: Vec::new(),
            navigation: NavigationSlot::new(),
            event_source_available: true,
            synthetic_counter: SyntheticCounter::new(),
        }
    }

    pub fn add_element(&mut self, element: Element) -> NodeId {
        self.elements.push(element);
        self.elements.len() - 1
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node)
    }

    pub fn set_event_source_available(&mut self, available: bool) {
        self.event_source_available = available;
    }

    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    pub fn submit_binding_count(&self) -> usize {
        self.submit_bindings.len()
    }

    /// User edit: set the value, then notify watches listening to `event`.
    pub fn input(&mut self, node: NodeId, event: &str, value: &str) -> Result<(), PageError> {
        let element = self
            .elements
            .get_mut(node)
            .ok_or(PageError::UnknownNode(node))?;
        element.value = value.to_string();
        let modified = element.is_modified();

        for watch in &mut self.watches {
            if !watch.listens_to(event) || !watch.covers(node, element) {
                continue;
            }
            if modified {
                if watch.changed.insert(node) {
                    (watch.on_changed)(&mut *element);
                }
            } else if watch.changed.remove(&node) {
                (watch.on_reverted)(&mut *element);
            }
        }
        Ok(())
    }

    /// Emit "changed" for `node` on every covering watch, without an edit.
    pub fn trigger_changed(&mut self, node: NodeId) -> Result<(), PageError> {
        let element = self
            .elements
            .get_mut(node)
            .ok_or(PageError::UnknownNode(node))?;
        for watch in &mut self.watches {
            if watch.covers(node, element) {
                watch.changed.insert(node);
                (watch.on_changed)(&mut *element);
            }
        }
        Ok(())
    }

    pub fn trigger_reverted(&mut self, node: NodeId) -> Result<(), PageError> {
        let element = self
            .elements
            .get_mut(node)
            .ok_or(PageError::UnknownNode(node))?;
        for watch in &mut self.watches {
            if watch.covers(node, element) {
                watch.changed.remove(&node);
                (watch.on_reverted)(&mut *element);
            }
        }
        Ok(())
    }

    /// Submit the form at `node`. Returns how many handlers ran.
    pub fn submit(&mut self, node: NodeId) -> Result<usize, PageError> {
        let form = self.elements.get(node).ok_or(PageError::UnknownNode(node))?;
        if form.tag != "form" {
            return Err(PageError::NotAForm {
                node,
                tag: form.tag.clone(),
            });
        }

        let mut ran = 0;
        for binding in &mut self.submit_bindings {
            if binding.selector.matches(form) {
                (binding.handler)();
                ran += 1;
            }
        }
        Ok(ran)
    }

    /// Ask the installed navigation guard whether leaving needs a warning.
    pub fn navigate_away(&mut self) -> Option<String> {
        self.navigation.before_unload()
    }

    pub fn navigation_guard_installed(&self) -> bool {
        self.navigation.is_installed()
    }
}

impl PageHost for SimulatedPage {
    fn select(&self, selector: &str) -> Selection {
        let nodes = match Selector::parse(selector) {
            Ok(parsed) => self
                .elements
                .iter()
                .enumerate()
                .filter(|(_, el)| parsed.matches(el))
                .map(|(node, _)| node)
                .collect(),
            Err(e) => {
                log::warn!("invalid selector '{}': {}", selector, e);
                Vec::new()
            }
        };
        Selection::new(selector, nodes)
    }

    fn change_events(&mut self) -> Option<&mut dyn ChangeEventSource> {
        if self.event_source_available {
            Some(self as &mut dyn ChangeEventSource)
        } else {
            None
        }
    }

    fn navigation(&mut self) -> &mut NavigationSlot {
        &mut self.navigation
    }

    fn submissions(&mut self) -> &mut dyn SubmissionSource {
        self
    }

    fn synthetic_counter(&self) -> SyntheticCounter {
        self.synthetic_counter.clone()
    }
}

impl ChangeEventSource for SimulatedPage {
    fn watch(
        &mut self,
        selection: &Selection,
        options: &WatchOptions,
        on_changed: FieldHandler,
        on_reverted: FieldHandler,
    ) {
        let selector = if options.live {
            match Selector::parse(&selection.selector) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!(
                        "live watch disabled, invalid selector '{}': {}",
                        selection.selector,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        self.watches.push(Watch {
            nodes: selection.nodes.iter().copied().collect(),
            selector,
            events: options.events.clone(),
            on_changed,
            on_reverted,
            changed: HashSet::new(),
        });
    }
}

impl SubmissionSource for SimulatedPage {
    fn on_submit(&mut self, form_selector: &str, handler: SubmitHandler) {
        match Selector::parse(form_selector) {
            Ok(selector) => self.submit_bindings.push(SubmitBinding { selector, handler }),
            Err(e) => log::warn!("submit handler not bound, invalid selector '{}': {}", form_selector, e),
        }
    }
}
