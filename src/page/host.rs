use std::fmt;

use crate::tracker::identity::{Field, SyntheticCounter};

/// Host-specific handle of an element on the page.
pub type NodeId = usize;

/// Invoked with the field that emitted a notification.
pub type FieldHandler = Box<dyn FnMut(&mut dyn Field)>;

pub type SubmitHandler = Box<dyn FnMut()>;

/// Predicate queried right before leaving the page. `Some(message)` asks the
/// host to warn the user.
pub type NavigationGuard = Box<dyn FnMut() -> Option<String>>;

/// A set of page elements, kept together with the selector that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub selector: String,
    pub nodes: Vec<NodeId>,
}

impl Selection {
    pub fn new(selector: impl Into<String>, nodes: Vec<NodeId>) -> Self {
        Self {
            selector: selector.into(),
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// How the event source should watch a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Underlying events that may produce a "changed" notification
    pub events: Vec<String>,
    /// Also watch elements matching the selector that appear later
    pub live: bool,
}

/// Emits "changed" / "reverted" notifications per field.
pub trait ChangeEventSource {
    fn watch(
        &mut self,
        selection: &Selection,
        options: &WatchOptions,
        on_changed: FieldHandler,
        on_reverted: FieldHandler,
    );
}

/// Notifies when a form matching `form_selector` is submitted.
pub trait SubmissionSource {
    fn on_submit(&mut self, form_selector: &str, handler: SubmitHandler);
}

/// Single-slot navigation hook. The last installed guard wins; guards are
/// never chained.
#[derive(Default)]
pub struct NavigationSlot {
    guard: Option<NavigationGuard>,
}

impl NavigationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `guard`, dropping any previous one. Returns true if a guard
    /// was replaced.
    pub fn install(&mut self, guard: NavigationGuard) -> bool {
        self.guard.replace(guard).is_some()
    }

    pub fn clear(&mut self) {
        self.guard = None;
    }

    pub fn is_installed(&self) -> bool {
        self.guard.is_some()
    }

    /// Query the installed guard. No guard means no warning.
    pub fn before_unload(&mut self) -> Option<String> {
        self.guard.as_mut().and_then(|guard| guard())
    }
}

impl fmt::Debug for NavigationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Everything activation needs from the hosting page.
pub trait PageHost {
    fn select(&self, selector: &str) -> Selection;

    /// `None` when no field-change event source is available.
    fn change_events(&mut self) -> Option<&mut dyn ChangeEventSource>;

    fn navigation(&mut self) -> &mut NavigationSlot;

    fn submissions(&mut self) -> &mut dyn SubmissionSource;

    /// Counter shared by every tracker activated on this page, so synthetic
    /// keys stay page-unique.
    fn synthetic_counter(&self) -> SyntheticCounter;
}
