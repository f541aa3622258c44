use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::page::host::{FieldHandler, PageHost, Selection, WatchOptions};
use crate::tracker::error::{TrackerError, TrackerResult};
use crate::tracker::identity::{ChangeKey, Field, IdBranch, IdentifierResolver};
use crate::tracker::settings::Settings;

const EVENT_SOURCE_DEPENDENCY: &str = "field-change event source";

/// Dirty-flag registry for one page.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    registry: HashSet<ChangeKey>,
    suppressed: bool,
    activated: bool,
    resolver: IdentifierResolver,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_branch(id_branch: IdBranch) -> Self {
        Self {
            resolver: IdentifierResolver::new(id_branch),
            ..Self::default()
        }
    }

    pub fn raise_change(&mut self, key: impl Into<ChangeKey>) -> TrackerResult<()> {
        let key = validated(key.into(), "raising")?;
        log::debug!("raise change {}", key);
        self.registry.insert(key);
        Ok(())
    }

    pub fn clear_change(&mut self, key: impl Into<ChangeKey>) -> TrackerResult<()> {
        let key = validated(key.into(), "clearing")?;
        log::debug!("clear change {}", key);
        self.registry.remove(&key);
        Ok(())
    }

    /// Forget every change and re-arm activation. Suppression and the
    /// synthetic counter are left alone.
    pub fn clear_all_changes(&mut self) {
        log::info!("clearing {} change(s), activation re-armed", self.registry.len());
        self.registry.clear();
        self.activated = false;
    }

    pub fn has_changes(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn is_dirty(&self, key: &ChangeKey) -> bool {
        self.registry.contains(key)
    }

    /// Raised keys, sorted.
    pub fn dirty_keys(&self) -> Vec<ChangeKey> {
        let mut keys: Vec<_> = self.registry.iter().cloned().collect();
        keys.sort();
        keys
    }

    pub fn suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn set_suppressed(&mut self, value: bool) -> bool {
        self.suppressed = value;
        self.suppressed
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn resolve(&mut self, field: &mut dyn Field) -> ChangeKey {
        self.resolver.resolve(field)
    }

    pub fn resolver(&self) -> &IdentifierResolver {
        &self.resolver
    }

    /// Navigation-guard decision. Suppression is one-shot: it is consumed
    /// here whether or not there are changes.
    pub fn before_unload(&mut self, message: &str) -> Option<String> {
        if self.suppressed {
            self.suppressed = false;
            return None;
        }
        self.has_changes().then(|| message.to_string())
    }
}

fn validated(key: ChangeKey, operation: &'static str) -> TrackerResult<ChangeKey> {
    if key.is_empty() {
        return Err(TrackerError::InvalidKey { operation });
    }
    Ok(key)
}

/// Shared handle over a page's [`ChangeTracker`].
///
/// Handlers installed by [`SafetyNet::activate`] hold clones of the handle, so
/// notifications dispatched by the host land in the same registry the caller
/// queries.
#[derive(Debug, Clone, Default)]
pub struct SafetyNet {
    tracker: Rc<RefCell<ChangeTracker>>,
}

impl SafetyNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise_change(&self, key: impl Into<ChangeKey>) -> TrackerResult<()> {
        self.tracker.borrow_mut().raise_change(key)
    }

    pub fn clear_change(&self, key: impl Into<ChangeKey>) -> TrackerResult<()> {
        self.tracker.borrow_mut().clear_change(key)
    }

    pub fn clear_all_changes(&self) {
        self.tracker.borrow_mut().clear_all_changes();
    }

    pub fn has_changes(&self) -> bool {
        self.tracker.borrow().has_changes()
    }

    pub fn dirty_keys(&self) -> Vec<ChangeKey> {
        self.tracker.borrow().dirty_keys()
    }

    pub fn suppressed(&self) -> bool {
        self.tracker.borrow().suppressed()
    }

    pub fn set_suppressed(&self, value: bool) -> bool {
        self.tracker.borrow_mut().set_suppressed(value)
    }

    pub fn is_activated(&self) -> bool {
        self.tracker.borrow().is_activated()
    }

    pub fn resolve(&self, field: &mut dyn Field) -> ChangeKey {
        self.tracker.borrow_mut().resolve(field)
    }

    pub fn before_unload(&self, message: &str) -> Option<String> {
        self.tracker.borrow_mut().before_unload(message)
    }

    /// Wire `selection` into the tracker and return it unchanged.
    ///
    /// Both guard checks run before anything is touched, so a failed call
    /// leaves the tracker and the page as they were.
    pub fn activate(
        &self,
        selection: Selection,
        settings: &Settings,
        page: &mut dyn PageHost,
    ) -> TrackerResult<Selection> {
        if self.is_activated() {
            return Err(TrackerError::AlreadyActivated);
        }

        let counter = page.synthetic_counter();
        let Some(events) = page.change_events() else {
            return Err(TrackerError::MissingDependency {
                dependency: EVENT_SOURCE_DEPENDENCY,
            });
        };

        {
            let mut tracker = self.tracker.borrow_mut();
            tracker.activated = true;
            tracker.resolver.set_id_branch(settings.id_branch);
            tracker.resolver.share_counter(counter);
        }

        let options = WatchOptions {
            events: settings.change_events.clone(),
            live: settings.live,
        };
        events.watch(
            &selection,
            &options,
            self.route(Notification::Changed),
            self.route(Notification::Reverted),
        );

        let tracker = Rc::clone(&self.tracker);
        let message = settings.message.clone();
        if page
            .navigation()
            .install(Box::new(move || tracker.borrow_mut().before_unload(&message)))
        {
            log::debug!("replaced previously installed navigation guard");
        }

        let tracker = Rc::clone(&self.tracker);
        page.submissions().on_submit(
            &settings.form,
            Box::new(move || {
                tracker.borrow_mut().set_suppressed(true);
            }),
        );

        log::info!(
            "activated on {} field(s) matching '{}' (events: {})",
            selection.len(),
            selection.selector,
            settings.events_string()
        );
        Ok(selection)
    }

    /// Activate on the page's `settings.fields` selection.
    pub fn activate_default(
        &self,
        settings: &Settings,
        page: &mut dyn PageHost,
    ) -> TrackerResult<Selection> {
        let selection = page.select(&settings.fields);
        self.activate(selection, settings, page)
    }

    fn route(&self, notification: Notification) -> FieldHandler {
        let tracker = Rc::clone(&self.tracker);
        Box::new(move |field: &mut dyn Field| {
            let mut tracker = tracker.borrow_mut();
            let key = tracker.resolve(field);
            let outcome = match notification {
                Notification::Changed => tracker.raise_change(key),
                Notification::Reverted => tracker.clear_change(key),
            };
            if let Err(e) = outcome {
                log::warn!("dropped {:?} notification: {}", notification, e);
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Notification {
    Changed,
    Reverted,
}
