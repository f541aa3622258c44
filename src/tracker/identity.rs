use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Stable page-unique key of a tracked field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeKey {
    /// Declared name or id
    Name(String),
    /// Counter value assigned to an anonymous field
    Synthetic(u64),
}

impl ChangeKey {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChangeKey::Name(name) if name.is_empty())
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKey::Name(name) => write!(f, "{}", name),
            ChangeKey::Synthetic(n) => write!(f, "#{}", n),
        }
    }
}

impl From<&str> for ChangeKey {
    fn from(name: &str) -> Self {
        ChangeKey::Name(name.to_string())
    }
}

impl From<String> for ChangeKey {
    fn from(name: String) -> Self {
        ChangeKey::Name(name)
    }
}

impl From<u64> for ChangeKey {
    fn from(n: u64) -> Self {
        ChangeKey::Synthetic(n)
    }
}

/// A form control as seen by the resolver.
///
/// Hosts expose the declared attributes plus a metadata slot where the
/// resolver caches the synthetic key of anonymous fields.
pub trait Field {
    fn name(&self) -> Option<&str>;
    fn id(&self) -> Option<&str>;
    fn cached_key(&self) -> Option<u64>;
    fn cache_key(&mut self, key: u64);
}

/// How the declared id takes part in key resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdBranch {
    /// Name, then id, then synthetic counter
    #[default]
    UseId,
    /// The id is never consulted; a field without a name gets a synthetic
    /// key even when it declares an id.
    Legacy,
}

/// Page-wide source of synthetic key values. Clones share one counter, so
/// every resolver handed the same counter draws from the same sequence.
#[derive(Debug, Clone, Default)]
pub struct SyntheticCounter(Rc<Cell<u64>>);

impl SyntheticCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next value to be handed out.
    pub fn peek(&self) -> u64 {
        self.0.get()
    }

    pub fn shares_with(&self, other: &SyntheticCounter) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn take(&self) -> u64 {
        let value = self.0.get();
        self.0.set(value + 1);
        value
    }

    /// Make sure `used` is never handed out again.
    fn skip_past(&self, used: u64) {
        if self.0.get() <= used {
            self.0.set(used + 1);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierResolver {
    counter: SyntheticCounter,
    id_branch: IdBranch,
}

impl IdentifierResolver {
    pub fn new(id_branch: IdBranch) -> Self {
        Self {
            counter: SyntheticCounter::new(),
            id_branch,
        }
    }

    pub fn id_branch(&self) -> IdBranch {
        self.id_branch
    }

    pub fn set_id_branch(&mut self, id_branch: IdBranch) {
        self.id_branch = id_branch;
    }

    /// Next value the synthetic counter will hand out.
    pub fn next_synthetic(&self) -> u64 {
        self.counter.peek()
    }

    pub fn counter(&self) -> &SyntheticCounter {
        &self.counter
    }

    /// Draw synthetic keys from `counter` from now on. Values this resolver
    /// already handed out stay reserved.
    pub fn share_counter(&mut self, counter: SyntheticCounter) {
        if self.counter.shares_with(&counter) {
            return;
        }
        if let Some(last) = self.counter.peek().checked_sub(1) {
            counter.skip_past(last);
        }
        self.counter = counter;
    }

    pub fn resolve(&mut self, field: &mut dyn Field) -> ChangeKey {
        if let Some(name) = non_blank(field.name()) {
            return ChangeKey::Name(name.to_string());
        }

        if self.id_branch == IdBranch::UseId {
            if let Some(id) = non_blank(field.id()) {
                return ChangeKey::Name(id.to_string());
            }
        }

        // The cache lives on the field and may have been filled by a resolver
        // drawing from another counter.
        if let Some(cached) = field.cached_key() {
            self.counter.skip_past(cached);
            return ChangeKey::Synthetic(cached);
        }

        let assigned = self.counter.take();
        field.cache_key(assigned);
        ChangeKey::Synthetic(assigned)
    }
}

fn non_blank(attr: Option<&str>) -> Option<&str> {
    attr.filter(|value| !value.is_empty())
}
