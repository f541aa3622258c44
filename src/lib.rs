//! Tracks unsaved changes across the form fields of a page and answers one
//! question before navigation: should the user be warned?

pub mod cli;
pub mod page;
pub mod report;
pub mod scenario;
pub mod trace;
pub mod tracker;

pub use page::host::{PageHost, Selection};
pub use tracker::error::{ErrorKind, TrackerError};
pub use tracker::identity::{ChangeKey, Field, IdBranch, SyntheticCounter};
pub use tracker::settings::Settings;
pub use tracker::tracker::{ChangeTracker, SafetyNet};
