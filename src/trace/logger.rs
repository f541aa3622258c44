use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::trace::trace::TraceEvent;

/// Appends one JSON line per executed scenario step.
///
/// Tracing never fails a run: open and write errors are logged and the
/// event is dropped.
pub struct TraceLogger {
    sink: Option<(PathBuf, File)>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                log::debug!("tracing steps to {}", path.display());
                Self {
                    sink: Some((path.to_path_buf(), file)),
                }
            }
            Err(e) => {
                log::warn!("could not open trace file '{}': {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    /// Logger that drops every event.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some((path, file)) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("failed to serialize trace event for step {}: {}", event.step, e);
                return;
            }
        };

        // `&File` is a writer; appends need no exclusive borrow
        let mut writer: &File = file;
        if let Err(e) = writeln!(writer, "{}", line) {
            log::warn!("failed to write trace event to '{}': {}", path.display(), e);
        }
    }
}
