use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One executed scenario step, as written to the JSONL trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub scenario: String,
    pub step: usize,

    pub action: String,

    pub has_changes: bool,
    pub suppressed: bool,

    pub outcome: Option<String>,
    pub warning: Option<String>,
}

impl TraceEvent {
    pub fn now(scenario: &str, step: usize, action: impl ToString) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            scenario: scenario.to_string(),
            step,
            action: action.to_string(),
            has_changes: false,
            suppressed: false,
            outcome: None,
            warning: None,
        }
    }

    pub fn with_state(mut self, has_changes: bool, suppressed: bool) -> Self {
        self.has_changes = has_changes;
        self.suppressed = suppressed;
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_warning(mut self, warning: Option<&str>) -> Self {
        self.warning = warning.map(str::to_string);
        self
    }
}
