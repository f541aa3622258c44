use serde::{Deserialize, Serialize};

use crate::scenario::scenario_model::ScenarioResult;

/// How a single scenario ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// Ran to the end with at least one failing assertion
    Failed,
    /// Stopped early on an unexpected tracker or page error
    Aborted,
}

impl Outcome {
    pub fn of(result: &ScenarioResult) -> Self {
        if result.error.is_some() {
            Outcome::Aborted
        } else if result.passed {
            Outcome::Passed
        } else {
            Outcome::Failed
        }
    }
}

/// Results of one `run` invocation, as handed to the console and JUnit
/// formatters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite_name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    /// Assertions evaluated across all scenarios, expected errors included
    pub assertions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<ScenarioResult>) -> Self {
        let count = |outcome: Outcome| results.iter().filter(|r| Outcome::of(r) == outcome).count();
        Self {
            suite_name: suite_name.to_string(),
            total: results.len(),
            passed: count(Outcome::Passed),
            failed: count(Outcome::Failed),
            aborted: count(Outcome::Aborted),
            assertions: results.iter().map(|r| r.assertion_results.len()).sum(),
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}
